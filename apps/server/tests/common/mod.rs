//! Common test utilities and helpers
//!
//! This module provides shared functionality for all tests.

pub mod db;

#[allow(unused_imports)]
pub use db::TestDb;
#[allow(unused_imports)]
pub use fakes::{utc, InMemoryStore};

#[allow(dead_code)]
pub const SESSION_COOKIE: &str = "applytrack_session";

/// Builds a test service with the production routes, a cookie session and a
/// Postgres-backed quota engine in the given deployment mode.
#[allow(unused_macros)]
macro_rules! test_app {
    ($pool:expr, $mode:expr) => {{
        let pool: sqlx::PgPool = $pool.clone();
        let quota = applytrack::services::QuotaService::postgres(&pool, $mode);
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(pool))
                .app_data(actix_web::web::Data::new(quota))
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::from(&[0u8; 64]),
                    )
                    .cookie_name($crate::common::SESSION_COOKIE.to_string())
                    .cookie_secure(false)
                    .build(),
                )
                .configure(applytrack::routes::health::configure)
                .configure(applytrack::routes::auth::configure)
                .configure(applytrack::routes::quota::configure)
                .configure(applytrack::routes::jobs::configure),
        )
        .await
    }};
}
