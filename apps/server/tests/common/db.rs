//! Database test utilities
//!
//! Each `TestDb` is a throwaway PostgreSQL container with the migrations
//! applied, so every test starts from the seeded quota configuration.

use applytrack::models::QuotaType;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

/// A test database container with connection pool
pub struct TestDb {
    #[allow(dead_code)]
    container: ContainerAsync<Postgres>,
    pub pool: PgPool,
}

#[allow(dead_code)]
impl TestDb {
    pub async fn new() -> Self {
        let container = Postgres::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get port");

        let pool = PgPool::connect(&format!(
            "postgres://postgres:postgres@{}:{}/postgres",
            host, port
        ))
        .await
        .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        TestDb { container, pool }
    }

    /// Overrides the seeded free limit for one quota type
    pub async fn set_quota_limit(&self, quota_type: QuotaType, limit: i64) {
        sqlx::query("UPDATE quota_config SET free_limit = $1 WHERE quota_type = $2")
            .bind(limit)
            .bind(quota_type)
            .execute(&self.pool)
            .await
            .expect("Failed to update quota config");
    }

    pub async fn remove_quota_config(&self, quota_type: QuotaType) {
        sqlx::query("DELETE FROM quota_config WHERE quota_type = $1")
            .bind(quota_type)
            .execute(&self.pool)
            .await
            .expect("Failed to delete quota config");
    }

    /// Installs a trigger that makes every write to `monthly_usage` raise
    pub async fn reject_monthly_usage_writes(&self) {
        sqlx::query(
            r#"
            CREATE FUNCTION reject_monthly_usage() RETURNS trigger AS $$
            BEGIN
                RAISE EXCEPTION 'monthly_usage is read-only';
            END;
            $$ LANGUAGE plpgsql
            "#,
        )
        .execute(&self.pool)
        .await
        .expect("Failed to create trigger function");

        sqlx::query(
            r#"
            CREATE TRIGGER reject_monthly_usage
            BEFORE INSERT OR UPDATE ON monthly_usage
            FOR EACH ROW EXECUTE FUNCTION reject_monthly_usage()
            "#,
        )
        .execute(&self.pool)
        .await
        .expect("Failed to create trigger");
    }
}
