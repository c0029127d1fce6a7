use actix_web::{web, HttpResponse};

use crate::auth::AuthenticatedUser;
use crate::error::AppResult;
use crate::models::{QuotaType, QuotaUsageRequest};
use crate::services::QuotaService;

/// GET /api/quota - Status of every quota for the current user
pub async fn get_quota_overview(
    quota: web::Data<QuotaService>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let overview = quota.get_all_quota_status(&user, user.id()).await?;
    Ok(HttpResponse::Ok().json(overview))
}

/// GET /api/quota/daily - Today's raw daily counters
pub async fn get_daily_usage(
    quota: web::Data<QuotaService>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let usage = quota.daily_usage_today(user.id()).await?;
    Ok(HttpResponse::Ok().json(usage))
}

/// POST /api/quota/check - Decide whether an operation may proceed.
///
/// A denial is a 200 with `allowed: false`; only lookup failures are errors.
pub async fn check_quota(
    quota: web::Data<QuotaService>,
    body: web::Json<QuotaUsageRequest>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let quota_type: QuotaType = body.quota_type.parse()?;
    let result = quota
        .check_quota(&user, user.id(), quota_type, &body.metadata)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/quota/record - Count usage after an allowed operation
pub async fn record_usage(
    quota: web::Data<QuotaService>,
    body: web::Json<QuotaUsageRequest>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let quota_type: QuotaType = body.quota_type.parse()?;
    quota
        .record_usage(user.id(), quota_type, &body.metadata)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure quota routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/quota")
            .route("", web::get().to(get_quota_overview))
            .route("/daily", web::get().to(get_daily_usage))
            .route("/check", web::post().to(check_quota))
            .route("/record", web::post().to(record_usage)),
    );
}
