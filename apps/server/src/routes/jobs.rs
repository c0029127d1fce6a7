use actix_web::{web, HttpResponse};

use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateJob, QuotaKey};
use crate::routes::quota_denied;
use crate::services::{JobService, QuotaService};

/// POST /api/jobs - Capture a job
pub async fn capture_job(
    pool: web::Data<DbPool>,
    quota: web::Data<QuotaService>,
    body: web::Json<CreateJob>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let check = quota
        .check_daily(&user, user.id(), QuotaKey::JobsCaptured)
        .await?;
    if !check.allowed {
        return Ok(quota_denied(&check));
    }

    let job = JobService::create(pool.get_ref(), user.id(), body.into_inner()).await?;

    // The job exists either way; a lost count only under-reports usage
    if let Err(e) = quota.record_daily(user.id(), QuotaKey::JobsCaptured, 1).await {
        log::warn!("Job {} captured but usage not recorded: {}", job.id, e);
    }

    Ok(HttpResponse::Created().json(job))
}

/// GET /api/jobs/{id} - Get one of the current user's jobs
pub async fn get_job(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let job = JobService::get_by_id(pool.get_ref(), user.id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// Configure job routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/jobs")
            .route("", web::post().to(capture_job))
            .route("/{id}", web::get().to(get_job)),
    );
}
