pub mod auth;
pub mod health;
pub mod jobs;
pub mod quota;

use actix_web::HttpResponse;
use chrono::Utc;

use crate::models::QuotaCheckResult;

/// 429 carrying the denied check, with `Retry-After` until the period resets
pub(crate) fn quota_denied(check: &QuotaCheckResult) -> HttpResponse {
    let mut response = HttpResponse::TooManyRequests();

    if let Some(reset) = check.status.reset_date {
        let retry_after = (reset - Utc::now()).num_seconds().max(1);
        response.insert_header(("Retry-After", retry_after.to_string()));
    }

    response.json(check)
}
