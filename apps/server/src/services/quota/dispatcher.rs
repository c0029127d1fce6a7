//! Routes a quota type to its checker/recorder and assembles the per-user
//! overview of every quota.

use std::future::Future;

use chrono::Utc;
use serde_json::{Map, Value};

use super::{QuotaService, RoleContext};
use crate::error::{AppError, AppResult};
use crate::models::{QuotaCheckResult, QuotaKey, QuotaOverview, QuotaType};

/// Free-form caller metadata. `ai_analysis` requires `job_id`; daily quotas
/// accept an optional `amount` when recording.
pub type QuotaMetadata = Map<String, Value>;

impl QuotaService {
    pub async fn check_quota<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        quota_type: QuotaType,
        metadata: &QuotaMetadata,
    ) -> AppResult<QuotaCheckResult> {
        match quota_type.daily_key() {
            None => {
                let job_id = job_id_from(metadata)?;
                self.check_monthly(ctx, user_id, job_id).await
            }
            Some(key) => self.check_daily(ctx, user_id, key).await,
        }
    }

    pub async fn record_usage(
        &self,
        user_id: i32,
        quota_type: QuotaType,
        metadata: &QuotaMetadata,
    ) -> AppResult<()> {
        match quota_type.daily_key() {
            None => {
                let job_id = job_id_from(metadata)?;
                self.record_monthly(user_id, job_id).await
            }
            Some(key) => {
                let amount = amount_from(metadata)?;
                self.record_daily(user_id, key, amount).await
            }
        }
    }

    /// Status of every quota at one instant. Any failing lookup fails the
    /// whole overview.
    pub async fn get_all_quota_status<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
    ) -> AppResult<QuotaOverview> {
        let now = Utc::now();

        let (ai_analysis, job_capture, job_search, search_run) = tokio::try_join!(
            labelled(
                QuotaType::AiAnalysis,
                self.monthly_status_at(ctx, user_id, now)
            ),
            labelled(
                QuotaType::JobCapture,
                self.daily_status_at(ctx, user_id, QuotaKey::JobsCaptured, now)
            ),
            labelled(
                QuotaType::JobSearch,
                self.daily_status_at(ctx, user_id, QuotaKey::JobsFound, now)
            ),
            labelled(
                QuotaType::SearchRun,
                self.daily_status_at(ctx, user_id, QuotaKey::SearchesRun, now)
            ),
        )?;

        Ok(QuotaOverview {
            ai_analysis,
            job_capture,
            job_search,
            search_run,
        })
    }
}

async fn labelled<T>(
    quota_type: QuotaType,
    lookup: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    lookup.await.map_err(|e| {
        AppError::Internal(format!(
            "failed to get {} quota status: {}",
            quota_type, e
        ))
    })
}

/// Reads `job_id` as a positive integer or numeric string
fn job_id_from(metadata: &QuotaMetadata) -> AppResult<i32> {
    let value = metadata
        .get("job_id")
        .filter(|v| !v.is_null())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "job_id required for {} quota",
                QuotaType::AiAnalysis
            ))
        })?;

    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|id| i32::try_from(id).ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            AppError::Validation(format!("job_id must be a positive integer, got {}", value))
        })
}

/// Reads the optional `amount`, defaulting to one unit
fn amount_from(metadata: &QuotaMetadata) -> AppResult<i64> {
    match metadata.get("amount") {
        None | Some(Value::Null) => Ok(1),
        Some(value) => value.as_i64().filter(|a| *a >= 0).ok_or_else(|| {
            AppError::Validation(format!(
                "amount must be a non-negative integer, got {}",
                value
            ))
        }),
    }
}
