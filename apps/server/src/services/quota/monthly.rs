//! AI-analysis quota, metered per calendar month.
//!
//! A job that has been analyzed once is exempt forever: re-analysis is
//! always allowed and reported with `reason = reanalysis`.

use chrono::{DateTime, Utc};

use super::{policy, QuotaService, RoleContext};
use crate::error::AppResult;
use crate::models::{QuotaCheckResult, QuotaStatus, QuotaType};

impl QuotaService {
    /// Decides whether `user_id` may run an AI analysis of `job_id` now
    pub async fn check_monthly<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        job_id: i32,
    ) -> AppResult<QuotaCheckResult> {
        self.check_monthly_at(ctx, user_id, job_id, Utc::now()).await
    }

    pub async fn check_monthly_at<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        job_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<QuotaCheckResult> {
        let job = self.jobs.get_by_id(user_id, job_id).await?;
        let used = self.repo.get_monthly_usage(user_id, &policy::month_key(now)).await?;

        if self.bypasses(ctx, false) {
            log::debug!(
                "ai_analysis check bypassed: user={} job={} used={} mode={}",
                user_id,
                job_id,
                used,
                self.mode
            );
            return Ok(QuotaCheckResult::allow(QuotaStatus::unlimited(used)));
        }

        let config = self.repo.get_quota_config(QuotaType::AiAnalysis).await?;
        let reset_date = policy::start_of_next_month(now);

        let result = if job.was_analyzed() {
            let status = if config.is_unlimited() {
                QuotaStatus::unlimited(used)
            } else {
                QuotaStatus::limited(used, config.free_limit, reset_date)
            };
            QuotaCheckResult::reanalysis(status)
        } else {
            policy::evaluate(used, &config, reset_date)
        };

        log_decision(QuotaType::AiAnalysis.as_str(), user_id, &result);
        Ok(result)
    }

    /// Records one AI analysis of `job_id`.
    ///
    /// Marks the job analyzed (if it was not already) and increments this
    /// month's counter in a single transaction. Does not re-check the quota.
    pub async fn record_monthly(&self, user_id: i32, job_id: i32) -> AppResult<()> {
        self.record_monthly_at(user_id, job_id, Utc::now()).await
    }

    pub async fn record_monthly_at(
        &self,
        user_id: i32,
        job_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let month_year = policy::month_key(now);
        self.repo
            .record_analysis(user_id, job_id, &month_year)
            .await?;

        log::debug!(
            "ai_analysis recorded: user={} job={} month={}",
            user_id,
            job_id,
            month_year
        );
        Ok(())
    }

    /// AI-analysis status without a specific job (no re-analysis branch)
    pub async fn monthly_status<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
    ) -> AppResult<QuotaCheckResult> {
        self.monthly_status_at(ctx, user_id, Utc::now()).await
    }

    pub async fn monthly_status_at<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<QuotaCheckResult> {
        let used = self.repo.get_monthly_usage(user_id, &policy::month_key(now)).await?;

        if self.bypasses(ctx, false) {
            return Ok(QuotaCheckResult::allow(QuotaStatus::unlimited(used)));
        }

        let config = self.repo.get_quota_config(QuotaType::AiAnalysis).await?;
        Ok(policy::evaluate(
            used,
            &config,
            policy::start_of_next_month(now),
        ))
    }
}

/// Denials at info, everything else at debug
pub(super) fn log_decision(quota: &str, user_id: i32, result: &QuotaCheckResult) {
    let level = if result.allowed {
        log::Level::Debug
    } else {
        log::Level::Info
    };

    log::log!(
        level,
        "{} decision: user={} allowed={} reason={:?} used={} limit={}",
        quota,
        user_id,
        result.allowed,
        result.reason,
        result.status.used,
        result.status.limit
    );
}
