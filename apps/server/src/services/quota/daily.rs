//! Capture, job-search and search-run quotas, metered per UTC day.
//!
//! Captures are tracked but never throttled. Searches and search runs are
//! enforced like the monthly quota, without any re-analysis style exemption.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::monthly::log_decision;
use super::{policy, QuotaService, RoleContext};
use crate::error::{AppError, AppResult};
use crate::models::{QuotaCheckResult, QuotaKey, QuotaStatus};

impl QuotaService {
    /// Decides whether `user_id` may consume one more unit of `key` today
    pub async fn check_daily<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        key: QuotaKey,
    ) -> AppResult<QuotaCheckResult> {
        self.check_daily_at(ctx, user_id, key, Utc::now()).await
    }

    pub async fn check_daily_at<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        key: QuotaKey,
        now: DateTime<Utc>,
    ) -> AppResult<QuotaCheckResult> {
        let used = self
            .repo
            .get_daily_usage(user_id, policy::day_key(now), key)
            .await?;

        if self.bypasses(ctx, key == QuotaKey::JobsCaptured) {
            log::debug!(
                "{} check bypassed: user={} used={} mode={}",
                key,
                user_id,
                used,
                self.mode
            );
            return Ok(QuotaCheckResult::allow(QuotaStatus::unlimited(used)));
        }

        let config = self.repo.get_quota_config(key.quota_type()).await?;
        let result = policy::evaluate(used, &config, policy::start_of_next_day(now));

        log_decision(key.as_str(), user_id, &result);
        Ok(result)
    }

    /// Current status of a daily quota. Checks never mutate anything, so this
    /// is the check itself.
    pub async fn daily_status<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        key: QuotaKey,
    ) -> AppResult<QuotaCheckResult> {
        self.daily_status_at(ctx, user_id, key, Utc::now()).await
    }

    pub async fn daily_status_at<C: RoleContext + ?Sized>(
        &self,
        ctx: &C,
        user_id: i32,
        key: QuotaKey,
        now: DateTime<Utc>,
    ) -> AppResult<QuotaCheckResult> {
        self.check_daily_at(ctx, user_id, key, now).await
    }

    /// Adds `amount` to today's counter for `key`. Zero is accepted and
    /// recorded as nothing.
    pub async fn record_daily(&self, user_id: i32, key: QuotaKey, amount: i64) -> AppResult<()> {
        self.record_daily_at(user_id, key, amount, Utc::now()).await
    }

    pub async fn record_daily_at(
        &self,
        user_id: i32,
        key: QuotaKey,
        amount: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if amount < 0 {
            return Err(AppError::Validation(format!(
                "usage amount must not be negative, got {}",
                amount
            )));
        }

        if amount == 0 {
            log::debug!("{} recorded zero usage: user={}", key, user_id);
            return Ok(());
        }

        let date = policy::day_key(now);
        self.repo
            .increment_daily_usage(user_id, date, key, amount)
            .await?;

        log::debug!(
            "{} recorded: user={} date={} amount={}",
            key,
            user_id,
            date,
            amount
        );
        Ok(())
    }

    /// Every daily counter recorded today, keyed by bucket
    pub async fn daily_usage_today(&self, user_id: i32) -> AppResult<HashMap<QuotaKey, i64>> {
        self.repo
            .get_all_daily_usage(user_id, policy::day_key(Utc::now()))
            .await
    }
}
