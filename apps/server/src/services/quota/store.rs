use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use super::QuotaRepository;
use crate::error::{AppError, AppResult};
use crate::models::{DailyUsage, MonthlyUsage, QuotaConfig, QuotaKey, QuotaType};
use crate::services::job::JobService;

/// Quota counters stored in `monthly_usage` / `daily_usage`
#[derive(Clone)]
pub struct PgQuotaRepository {
    pool: PgPool,
}

impl PgQuotaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn bump_monthly<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i32,
        month_year: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO monthly_usage (user_id, month_year, count)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, month_year)
            DO UPDATE SET count = monthly_usage.count + 1, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(month_year)
        .execute(executor)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl QuotaRepository for PgQuotaRepository {
    async fn get_monthly_usage(&self, user_id: i32, month_year: &str) -> AppResult<i64> {
        let row = sqlx::query_as::<_, MonthlyUsage>(
            r#"
            SELECT user_id, month_year, count FROM monthly_usage
            WHERE user_id = $1 AND month_year = $2
            "#,
        )
        .bind(user_id)
        .bind(month_year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map_or(0, |usage| usage.count))
    }

    async fn get_daily_usage(
        &self,
        user_id: i32,
        date: NaiveDate,
        key: QuotaKey,
    ) -> AppResult<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT count FROM daily_usage
            WHERE user_id = $1 AND usage_date = $2 AND quota_key = $3
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count.unwrap_or(0))
    }

    async fn increment_daily_usage(
        &self,
        user_id: i32,
        date: NaiveDate,
        key: QuotaKey,
        amount: i64,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_usage (user_id, usage_date, quota_key, count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, usage_date, quota_key)
            DO UPDATE SET count = daily_usage.count + EXCLUDED.count, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(key)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_all_daily_usage(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> AppResult<HashMap<QuotaKey, i64>> {
        let rows = sqlx::query_as::<_, DailyUsage>(
            r#"
            SELECT user_id, usage_date, quota_key, count FROM daily_usage
            WHERE user_id = $1 AND usage_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|usage| (usage.quota_key, usage.count))
            .collect())
    }

    async fn get_quota_config(&self, quota_type: QuotaType) -> AppResult<QuotaConfig> {
        sqlx::query_as::<_, QuotaConfig>(
            "SELECT quota_type, free_limit, description FROM quota_config WHERE quota_type = $1",
        )
        .bind(quota_type)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quota config for {} not found", quota_type)))
    }

    async fn record_analysis(&self, user_id: i32, job_id: i32, month_year: &str) -> AppResult<()> {
        // Rolls back on drop, so an early return or a cancelled request
        // leaves neither the job flag nor the counter applied.
        let mut tx = self.pool.begin().await?;

        if !JobService::mark_first_analyzed(&mut *tx, user_id, job_id).await? {
            return Err(AppError::NotFound(format!("Job {} not found", job_id)));
        }
        Self::bump_monthly(&mut *tx, user_id, month_year).await?;

        tx.commit().await?;
        Ok(())
    }
}
