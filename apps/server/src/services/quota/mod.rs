//! Quota engine.
//!
//! Meters and gates per-user consumption of AI analyses (per calendar month)
//! and of job captures, job searches and search runs (per UTC day).
//!
//! Every operation is a pair of independent calls: `check_*` computes a
//! [`QuotaCheckResult`] and `record_*` counts the usage afterwards. No lock is
//! held between the two, so concurrent requests from the same account can
//! overshoot a limit by a small margin. Limits are soft.
//!
//! Storage and job lookup are reached through the [`QuotaRepository`] and
//! [`JobProvider`] traits; the caller's role arrives through [`RoleContext`].

pub mod daily;
pub mod dispatcher;
pub mod monthly;
pub mod policy;
pub mod store;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{Job, QuotaConfig, QuotaKey, QuotaType};
use crate::services::job::PgJobStore;

pub use policy::{bypasses_enforcement, DeploymentMode};
pub use store::PgQuotaRepository;

/// The only role value that bypasses enforcement
pub const ADMIN_ROLE: &str = "admin";

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Durable usage counters and free-tier configuration.
///
/// Increments must be atomic upserts: two concurrent increments of the same
/// key are both reflected.
#[async_trait]
pub trait QuotaRepository: Send + Sync {
    /// AI analyses recorded for `month_year` (`YYYY-MM`), zero when no row exists
    async fn get_monthly_usage(&self, user_id: i32, month_year: &str) -> AppResult<i64>;

    /// Daily counter for one bucket, zero when no row exists
    async fn get_daily_usage(&self, user_id: i32, date: NaiveDate, key: QuotaKey)
        -> AppResult<i64>;

    async fn increment_daily_usage(
        &self,
        user_id: i32,
        date: NaiveDate,
        key: QuotaKey,
        amount: i64,
    ) -> AppResult<()>;

    /// Every daily counter that exists for `date`
    async fn get_all_daily_usage(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> AppResult<HashMap<QuotaKey, i64>>;

    async fn get_quota_config(&self, quota_type: QuotaType) -> AppResult<QuotaConfig>;

    /// Marks the job as analyzed (only if it never was) and increments the
    /// month's counter, all or nothing.
    async fn record_analysis(&self, user_id: i32, job_id: i32, month_year: &str)
        -> AppResult<()>;
}

/// Job lookup needed to tell a first analysis from a re-analysis
#[async_trait]
pub trait JobProvider: Send + Sync {
    /// Resolves a job owned by `user_id`. A missing job is `AppError::NotFound`.
    async fn get_by_id(&self, user_id: i32, job_id: i32) -> AppResult<Job>;
}

/// Source of the caller's role for the current request
pub trait RoleContext: Sync {
    fn role(&self) -> Option<&str>;
}

/// Role context for callers outside an HTTP session (batch jobs, tests)
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    pub role: Option<String>,
}

impl CallerContext {
    /// A standard caller with no role
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self::with_role(ADMIN_ROLE)
    }

    pub fn with_role(role: &str) -> Self {
        Self {
            role: Some(role.to_string()),
        }
    }
}

impl RoleContext for CallerContext {
    fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

// =============================================================================
// Quota Service
// =============================================================================

/// Checker/recorder for every quota type.
///
/// The operations are split by period: [`monthly`] for AI analyses, [`daily`]
/// for captures and searches, and [`dispatcher`] for routing by quota type.
#[derive(Clone)]
pub struct QuotaService {
    repo: Arc<dyn QuotaRepository>,
    jobs: Arc<dyn JobProvider>,
    mode: DeploymentMode,
}

impl QuotaService {
    pub fn new(
        repo: Arc<dyn QuotaRepository>,
        jobs: Arc<dyn JobProvider>,
        mode: DeploymentMode,
    ) -> Self {
        Self { repo, jobs, mode }
    }

    /// Engine backed by the PostgreSQL quota tables and jobs table
    pub fn postgres(pool: &DbPool, mode: DeploymentMode) -> Self {
        Self::new(
            Arc::new(PgQuotaRepository::new(pool.clone())),
            Arc::new(PgJobStore::new(pool.clone())),
            mode,
        )
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    fn bypasses<C: RoleContext + ?Sized>(&self, ctx: &C, unmetered_quota: bool) -> bool {
        bypasses_enforcement(self.mode, ctx.role(), unmetered_quota)
    }
}
