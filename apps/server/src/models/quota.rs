//! Quota models.
//!
//! Usage counters are keyed by period: `monthly_usage` by (user, `YYYY-MM`)
//! for AI analyses, `daily_usage` by (user, UTC date, quota key) for
//! captures and searches. Rows are created by the first increment, only ever
//! incremented, and never deleted; a new period starts a fresh counter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

use crate::error::AppError;

/// Limit value meaning "not enforced"
pub const UNLIMITED: i64 = -1;

// =============================================================================
// Quota Type Enum
// =============================================================================

/// Consumable resource governed by the quota engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuotaType {
    /// AI analysis of a job, metered per calendar month
    AiAnalysis,
    /// Capturing a job into the tracker, tracked per day but never enforced
    JobCapture,
    /// Listing results from a job search, metered per day
    JobSearch,
    /// Executing a saved search, metered per day
    SearchRun,
}

impl QuotaType {
    pub const ALL: [QuotaType; 4] = [
        QuotaType::AiAnalysis,
        QuotaType::JobCapture,
        QuotaType::JobSearch,
        QuotaType::SearchRun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaType::AiAnalysis => "ai_analysis",
            QuotaType::JobCapture => "job_capture",
            QuotaType::JobSearch => "job_search",
            QuotaType::SearchRun => "search_run",
        }
    }

    /// Daily counter bucket for this quota, `None` for the monthly quota
    pub fn daily_key(&self) -> Option<QuotaKey> {
        match self {
            QuotaType::AiAnalysis => None,
            QuotaType::JobCapture => Some(QuotaKey::JobsCaptured),
            QuotaType::JobSearch => Some(QuotaKey::JobsFound),
            QuotaType::SearchRun => Some(QuotaKey::SearchesRun),
        }
    }
}

impl std::fmt::Display for QuotaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuotaType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown quota type: {}", s)))
    }
}

// =============================================================================
// Quota Key Enum
// =============================================================================

/// Daily counter bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuotaKey {
    JobsCaptured,
    JobsFound,
    SearchesRun,
}

impl QuotaKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaKey::JobsCaptured => "jobs_captured",
            QuotaKey::JobsFound => "jobs_found",
            QuotaKey::SearchesRun => "searches_run",
        }
    }

    /// Quota type whose free limit governs this bucket
    pub fn quota_type(&self) -> QuotaType {
        match self {
            QuotaKey::JobsCaptured => QuotaType::JobCapture,
            QuotaKey::JobsFound => QuotaType::JobSearch,
            QuotaKey::SearchesRun => QuotaType::SearchRun,
        }
    }
}

impl std::fmt::Display for QuotaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stored Rows
// =============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthlyUsage {
    pub user_id: i32,
    pub month_year: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyUsage {
    pub user_id: i32,
    pub usage_date: NaiveDate,
    pub quota_key: QuotaKey,
    pub count: i64,
}

/// Free-tier limit for a quota type. Administered outside the engine.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuotaConfig {
    pub quota_type: QuotaType,
    /// `-1` means unlimited
    pub free_limit: i64,
    pub description: String,
}

impl QuotaConfig {
    pub fn is_unlimited(&self) -> bool {
        self.free_limit == UNLIMITED
    }
}

// =============================================================================
// Decision Objects
// =============================================================================

/// Usage snapshot for one quota
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub used: i64,
    /// `-1` when the quota is not enforced for this caller
    pub limit: i64,
    /// Start of the next period; `None` when nothing is enforced
    pub reset_date: Option<DateTime<Utc>>,
}

impl QuotaStatus {
    /// Usage reported for visibility only
    pub fn unlimited(used: i64) -> Self {
        Self {
            used,
            limit: UNLIMITED,
            reset_date: None,
        }
    }

    pub fn limited(used: i64, limit: i64, reset_date: DateTime<Utc>) -> Self {
        Self {
            used,
            limit,
            reset_date: Some(reset_date),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == UNLIMITED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotaReason {
    Ok,
    /// Job was analyzed before; re-analysis is always permitted
    Reanalysis,
    LimitReached,
}

/// Outcome of a quota check. Callers branch on `allowed` and `reason` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaCheckResult {
    pub allowed: bool,
    pub reason: QuotaReason,
    pub status: QuotaStatus,
}

impl QuotaCheckResult {
    pub fn allow(status: QuotaStatus) -> Self {
        Self {
            allowed: true,
            reason: QuotaReason::Ok,
            status,
        }
    }

    pub fn reanalysis(status: QuotaStatus) -> Self {
        Self {
            allowed: true,
            reason: QuotaReason::Reanalysis,
            status,
        }
    }

    pub fn limit_reached(status: QuotaStatus) -> Self {
        Self {
            allowed: false,
            reason: QuotaReason::LimitReached,
            status,
        }
    }
}

/// Status of every quota for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaOverview {
    pub ai_analysis: QuotaCheckResult,
    pub job_capture: QuotaCheckResult,
    pub job_search: QuotaCheckResult,
    pub search_run: QuotaCheckResult,
}

/// Request body for the check and record endpoints
#[derive(Debug, Deserialize)]
pub struct QuotaUsageRequest {
    pub quota_type: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
