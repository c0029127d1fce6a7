//! Access policy and period arithmetic shared by the monthly and daily
//! checkers. Everything here is pure.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use super::ADMIN_ROLE;
use crate::models::{QuotaCheckResult, QuotaConfig, QuotaStatus};

/// Deployment mode, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    /// Metered: quotas are enforced for non-admin callers
    Cloud,
    /// Unmetered: usage is reported but never enforced
    SelfHosted,
}

impl DeploymentMode {
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("cloud") {
            DeploymentMode::Cloud
        } else {
            DeploymentMode::SelfHosted
        }
    }

    pub fn is_metered(&self) -> bool {
        matches!(self, DeploymentMode::Cloud)
    }
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentMode::Cloud => write!(f, "cloud"),
            DeploymentMode::SelfHosted => write!(f, "self-hosted"),
        }
    }
}

/// Whether a call skips enforcement entirely (usage is still reported).
///
/// True for any call in self-hosted mode, for the admin role in cloud mode,
/// and for quotas that are never metered.
pub fn bypasses_enforcement(
    mode: DeploymentMode,
    role: Option<&str>,
    unmetered_quota: bool,
) -> bool {
    unmetered_quota || !mode.is_metered() || role == Some(ADMIN_ROLE)
}

/// Applies a configured free limit to a usage count
pub fn evaluate(used: i64, config: &QuotaConfig, reset_date: DateTime<Utc>) -> QuotaCheckResult {
    if config.is_unlimited() {
        return QuotaCheckResult::allow(QuotaStatus::unlimited(used));
    }

    let status = QuotaStatus::limited(used, config.free_limit, reset_date);
    if used >= config.free_limit {
        QuotaCheckResult::limit_reached(status)
    } else {
        QuotaCheckResult::allow(status)
    }
}

// =============================================================================
// Periods
// =============================================================================

/// Monthly counter key, e.g. `2024-01`
pub fn month_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Daily counter key: the UTC calendar date
pub fn day_key(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// First instant of the next calendar month, UTC
pub fn start_of_next_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .expect("first day of a month is always a valid date")
}

/// Next UTC midnight
pub fn start_of_next_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .succ_opt()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .expect("the day after a representable date is representable")
}
