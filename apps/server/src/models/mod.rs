pub mod job;
pub mod quota;
pub mod user;

pub use job::{CreateJob, Job};
pub use quota::{
    DailyUsage, MonthlyUsage, QuotaCheckResult, QuotaConfig, QuotaKey, QuotaOverview,
    QuotaReason, QuotaStatus, QuotaType, QuotaUsageRequest, UNLIMITED,
};
pub use user::{CreateUserRequest, LoginRequest, User};
