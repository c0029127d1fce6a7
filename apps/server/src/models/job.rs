use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked job opportunity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub company: String,
    pub url: Option<String>,
    pub description: Option<String>,
    /// Set by the first recorded AI analysis and never cleared afterwards.
    /// `Some` marks any further analysis as a re-analysis.
    pub first_analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn was_analyzed(&self) -> bool {
        self.first_analyzed_at.is_some()
    }
}

/// DTO for capturing a job
#[derive(Debug, Deserialize)]
pub struct CreateJob {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
