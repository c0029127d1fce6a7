use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::{CreateJob, Job};
use crate::services::quota::JobProvider;

const JOB_COLUMNS: &str = "id, user_id, title, company, url, description, first_analyzed_at, \
                           created_at, updated_at";

pub struct JobService;

impl JobService {
    /// Inserts a captured job for `user_id`
    pub async fn create(pool: &PgPool, user_id: i32, input: CreateJob) -> AppResult<Job> {
        let title = input.title.trim();
        let company = input.company.trim();
        if title.is_empty() || company.is_empty() {
            return Err(AppError::Validation(
                "Job title and company are required".to_string(),
            ));
        }

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (user_id, title, company, url, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(title)
        .bind(company)
        .bind(&input.url)
        .bind(&input.description)
        .fetch_one(pool)
        .await?;

        Ok(job)
    }

    /// Gets a job owned by `user_id`
    pub async fn get_by_id(pool: &PgPool, user_id: i32, job_id: i32) -> AppResult<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND user_id = $2"
        ))
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))
    }

    /// Sets `first_analyzed_at` on a job owned by `user_id` unless it is
    /// already set. Returns false when no such job exists.
    pub async fn mark_first_analyzed<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i32,
        job_id: i32,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET first_analyzed_at = COALESCE(first_analyzed_at, NOW())
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// [`JobProvider`] over the `jobs` table
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobProvider for PgJobStore {
    async fn get_by_id(&self, user_id: i32, job_id: i32) -> AppResult<Job> {
        JobService::get_by_id(&self.pool, user_id, job_id).await
    }
}
