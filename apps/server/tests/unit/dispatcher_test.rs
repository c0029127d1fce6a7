//! Unit tests for quota-type routing and the quota overview

use applytrack::error::AppError;
use applytrack::models::{QuotaKey, QuotaReason, QuotaType};
use applytrack::services::quota::dispatcher::QuotaMetadata;
use applytrack::services::quota::{CallerContext, DeploymentMode};
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::InMemoryStore;

const USER: i32 = 11;

fn metadata(value: serde_json::Value) -> QuotaMetadata {
    value.as_object().cloned().unwrap_or_default()
}

fn this_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

// =============================================================================
// Quota Type Parsing
// =============================================================================

#[test]
fn test_quota_type_round_trips_names() {
    for quota_type in QuotaType::ALL {
        assert_eq!(quota_type.as_str().parse::<QuotaType>().unwrap(), quota_type);
    }
}

#[test]
fn test_unknown_quota_type_rejected() {
    let err = "ai-analysis".parse::<QuotaType>().unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("unknown quota type")));

    assert!("".parse::<QuotaType>().is_err());
    assert!("AI_ANALYSIS".parse::<QuotaType>().is_err());
}

// =============================================================================
// Check Routing
// =============================================================================

#[actix_web::test]
async fn test_ai_analysis_without_job_id_makes_no_calls() {
    let store = InMemoryStore::new();

    let err = store
        .service(DeploymentMode::Cloud)
        .check_quota(
            &CallerContext::standard(),
            USER,
            QuotaType::AiAnalysis,
            &QuotaMetadata::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("job_id required")));
    assert_eq!(store.repo_calls(), 0);
}

#[actix_web::test]
async fn test_ai_analysis_accepts_numeric_string_job_id() {
    let store = InMemoryStore::new();
    let job = store.add_job(USER);

    let result = store
        .service(DeploymentMode::Cloud)
        .check_quota(
            &CallerContext::standard(),
            USER,
            QuotaType::AiAnalysis,
            &metadata(json!({ "job_id": job.to_string() })),
        )
        .await
        .unwrap();

    assert!(result.allowed);
    assert_eq!(result.status.limit, 10);
}

#[actix_web::test]
async fn test_ai_analysis_rejects_bad_job_id() {
    let store = InMemoryStore::new();
    let service = store.service(DeploymentMode::Cloud);

    for bad in [json!("abc"), json!(-4), json!(0), json!(1.5), json!(true)] {
        let err = service
            .check_quota(
                &CallerContext::standard(),
                USER,
                QuotaType::AiAnalysis,
                &metadata(json!({ "job_id": bad })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "accepted {}", bad);
    }
    assert_eq!(store.repo_calls(), 0);
}

#[actix_web::test]
async fn test_daily_types_ignore_metadata_on_check() {
    let store = InMemoryStore::new();
    store.set_daily(USER, Utc::now().date_naive(), QuotaKey::SearchesRun, 5);

    let result = store
        .service(DeploymentMode::Cloud)
        .check_quota(
            &CallerContext::standard(),
            USER,
            QuotaType::SearchRun,
            &metadata(json!({ "job_id": "not used" })),
        )
        .await
        .unwrap();

    assert!(!result.allowed);
    assert_eq!(result.reason, QuotaReason::LimitReached);
}

// =============================================================================
// Record Routing
// =============================================================================

#[actix_web::test]
async fn test_record_ai_analysis_routes_to_monthly() {
    let store = InMemoryStore::new();
    let job = store.add_job(USER);

    store
        .service(DeploymentMode::Cloud)
        .record_usage(
            USER,
            QuotaType::AiAnalysis,
            &metadata(json!({ "job_id": job })),
        )
        .await
        .unwrap();

    assert_eq!(store.monthly(USER, &this_month()), 1);
    assert!(store.job(job).was_analyzed());
}

#[actix_web::test]
async fn test_record_daily_defaults_to_one() {
    let store = InMemoryStore::new();
    let service = store.service(DeploymentMode::Cloud);

    service
        .record_usage(USER, QuotaType::JobCapture, &QuotaMetadata::new())
        .await
        .unwrap();
    service
        .record_usage(
            USER,
            QuotaType::JobSearch,
            &metadata(json!({ "amount": 25 })),
        )
        .await
        .unwrap();

    let usage = service.daily_usage_today(USER).await.unwrap();
    assert_eq!(usage[&QuotaKey::JobsCaptured], 1);
    assert_eq!(usage[&QuotaKey::JobsFound], 25);
}

#[actix_web::test]
async fn test_record_negative_amount_rejected() {
    let store = InMemoryStore::new();

    let err = store
        .service(DeploymentMode::Cloud)
        .record_usage(
            USER,
            QuotaType::SearchRun,
            &metadata(json!({ "amount": -3 })),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.daily_row_count(), 0);
}

#[actix_web::test]
async fn test_record_ai_analysis_without_job_id() {
    let store = InMemoryStore::new();

    let err = store
        .service(DeploymentMode::SelfHosted)
        .record_usage(
            USER,
            QuotaType::AiAnalysis,
            &metadata(json!({ "job_id": null })),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.repo_calls(), 0);
}

// =============================================================================
// Overview
// =============================================================================

#[actix_web::test]
async fn test_overview_in_cloud_mode() {
    let store = InMemoryStore::new();
    let today = Utc::now().date_naive();
    store.set_monthly(USER, &this_month(), 4);
    store.set_daily(USER, today, QuotaKey::JobsCaptured, 30);
    store.set_daily(USER, today, QuotaKey::SearchesRun, 5);

    let overview = store
        .service(DeploymentMode::Cloud)
        .get_all_quota_status(&CallerContext::standard(), USER)
        .await
        .unwrap();

    assert!(overview.ai_analysis.allowed);
    assert_eq!(overview.ai_analysis.status.used, 4);
    assert_eq!(overview.ai_analysis.status.limit, 10);

    assert!(overview.job_capture.allowed);
    assert_eq!(overview.job_capture.status.used, 30);
    assert_eq!(overview.job_capture.status.limit, -1);

    assert!(overview.job_search.allowed);
    assert_eq!(overview.job_search.status.limit, 20);

    assert!(!overview.search_run.allowed);
    assert_eq!(overview.search_run.reason, QuotaReason::LimitReached);
}

#[actix_web::test]
async fn test_overview_self_hosted_is_unlimited() {
    let store = InMemoryStore::new();
    store.set_monthly(USER, &this_month(), 99);

    let overview = store
        .service(DeploymentMode::SelfHosted)
        .get_all_quota_status(&CallerContext::standard(), USER)
        .await
        .unwrap();

    for result in [
        &overview.ai_analysis,
        &overview.job_capture,
        &overview.job_search,
        &overview.search_run,
    ] {
        assert!(result.allowed);
        assert_eq!(result.status.limit, -1);
        assert_eq!(result.status.reset_date, None);
    }
    assert_eq!(overview.ai_analysis.status.used, 99);
}

#[actix_web::test]
async fn test_overview_failure_names_the_quota() {
    let store = InMemoryStore::new();
    store.fail_config(QuotaType::JobSearch);

    let err = store
        .service(DeploymentMode::Cloud)
        .get_all_quota_status(&CallerContext::standard(), USER)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(
        message.contains("failed to get job_search quota status"),
        "unexpected error: {}",
        message
    );
}
