//! Integration tests for Bootstrap functionality
//!
//! Tests the CREATE_SUPERUSER bootstrap mechanism.
//!
//! Note: These tests modify the process environment and must run serially.

use applytrack::bootstrap;
use applytrack::services::UsersService;
use serial_test::serial;
use std::env;

use crate::common::fixtures::create_user;
use crate::common::TestDb;

#[tokio::test]
#[serial]
async fn test_bootstrap_creates_admin_when_empty() {
    let db = TestDb::new().await;
    env::set_var("CREATE_SUPERUSER", "admin@example.com:password123");

    let result = bootstrap::create_superuser_if_needed(&db.pool).await;
    env::remove_var("CREATE_SUPERUSER");
    assert!(result.is_ok());

    let user = UsersService::get_by_email(&db.pool, "admin@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.is_admin);
    assert!(user.is_active);
    assert_eq!(user.role(), Some("admin"));
}

#[tokio::test]
#[serial]
async fn test_bootstrap_skips_when_users_exist() {
    let db = TestDb::new().await;
    create_user(&db.pool, "existing@example.com", false).await;
    env::set_var("CREATE_SUPERUSER", "admin@example.com:password123");

    let result = bootstrap::create_superuser_if_needed(&db.pool).await;
    env::remove_var("CREATE_SUPERUSER");
    assert!(result.is_ok());

    let admin = UsersService::get_by_email(&db.pool, "admin@example.com")
        .await
        .unwrap();
    assert!(admin.is_none());
}

#[tokio::test]
#[serial]
async fn test_bootstrap_skips_when_env_not_set() {
    let db = TestDb::new().await;
    env::remove_var("CREATE_SUPERUSER");

    let result = bootstrap::create_superuser_if_needed(&db.pool).await;
    assert!(result.is_ok());

    assert_eq!(UsersService::user_count(&db.pool).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_bootstrap_fails_with_invalid_format() {
    let db = TestDb::new().await;
    env::set_var("CREATE_SUPERUSER", "admin@example.com");

    let result = bootstrap::create_superuser_if_needed(&db.pool).await;
    env::remove_var("CREATE_SUPERUSER");

    assert!(result.is_err());
    assert_eq!(UsersService::user_count(&db.pool).await.unwrap(), 0);
}
