//! Unit tests for account input parsing
//!
//! Email validation, superuser bootstrap parsing and role derivation.

use applytrack::bootstrap::parse_superuser;
use applytrack::models::User;
use applytrack::routes::auth::is_valid_email;
use chrono::Utc;

fn user(is_admin: bool) -> User {
    User {
        id: 1,
        email: "someone@example.com".to_string(),
        password_hash: String::new(),
        is_active: true,
        is_admin,
        created_at: Utc::now(),
        last_login: None,
    }
}

// =============================================================================
// Email Validation
// =============================================================================

#[test]
fn test_valid_emails() {
    for email in [
        "user@example.com",
        "first.last@mail.example.org",
        "a+tag@example.io",
    ] {
        assert!(is_valid_email(email), "{} should be valid", email);
    }
}

#[test]
fn test_invalid_emails() {
    for email in [
        "",
        "plainaddress",
        "@example.com",
        "user@",
        "user@localhost",
        "user@example.c",
        "user@@example.com",
        "user@example..com",
    ] {
        assert!(!is_valid_email(email), "{} should be invalid", email);
    }
}

// =============================================================================
// Superuser Parsing
// =============================================================================

#[test]
fn test_parse_superuser() {
    let req = parse_superuser("admin@example.com:s3cret").unwrap();

    assert_eq!(req.email, "admin@example.com");
    assert_eq!(req.password, "s3cret");
}

#[test]
fn test_parse_superuser_password_with_colon() {
    let req = parse_superuser("admin@example.com:pa:ss").unwrap();

    assert_eq!(req.password, "pa:ss");
}

#[test]
fn test_parse_superuser_rejects_bad_format() {
    assert!(parse_superuser("admin@example.com").is_err());
    assert!(parse_superuser("admin@example.com:").is_err());
}

// =============================================================================
// Roles
// =============================================================================

#[test]
fn test_admin_flag_maps_to_admin_role() {
    assert_eq!(user(true).role(), Some("admin"));
    assert_eq!(user(false).role(), None);
}
