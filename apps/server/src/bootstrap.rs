use log::{info, warn};
use sqlx::PgPool;
use std::env;

use crate::error::{AppError, AppResult};
use crate::models::CreateUserRequest;
use crate::services::UsersService;

/// Creates the first account as an admin from `CREATE_SUPERUSER=email:password`.
/// Does nothing once any user exists.
pub async fn create_superuser_if_needed(pool: &PgPool) -> AppResult<()> {
    let create_superuser = match env::var("CREATE_SUPERUSER") {
        Ok(val) if !val.is_empty() => val,
        _ => {
            info!("CREATE_SUPERUSER not set, skipping superuser creation");
            return Ok(());
        }
    };

    if UsersService::user_count(pool).await? > 0 {
        warn!("CREATE_SUPERUSER set but users already exist. Skipping superuser creation.");
        return Ok(());
    }

    let req = parse_superuser(&create_superuser)?;
    UsersService::create_user(pool, &req, true).await?;
    info!("Superuser created: {} (quota bypass enabled)", req.email);

    Ok(())
}

/// Splits `email:password` at the first colon; passwords may contain colons
pub fn parse_superuser(value: &str) -> AppResult<CreateUserRequest> {
    let (email, password) = value.split_once(':').ok_or_else(|| {
        AppError::Validation("CREATE_SUPERUSER must be in format 'email:password'".to_string())
    })?;

    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    Ok(CreateUserRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}
