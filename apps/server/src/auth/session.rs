use actix_session::Session;
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use std::pin::Pin;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::services::quota::RoleContext;
use crate::services::UsersService;

const SESSION_USER_ID_KEY: &str = "user_id";

/// Store user ID in session
pub fn set_user_session(session: &Session, user_id: i32) -> AppResult<()> {
    session
        .insert(SESSION_USER_ID_KEY, user_id)
        .map_err(|e| AppError::Internal(format!("Failed to set session: {}", e)))
}

/// Get user ID from session
pub fn get_user_id_from_session(session: &Session) -> Option<i32> {
    session.get::<i32>(SESSION_USER_ID_KEY).ok().flatten()
}

/// Clear session (logout)
pub fn clear_session(session: &Session) {
    session.purge();
}

/// Extractor for the session's user. Also the role source for quota checks.
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

impl RoleContext for AuthenticatedUser {
    fn role(&self) -> Option<&str> {
        self.0.role()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let session = Session::extract(&req)
                .await
                .map_err(|_| AppError::Unauthorized("Session error".to_string()))?;

            let user_id = get_user_id_from_session(&session)
                .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

            let pool = req
                .app_data::<web::Data<DbPool>>()
                .ok_or_else(|| AppError::Internal("Database pool not found".to_string()))?;

            let user = UsersService::get_by_id(pool.get_ref(), user_id)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to fetch user: {}", e)))?
                .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

            // Deactivated accounts lose access immediately, even mid-session
            if !user.is_active {
                return Err(AppError::Unauthorized("User is inactive".to_string()).into());
            }

            Ok(AuthenticatedUser(user))
        })
    }
}
