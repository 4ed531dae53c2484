use auth::CredentialStore;
use auth::Principal;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Return the profile of the authenticated principal.
///
/// The gate middleware has already verified the token and attached the
/// [`Principal`]; this handler only resolves it to a stored user.
pub async fn get_current_user<R>(
    State(state): State<AppState<R>>,
    Extension(principal): Extension<Principal>,
) -> Result<ApiSuccess<CurrentUserResponseData>, ApiError>
where
    R: UserRepository + CredentialStore,
{
    let user_id = UserId::from_string(&principal.subject_id).map_err(|e| {
        // A signed token carrying a non-UUID subject means we issued it
        // wrong; that is on us, not the caller.
        tracing::error!(error = %e, "Verified token carried an unparseable subject");
        ApiError::NotFound("User not found".to_string())
    })?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUserResponseData {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for CurrentUserResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            avatar: user.avatar.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}
