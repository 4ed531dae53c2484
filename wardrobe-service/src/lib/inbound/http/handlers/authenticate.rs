use auth::AuthError;
use auth::Claims;
use auth::CredentialStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::SERVER_ERROR_MESSAGE;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;

/// Message for every authentication failure: an unknown email and a wrong
/// password answer identically.
const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect email or password";

pub async fn authenticate<R>(
    State(state): State<AppState<R>>,
    Json(body): Json<AuthenticateRequestBody>,
) -> Result<ApiSuccess<AuthenticateResponseData>, ApiError>
where
    R: UserRepository + CredentialStore,
{
    let principal = state
        .credential_verifier
        .verify(&body.email, &body.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            AuthError::Hashing(_) | AuthError::Store(_) => {
                tracing::error!(error = %e, "Credential verification failed");
                ApiError::InternalServerError(SERVER_ERROR_MESSAGE.to_string())
            }
        })?;

    let claims = Claims::with_ttl(principal.subject_id, state.token_ttl_seconds);
    let token = state.token_codec.issue(&claims).map_err(|e| {
        tracing::error!(error = %e, "Token issuance failed");
        ApiError::InternalServerError(SERVER_ERROR_MESSAGE.to_string())
    })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AuthenticateResponseData { token },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticateRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticateResponseData {
    pub token: String,
}
