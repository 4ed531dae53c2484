use auth::CredentialStore;
use auth::Principal;
use auth::TokenError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;

/// Message every rejected request sees, regardless of why it was rejected.
pub const UNAUTHORIZED_MESSAGE: &str = "Authorization required";

/// Why the gate rejected a request. Logged for diagnostics, never surfaced:
/// the client-visible response is identical for every variant.
#[derive(Debug, Error)]
enum GateError {
    #[error("Missing or malformed Authorization header")]
    MissingAuthorizationHeader,

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Middleware guarding protected routes.
///
/// Extracts the bearer token, verifies it, and attaches the decoded
/// [`Principal`] to the request extensions. Verification is a pure
/// computation over the token and the process secret; nothing is shared
/// between concurrent requests.
pub async fn require_auth<R>(
    State(state): State<AppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response>
where
    R: UserRepository + CredentialStore,
{
    let token = match bearer_token(&req) {
        Some(token) => token,
        None => return Err(reject(GateError::MissingAuthorizationHeader)),
    };

    match state.token_codec.verify(token) {
        Ok(claims) => {
            req.extensions_mut().insert(Principal::from(&claims));
            Ok(next.run(req).await)
        }
        Err(e) => Err(reject(GateError::from(e))),
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn reject(reason: GateError) -> Response {
    // Expected, input-driven outcome: log quietly, answer generically so the
    // caller cannot tell which check failed.
    tracing::debug!(reason = %reason, "Rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": UNAUTHORIZED_MESSAGE })),
    )
        .into_response()
}
