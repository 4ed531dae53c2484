use std::sync::Arc;
use std::time::Duration;

use auth::CredentialStore;
use auth::CredentialVerifier;
use auth::TokenCodec;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authenticate::authenticate;
use super::handlers::create_user::create_user;
use super::handlers::get_current_user::get_current_user;
use super::middleware::require_auth;
use crate::domain::user::service::UserService;
use crate::user::ports::UserRepository;

pub struct AppState<R>
where
    R: UserRepository + CredentialStore,
{
    pub user_service: Arc<UserService<R>>,
    pub credential_verifier: Arc<CredentialVerifier<R>>,
    pub token_codec: Arc<TokenCodec>,
    pub token_ttl_seconds: i64,
}

// Manual impl: deriving Clone would require R: Clone, which the Arcs make
// unnecessary.
impl<R> Clone for AppState<R>
where
    R: UserRepository + CredentialStore,
{
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            credential_verifier: Arc::clone(&self.credential_verifier),
            token_codec: Arc::clone(&self.token_codec),
            token_ttl_seconds: self.token_ttl_seconds,
        }
    }
}

pub fn create_router<R>(
    repository: Arc<R>,
    token_codec: Arc<TokenCodec>,
    token_ttl_seconds: i64,
) -> Router
where
    R: UserRepository + CredentialStore,
{
    let state = AppState {
        user_service: Arc::new(UserService::new(Arc::clone(&repository))),
        credential_verifier: Arc::new(CredentialVerifier::new(repository)),
        token_codec,
        token_ttl_seconds,
    };

    let public_routes = Router::new()
        .route("/signup", post(create_user::<R>))
        .route("/signin", post(authenticate::<R>));

    let protected_routes = Router::new()
        .route("/users/me", get(get_current_user::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<R>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
