use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::CredentialRecord;
use auth::CredentialStore;
use auth::CredentialStoreError;
use auth::TokenCodec;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use wardrobe_service::domain::user::models::User;
use wardrobe_service::domain::user::models::UserId;
use wardrobe_service::inbound::http::router::create_router;
use wardrobe_service::user::errors::UserError;
use wardrobe_service::user::ports::UserRepository;

pub const TEST_SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";
pub const TEST_TOKEN_TTL_SECONDS: i64 = 3600;

/// In-memory stand-in for the Postgres repository, good enough to exercise
/// the full signup/signin/gate pipeline without a database.
pub struct InMemoryUserRepository {
    users: Mutex<Vec<(User, String)>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User, credential: String) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|(stored, _)| stored.email.as_str() == user.email.as_str())
        {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }
        users.push((user.clone(), credential));
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|(stored, _)| stored.id == *id)
            .map(|(stored, _)| stored.clone()))
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserRepository {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|(stored, _)| stored.email.as_str() == identifier)
            .map(|(stored, credential)| CredentialRecord {
                subject_id: stored.id.to_string(),
                credential: credential.clone(),
            }))
    }
}

pub fn test_router() -> Router {
    create_router(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(TokenCodec::new(TEST_SECRET)),
        TEST_TOKEN_TTL_SECONDS,
    )
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder
        .body(Body::empty())
        .expect("Failed to build request")
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not valid JSON")
}
