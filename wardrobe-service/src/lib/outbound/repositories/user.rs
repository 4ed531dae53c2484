use async_trait::async_trait;
use auth::CredentialRecord;
use auth::CredentialStore;
use auth::CredentialStoreError;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::user::models::AvatarUrl;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserName;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow) -> Result<User, UserError> {
        let id: Uuid = row
            .try_get("id")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        let avatar: String = row
            .try_get("avatar")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        let created_at = row
            .try_get("created_at")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(User {
            id: UserId(id),
            name: UserName::new(name)?,
            avatar: AvatarUrl::new(avatar)?,
            email: EmailAddress::new(email)?,
            created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User, credential: String) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, avatar, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.avatar.as_str())
        .bind(user.email.as_str())
        .bind(&credential)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        // password_hash is deliberately absent from this projection
        let row = sqlx::query(
            r#"
            SELECT id, name, avatar, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

/// The only path that reads the stored credential.
#[async_trait]
impl CredentialStore for PostgresUserRepository {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CredentialStoreError(e.to_string()))?;

        row.map(|row| {
            let id: Uuid = row
                .try_get("id")
                .map_err(|e| CredentialStoreError(e.to_string()))?;
            let credential: String = row
                .try_get("password_hash")
                .map_err(|e| CredentialStoreError(e.to_string()))?;

            Ok(CredentialRecord {
                subject_id: id.to_string(),
                credential,
            })
        })
        .transpose()
    }
}
