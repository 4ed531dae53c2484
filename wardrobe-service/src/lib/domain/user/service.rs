use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        // Hashing is deliberately expensive; keep it off the async workers.
        // If the caller disconnects the task is dropped before anything is
        // written.
        let password = command.password;
        let credential =
            tokio::task::spawn_blocking(move || PasswordHasher::new().hash(&password))
                .await
                .map_err(|e| UserError::Unknown(e.to_string()))??;

        let user = User {
            id: UserId::new(),
            name: command.name,
            avatar: command.avatar,
            email: command.email,
            created_at: Utc::now(),
        };

        self.repository.create(user, credential).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::AvatarUrl;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::UserName;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User, credential: String) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
        }
    }

    fn test_command() -> CreateUserCommand {
        CreateUserCommand {
            name: UserName::new("Terrence".to_string()).unwrap(),
            avatar: AvatarUrl::new("https://example.com/avatar.png".to_string()).unwrap(),
            email: EmailAddress::new("terrence@example.com".to_string()).unwrap(),
            password: "pass_word!".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user, credential| {
                user.name.as_str() == "Terrence"
                    && user.email.as_str() == "terrence@example.com"
                    // Stored as hex(salt):hex(key), never the plaintext
                    && credential.split_once(':').is_some_and(|(salt, key)| {
                        salt.len() == 32 && key.len() == 128
                    })
            })
            .times(1)
            .returning(|user, _| Ok(user));

        let service = UserService::new(Arc::new(repository));

        let user = service
            .register_user(test_command())
            .await
            .expect("Registration failed");

        assert_eq!(user.name.as_str(), "Terrence");
        assert_eq!(user.avatar.as_str(), "https://example.com/avatar.png");
    }

    #[tokio::test]
    async fn test_register_user_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user, _| {
            Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ))
        });

        let service = UserService::new(Arc::new(repository));

        let result = service.register_user(test_command()).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }
}
