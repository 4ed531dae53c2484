use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::AvatarUrlError;
use crate::user::errors::EmailError;
use crate::user::errors::UserIdError;
use crate::user::errors::UserNameError;

/// User aggregate entity.
///
/// This is the read model: the stored credential is deliberately not part of
/// it. The credential is reachable only through the credential-check path
/// (`auth::CredentialStore`).
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub avatar: AvatarUrl,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type, 2 to 30 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 30;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Name shorter than 2 characters
    /// * `TooLong` - Name longer than 30 characters
    pub fn new(name: String) -> Result<Self, UserNameError> {
        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UserNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UserNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Avatar URL value type
///
/// Must parse as an absolute URL; stored as the original string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUrl(String);

impl AvatarUrl {
    /// Create a new validated avatar URL.
    ///
    /// # Errors
    /// * `InvalidUrl` - String is not a valid absolute URL
    pub fn new(url: String) -> Result<Self, AvatarUrlError> {
        url::Url::parse(&url)
            .map(|_| AvatarUrl(url))
            .map_err(|e| AvatarUrlError::InvalidUrl(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub name: UserName,
    pub avatar: AvatarUrl,
    pub email: EmailAddress,
    pub password: String,
}

impl CreateUserCommand {
    pub fn new(name: UserName, avatar: AvatarUrl, email: EmailAddress, password: String) -> Self {
        Self {
            name,
            avatar,
            email,
            password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_bounds() {
        assert!(UserName::new("Jo".to_string()).is_ok());
        assert!(UserName::new("J".to_string()).is_err());
        assert!(UserName::new("x".repeat(30)).is_ok());
        assert!(UserName::new("x".repeat(31)).is_err());
    }

    #[test]
    fn test_avatar_url() {
        assert!(AvatarUrl::new("https://example.com/a.png".to_string()).is_ok());
        assert!(AvatarUrl::new("not a url".to_string()).is_err());
    }

    #[test]
    fn test_email_address() {
        assert!(EmailAddress::new("alice@example.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }
}
