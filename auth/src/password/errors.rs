use thiserror::Error;

/// Error type for password operations.
///
/// A failure here means a cryptographic primitive misbehaved; it is never
/// attributable to user input. A wrong password is a `false` result from
/// [`super::PasswordHasher::verify`], not an error.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailure(String),
}
