use thiserror::Error;

/// Error type for token operations.
///
/// The first three variants are expected, input-driven outcomes of
/// verification. `CryptoFailure` is the internal class: a primitive or
/// serializer malfunction while issuing, never caused by a presented token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token signature does not match")]
    SignatureMismatch,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Cryptographic primitive failure: {0}")]
    CryptoFailure(String),
}
