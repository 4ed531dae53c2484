//! Authentication utilities library
//!
//! Provides the authentication core shared by services:
//! - Password hashing (scrypt, stored as `hex(salt):hex(key)`)
//! - Compact signed bearer tokens (HS256, implemented directly over
//!   HMAC-SHA256 and URL-safe base64 rather than a token library)
//! - Credential verification against a pluggable credential store
//!
//! Each service injects its own secret and credential store; nothing in this
//! crate reaches into global state.
//!
//! # Examples
//!
//! ## Password hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let credential = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &credential).unwrap());
//! assert!(!hasher.verify("not_my_password", &credential).unwrap());
//! ```
//!
//! ## Bearer tokens
//! ```
//! use auth::{Claims, TokenCodec};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::with_ttl("user123", 600);
//! let token = codec.issue(&claims).unwrap();
//! let decoded = codec.verify(&token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//! ```

pub mod password;
pub mod token;
pub mod verifier;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::TokenCodec;
pub use token::TokenError;
pub use verifier::AuthError;
pub use verifier::CredentialRecord;
pub use verifier::CredentialStore;
pub use verifier::CredentialStoreError;
pub use verifier::CredentialVerifier;
pub use verifier::Principal;
