use rand::rngs::OsRng;
use rand::RngCore;
use scrypt::Params;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// Random salt length in bytes (stored hex-encoded, so 32 characters).
const SALT_LEN: usize = 16;

/// Derived key length in bytes.
const KEY_LEN: usize = 64;

// Fixed scrypt work factors: N = 2^14, r = 8, p = 1. These are not
// caller-configurable; changing them invalidates every stored credential.
const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 1;

/// Password hashing implementation.
///
/// Derives a 64-byte key with scrypt from the password and a fresh random
/// salt, and stores credentials as `hex(salt):hex(key)`. The salt bytes fed
/// to the KDF are the hex string itself, which is what the stored format
/// round-trips through on verification.
#[derive(Clone)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password for storage.
    ///
    /// Every call draws a new random salt, so hashing the same password
    /// twice yields two different credential strings.
    ///
    /// # Errors
    /// * `HashingFailure` - The underlying KDF primitive failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let salt_hex = hex::encode(salt);

        let key = derive_key(password, &salt_hex)?;

        Ok(format!("{salt_hex}:{}", hex::encode(key)))
    }

    /// Verify a plaintext password against a stored credential string.
    ///
    /// A credential that does not split into `salt:key` is treated as a
    /// non-match, not an error. The comparison against the stored key is
    /// constant-time.
    ///
    /// # Errors
    /// * `HashingFailure` - The underlying KDF primitive failed
    pub fn verify(&self, password: &str, credential: &str) -> Result<bool, PasswordError> {
        let Some((salt_hex, key_hex)) = credential.split_once(':') else {
            return Ok(false);
        };
        if salt_hex.is_empty() || key_hex.is_empty() {
            return Ok(false);
        }
        let Ok(stored_key) = hex::decode(key_hex) else {
            return Ok(false);
        };

        let derived = derive_key(password, salt_hex)?;

        // ct_eq handles length mismatch by reporting inequality
        Ok(bool::from(derived.as_slice().ct_eq(stored_key.as_slice())))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_key(password: &str, salt_hex: &str) -> Result<[u8; KEY_LEN], PasswordError> {
    let params = Params::new(LOG_N, R, P, KEY_LEN)
        .map_err(|e| PasswordError::HashingFailure(e.to_string()))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt_hex.as_bytes(), &params, &mut key)
        .map_err(|e| PasswordError::HashingFailure(e.to_string()))?;

    Ok(key)
}
