use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::claims::Claims;
use super::errors::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed token header. Every issued token carries exactly this header and
/// verification rejects anything else.
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Compact signed token codec.
///
/// Tokens are three URL-safe unpadded base64 segments joined by `.`:
/// `base64url(header) . base64url(claims) . base64url(signature)`, where the
/// signature is HMAC-SHA256 over the first two segments. The codec holds the
/// single symmetric secret for both issuance and verification; it is
/// injected at construction and immutable afterwards.
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    /// Create a codec over the given symmetric secret.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    /// Encode claims into a signed token.
    ///
    /// The signature is a deterministic function of header, payload, and
    /// secret only.
    ///
    /// # Errors
    /// * `CryptoFailure` - Serialization or MAC initialization failed
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        let header_b64 = encode_json(&Header::default())?;
        let payload_b64 = encode_json(claims)?;
        let signing_input = format!("{header_b64}.{payload_b64}");

        let signature_b64 = self.sign(&signing_input)?;

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a token and return its decoded claims.
    ///
    /// # Errors
    /// * `MalformedToken` - Not three dot-separated segments, or header or
    ///   payload fail to decode, or the header names another algorithm
    /// * `SignatureMismatch` - Signature segment does not match
    /// * `TokenExpired` - Claims expired at or before the current time
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(TokenError::MalformedToken)?;
        let payload_b64 = parts.next().ok_or(TokenError::MalformedToken)?;
        let signature_b64 = parts.next().ok_or(TokenError::MalformedToken)?;
        if parts.next().is_some() {
            return Err(TokenError::MalformedToken);
        }

        // Signature check comes first: nothing from the payload is
        // interpreted until the token is known to be ours.
        let signing_input = format!("{header_b64}.{payload_b64}");
        let expected_b64 = self.sign(&signing_input)?;
        if !bool::from(expected_b64.as_bytes().ct_eq(signature_b64.as_bytes())) {
            return Err(TokenError::SignatureMismatch);
        }

        let header: Header = decode_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(TokenError::MalformedToken);
        }

        let claims: Claims = decode_json(payload_b64)?;
        if claims.is_expired(now) {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }

    fn sign(&self, signing_input: &str) -> Result<String, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| TokenError::CryptoFailure(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|e| TokenError::CryptoFailure(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";
    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET)
    }

    #[test]
    fn test_round_trip() {
        let claims = Claims::new("user123", NOW + 600);
        let token = codec().issue(&claims).expect("Failed to issue token");

        let decoded = codec()
            .verify_at(&token, NOW)
            .expect("Failed to verify token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_token_shape() {
        let token = codec().issue(&Claims::new("user123", NOW + 600)).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));

        let header_bytes = URL_SAFE_NO_PAD.decode(parts[0]).unwrap();
        let header: serde_json::Value = serde_json::from_slice(&header_bytes).unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn test_signing_is_deterministic() {
        let claims = Claims::new("user123", NOW + 600);
        assert_eq!(
            codec().issue(&claims).unwrap(),
            codec().issue(&claims).unwrap()
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec().issue(&Claims::new("user123", NOW + 600)).unwrap();

        let other = TokenCodec::new(b"another_secret_at_least_32_bytes!!");
        assert_eq!(
            other.verify_at(&token, NOW),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn test_segment_count_enforced() {
        let c = codec();
        assert_eq!(c.verify_at("", NOW), Err(TokenError::MalformedToken));
        assert_eq!(
            c.verify_at("one.two", NOW),
            Err(TokenError::MalformedToken)
        );
        assert_eq!(
            c.verify_at("one.two.three.four", NOW),
            Err(TokenError::MalformedToken)
        );
    }

    #[test]
    fn test_any_bit_flip_rejected() {
        let token = codec().issue(&Claims::new("user123", NOW + 600)).unwrap();

        // Tamper with every character position in turn; each mutation must
        // fail verification, never silently succeed.
        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] ^= 0x01;
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };
            if tampered == token {
                continue;
            }
            let result = codec().verify_at(&tampered, NOW);
            assert!(
                matches!(
                    result,
                    Err(TokenError::SignatureMismatch) | Err(TokenError::MalformedToken)
                ),
                "tampering position {i} was not rejected: {result:?}"
            );
        }
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::new("user123", NOW - 1);
        let token = codec().issue(&claims).expect("Failed to issue token");

        // Signature is valid, expiry alone causes rejection.
        assert_eq!(codec().verify_at(&token, NOW), Err(TokenError::TokenExpired));
        assert_eq!(
            codec().verify_at(&token, NOW - 1),
            Err(TokenError::TokenExpired)
        );
        assert!(codec().verify_at(&token, NOW - 2).is_ok());
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        // Token signed with our secret but claiming a different algorithm.
        let header_b64 = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload_b64 = encode_json(&Claims::new("user123", NOW + 600)).unwrap();
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature_b64 = codec().sign(&signing_input).unwrap();
        let token = format!("{signing_input}.{signature_b64}");

        assert_eq!(
            codec().verify_at(&token, NOW),
            Err(TokenError::MalformedToken)
        );
    }

    #[test]
    fn test_garbage_payload_rejected() {
        let header_b64 = encode_json(&Header::default()).unwrap();
        let payload_b64 = URL_SAFE_NO_PAD.encode(b"not json at all");
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature_b64 = codec().sign(&signing_input).unwrap();
        let token = format!("{signing_input}.{signature_b64}");

        assert_eq!(
            codec().verify_at(&token, NOW),
            Err(TokenError::MalformedToken)
        );
    }
}
