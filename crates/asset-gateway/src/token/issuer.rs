//! [`TokenIssuer`]: unwraps encrypted content keys and re-wraps them in signed tokens.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use common::protocol::ContentKeyClaims;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroize;

use crate::crypto::{self, CipherError, EncryptionKey, SigningSecret};

type HmacSha256 = Hmac<Sha256>;

/// Validity window of an issued token.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Compact JOSE header of every token this issuer produces.
const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Errors produced while issuing or verifying content-key tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The submitted content key is not valid standard base64.
    #[error("content key is not valid base64")]
    InvalidEncoding,

    /// The content key could not be unpacked.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// The HMAC implementation refused the signing secret.
    #[error("signing secret rejected")]
    InvalidSecret,

    /// Claims could not be serialised.
    #[error("failed to serialise claims: {0}")]
    Serialise(#[from] serde_json::Error),

    /// The token is not three base64url segments with JSON header and claims.
    #[error("token is malformed")]
    Malformed,

    /// The token header names an algorithm other than HS256.
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    /// The signature does not match the header and claims.
    #[error("token signature mismatch")]
    BadSignature,

    /// `exp` lies in the past.
    #[error("token expired")]
    Expired,
}

/// Issues and verifies content-key tokens with a process-wide [`SigningSecret`].
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: SigningSecret,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: SigningSecret, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Exchange a base64 encrypted content key for a signed token, issued now.
    ///
    /// # Errors
    ///
    /// See [`TokenIssuer::issue_at`].
    pub fn issue(
        &self,
        encrypted_content_key: &str,
        key: &EncryptionKey,
    ) -> Result<String, TokenError> {
        self.issue_at(encrypted_content_key, key, unix_now())
    }

    /// Exchange a base64 encrypted content key for a token issued at `issued_at`
    /// (seconds since the Unix epoch).
    ///
    /// The `fileId` claim echoes `encrypted_content_key` verbatim; `contentKey`
    /// is the standard base64 of the unpacked key.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidEncoding`] for bad base64 and
    /// [`TokenError::Cipher`] if the packed key is malformed or fails authentication.
    pub fn issue_at(
        &self,
        encrypted_content_key: &str,
        key: &EncryptionKey,
        issued_at: u64,
    ) -> Result<String, TokenError> {
        let packed = STANDARD
            .decode(encrypted_content_key)
            .map_err(|_| TokenError::InvalidEncoding)?;
        let mut raw_key = crypto::decrypt(&packed, key.as_bytes())?;

        let claims = ContentKeyClaims {
            file_id: encrypted_content_key.to_owned(),
            content_key: STANDARD.encode(&raw_key),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl.as_secs()),
        };
        raw_key.zeroize();

        self.sign(&claims)
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// See [`TokenIssuer::verify_at`].
    pub fn verify(&self, token: &str) -> Result<ContentKeyClaims, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify signature, algorithm and expiry of `token` at time `now`.
    ///
    /// A token stays valid up to and including its `exp` second; there is no leeway.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`], [`TokenError::UnsupportedAlgorithm`],
    /// [`TokenError::BadSignature`] or [`TokenError::Expired`].
    pub fn verify_at(&self, token: &str, now: u64) -> Result<ContentKeyClaims, TokenError> {
        let mut segments = token.split('.');
        let (header, payload, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(TokenError::Malformed),
            };

        let header_json: serde_json::Value = decode_segment(header)?;
        if header_json.get("alg").and_then(serde_json::Value::as_str) != Some("HS256") {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: ContentKeyClaims = decode_segment(payload)?;
        if now > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, claims: &ContentKeyClaims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER_JSON),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| TokenError::InvalidSecret)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;

    const T: u64 = 1_700_000_000;

    fn asset_key() -> EncryptionKey {
        EncryptionKey::from_bytes(&[0x11u8; KEY_LEN]).unwrap()
    }

    fn issuer(secret: &[u8]) -> TokenIssuer {
        TokenIssuer::new(SigningSecret::new(secret).unwrap(), DEFAULT_TTL)
    }

    /// A packed content key as the upload path would have stored it.
    fn encrypted_content_key(raw: &[u8]) -> String {
        let packed = crypto::encrypt(raw, asset_key().as_bytes()).unwrap();
        STANDARD.encode(packed)
    }

    #[test]
    fn issued_token_carries_recovered_key() {
        let raw = [0xABu8; 32];
        let input = encrypted_content_key(&raw);
        let issuer = issuer(b"token-secret");

        let token = issuer.issue_at(&input, &asset_key(), T).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = issuer.verify_at(&token, T).unwrap();
        assert_eq!(claims.file_id, input);
        assert_eq!(STANDARD.decode(&claims.content_key).unwrap(), raw);
        assert_eq!(claims.iat, T);
        assert_eq!(claims.exp, T + 30);
    }

    #[test]
    fn token_valid_at_29s_and_expired_at_31s() {
        let issuer = issuer(b"token-secret");
        let token = issuer
            .issue_at(&encrypted_content_key(b"k"), &asset_key(), T)
            .unwrap();
        assert!(issuer.verify_at(&token, T + 29).is_ok());
        assert!(matches!(
            issuer.verify_at(&token, T + 31),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn ttl_is_configurable() {
        let issuer = TokenIssuer::new(
            SigningSecret::new(b"token-secret").unwrap(),
            Duration::from_secs(5),
        );
        let token = issuer
            .issue_at(&encrypted_content_key(b"k"), &asset_key(), T)
            .unwrap();
        assert!(matches!(
            issuer.verify_at(&token, T + 6),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn issue_uses_current_time() {
        let issuer = issuer(b"token-secret");
        let token = issuer
            .issue(&encrypted_content_key(b"k"), &asset_key())
            .unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 30);
    }

    #[test]
    fn other_secret_fails_signature() {
        let token = issuer(b"secret-a")
            .issue_at(&encrypted_content_key(b"k"), &asset_key(), T)
            .unwrap();
        assert!(matches!(
            issuer(b"secret-b").verify_at(&token, T),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn tampered_claims_fail_signature() {
        let issuer = issuer(b"token-secret");
        let token = issuer
            .issue_at(&encrypted_content_key(b"k"), &asset_key(), T)
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = ContentKeyClaims {
            file_id: "x".into(),
            content_key: "y".into(),
            iat: T,
            exp: T + 3600,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert!(matches!(
            issuer.verify_at(&tampered, T),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn alg_none_header_rejected() {
        let issuer = issuer(b"token-secret");
        let token = issuer
            .issue_at(&encrypted_content_key(b"k"), &asset_key(), T)
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let none_header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
        let forged = format!("{none_header}.{}.", parts[1]);
        assert!(matches!(
            issuer.verify_at(&forged, T),
            Err(TokenError::UnsupportedAlgorithm)
        ));
    }

    #[test]
    fn malformed_tokens_rejected() {
        let issuer = issuer(b"token-secret");
        for token in ["", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(issuer.verify_at(token, T), Err(TokenError::Malformed)),
                "{token}"
            );
        }
    }

    #[test]
    fn invalid_base64_input_rejected() {
        let err = issuer(b"token-secret")
            .issue_at("not*base64", &asset_key(), T)
            .unwrap_err();
        assert!(matches!(err, TokenError::InvalidEncoding));
    }

    #[test]
    fn undersized_content_key_is_malformed() {
        let err = issuer(b"token-secret")
            .issue_at(&STANDARD.encode([0u8; 10]), &asset_key(), T)
            .unwrap_err();
        assert!(matches!(err, TokenError::Cipher(CipherError::Malformed(10))));
    }

    #[test]
    fn content_key_under_other_asset_key_fails_authentication() {
        let other = EncryptionKey::from_bytes(&[0x22u8; KEY_LEN]).unwrap();
        let err = issuer(b"token-secret")
            .issue_at(&encrypted_content_key(b"k"), &other, T)
            .unwrap_err();
        assert!(matches!(
            err,
            TokenError::Cipher(CipherError::Authentication)
        ));
    }
}
