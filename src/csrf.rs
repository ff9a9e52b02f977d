//! Signed, time-limited form tokens.
//!
//! A token is `<unix-ts>.<base64url(HMAC-SHA256(secret, unix-ts))>`. The
//! subscribe page embeds a fresh one and the submit handler checks it.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ring::hmac;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// How long an issued token stays valid, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("The CSRF token is invalid.")]
    Invalid,
    #[error("The CSRF token has expired.")]
    Expired,
}

pub struct CsrfGuard {
    key: hmac::Key,
    time_limit: Duration,
}

impl CsrfGuard {
    pub fn new(secret: &SecretString) -> Self {
        Self::with_time_limit(secret, Duration::seconds(DEFAULT_TIME_LIMIT_SECS))
    }

    pub fn with_time_limit(secret: &SecretString, time_limit: Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.expose_secret().as_bytes()),
            time_limit,
        }
    }

    pub fn issue(&self, now: DateTime<Utc>) -> String {
        let issued_at = now.timestamp().to_string();
        let tag = hmac::sign(&self.key, issued_at.as_bytes());
        format!(
            "{issued_at}.{}",
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag.as_ref())
        )
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<(), CsrfError> {
        let (issued_at, signature) = token.split_once('.').ok_or(CsrfError::Invalid)?;
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| CsrfError::Invalid)?;

        hmac::verify(&self.key, issued_at.as_bytes(), &signature)
            .map_err(|_| CsrfError::Invalid)?;

        // Signature holds, so the timestamp is one we produced
        let issued_at: i64 = issued_at.parse().map_err(|_| CsrfError::Invalid)?;
        if now.timestamp() - issued_at > self.time_limit.num_seconds() {
            return Err(CsrfError::Expired);
        }

        Ok(())
    }
}
