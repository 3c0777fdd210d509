use jsonwebtoken::DecodingKey;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::error::SecretError;

/// HMAC key used to verify every session token for the life of the process.
///
/// Built once at start-up; the raw secret is not retained.
pub struct SessionSecret {
    key: DecodingKey,
}

impl SessionSecret {
    /// # Errors
    /// Returns [`SecretError::Empty`] when the configured secret is blank.
    pub fn new(secret: &SecretString) -> Result<Self, SecretError> {
        let raw = secret.expose_secret();
        if raw.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self {
            key: DecodingKey::from_secret(raw.as_bytes()),
        })
    }

    pub(super) fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSecret").field("key", &"***").finish()
    }
}
