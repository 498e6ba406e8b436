use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde::Deserialize;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use super::SessionError;

/// The handful of claims we care about within an access token.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Expiry, in seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<u64>,
    /// Observed as both a number and a string, so we keep it loose.
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now: u64) -> bool {
        matches!(self.exp, Some(exp) if now >= exp)
    }

    pub fn is_expired(&self) -> bool {
        // A clock before 1970 is not something we'll try to reason about.
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        self.is_expired_at(now)
    }
}

/// An extraordinarily basic JWT payload reader.
///
/// There's three components to a JWT: its header, its payload, and signature.
/// These are separated by `.`s. We don't validate the signature here, as the
/// API itself will do all of that for us. This is only a local hint as to
/// whether a token is worth sending.
pub fn decode_claims(token: &str) -> Result<TokenClaims, SessionError> {
    let components: Vec<&str> = token.split('.').collect();
    if components.len() != 3 {
        return Err(SessionError::MalformedToken);
    }

    // Payloads are meant to be unpadded, but we've seen padded ones too.
    let encoded_payload = components[1];
    let decoded_payload = URL_SAFE_NO_PAD
        .decode(encoded_payload)
        .or_else(|_| URL_SAFE.decode(encoded_payload))
        .map_err(|_| SessionError::MalformedToken)?;

    serde_json::from_slice(&decoded_payload).map_err(|_| SessionError::MalformedToken)
}
