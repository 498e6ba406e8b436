//! Caller-side session handling.
//!
//! The API client never holds onto tokens. Whoever calls it does, and this is
//! how the command line keeps them around between runs.

mod jwt;
mod storage;

use thiserror::Error;

pub use jwt::{decode_claims, TokenClaims};
pub use storage::{SessionStore, StoredSession};

/// Possible error types while working with stored sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token is not a readable JWT")]
    MalformedToken,
    #[error("stored session is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("credential storage: {0}")]
    CredentialStorage(#[from] keyring::Error),
}
