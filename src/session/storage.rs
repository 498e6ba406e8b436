use keyring::Entry;
use serde::{Deserialize, Serialize};

use super::SessionError;
use crate::api::UserSession;

/// The keyring service all of our entries live under.
const KEYRING_SERVICE: &str = "campusctl";

/// The keyring "user" for the stored session.
const KEYRING_SESSION: &str = "API Session";

/// The format of our JSON within credential storage.
///
/// We keep the base URL alongside the tokens so a session issued by one
/// server isn't presented to another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoredSession {
    pub base_url: String,
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl StoredSession {
    pub fn new(base_url: impl Into<String>, session: &UserSession) -> Self {
        Self {
            base_url: base_url.into(),
            access: session.access.clone(),
            refresh: session.refresh.clone(),
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, SessionError> {
        serde_json::from_str(contents).map_err(SessionError::Parse)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(SessionError::Parse)
    }
}

/// Holds the caller's session within the OS keyring.
pub struct SessionStore {
    entry: Entry,
}

impl SessionStore {
    pub fn open() -> Result<Self, SessionError> {
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_SESSION)?;
        Ok(Self { entry })
    }

    /// Retrieves the stored session, if there is one.
    pub fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        match self.entry.get_password() {
            Ok(contents) => StoredSession::from_json(&contents).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    pub fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        self.entry.set_password(&session.to_json()?)?;
        tracing::debug!(base_url = %session.base_url, "stored session in keyring");
        Ok(())
    }

    /// Removes the stored session. Clearing nothing is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match self.entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
