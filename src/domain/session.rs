//! The signed-in user, as an explicit value.
//!
//! A [`Session`] is created once the external protocol has authenticated a
//! profile and dropped on logout. Nothing else in the crate holds "the
//! current user"; callers pass the session (or its profile) explicitly.

use std::{io, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::post::Profile;

/// An authenticated profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The profile acting in this session.
    pub profile: Profile,
    /// When authentication succeeded.
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `profile`.
    #[must_use]
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            authenticated_at: Utc::now(),
        }
    }
}

/// Session state persisted between runs.
///
/// The session is only ever written while cookie consent is given;
/// withdrawing consent forgets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStore {
    has_cookies: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current: Option<Session>,
}

/// Errors reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The file could not be read or written.
    #[error("session file: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid session JSON.
    #[error("session file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionStore {
    /// Load the store, or an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the store to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).expect("this must never fail");
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Whether the user agreed to persisted state.
    #[must_use]
    pub const fn has_cookies(&self) -> bool {
        self.has_cookies
    }

    /// Record the user's cookie consent. Withdrawing it logs out.
    pub fn set_has_cookies(&mut self, has_cookies: bool) {
        self.has_cookies = has_cookies;
        if !has_cookies {
            self.current = None;
        }
    }

    /// The active session, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Make `session` the active one.
    ///
    /// Returns `false` (and keeps nothing) without cookie consent.
    pub fn login(&mut self, session: Session) -> bool {
        if self.has_cookies {
            self.current = Some(session);
            true
        } else {
            tracing::debug!("cookie consent not given, session not persisted");
            false
        }
    }

    /// End the active session, returning it.
    pub fn logout(&mut self) -> Option<Session> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::tests::profile;

    #[test]
    fn login_requires_consent() {
        let mut store = SessionStore::default();
        assert!(!store.login(Session::new(profile())));
        assert!(store.current().is_none());

        store.set_has_cookies(true);
        assert!(store.login(Session::new(profile())));
        assert_eq!(store.current().unwrap().profile, profile());
    }

    #[test]
    fn withdrawing_consent_forgets_session() {
        let mut store = SessionStore::default();
        store.set_has_cookies(true);
        store.login(Session::new(profile()));
        store.set_has_cookies(false);
        assert!(store.current().is_none());
    }

    #[test]
    fn logout_returns_the_session() {
        let mut store = SessionStore::default();
        store.set_has_cookies(true);
        store.login(Session::new(profile()));
        assert!(store.logout().is_some());
        assert!(store.logout().is_none());
    }

    #[test]
    fn persists_across_loads() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".vms").join("session.json");
        assert_eq!(SessionStore::load(&path).unwrap(), SessionStore::default());

        let mut store = SessionStore::default();
        store.set_has_cookies(true);
        store.login(Session::new(profile()));
        store.save(&path).unwrap();

        assert_eq!(SessionStore::load(&path).unwrap(), store);
    }
}
