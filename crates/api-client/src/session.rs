//! Explicit client session.
//!
//! The bearer token lives in a [`Session`] handed to the API client at construction. Every
//! request reads it; only [`Session::logout`] clears it. The state is published through a
//! `tokio::sync::watch` channel so views can react to sign-in and logout without polling.
//!
//! A [`SessionStore`] persists the state to a small JSON file so separate invocations of the
//! binaries share one login.

use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// What the session currently knows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

/// File-backed persistence for [`SessionState`].
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored state. A missing or unreadable-as-JSON file counts as signed out.
    pub fn load(&self) -> SessionResult<SessionState> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionState::default())
            }
            Err(e) => return Err(SessionError::FileRead(e)),
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!("ignoring unparseable session file {}: {}", self.path.display(), e);
                Ok(SessionState::default())
            }
        }
    }

    pub fn save(&self, state: &SessionState) -> SessionResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(SessionError::DirCreation)?;
        }
        let json = serde_json::to_string_pretty(state).map_err(SessionError::Serialization)?;
        std::fs::write(&self.path, json).map_err(SessionError::FileWrite)?;
        tracing::debug!("saved session to {}", self.path.display());
        Ok(())
    }

    pub fn clear(&self) -> SessionResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::FileRemove(e)),
        }
    }
}

/// Shared handle to the current session. Cloning shares the same state.
#[derive(Clone, Debug)]
pub struct Session {
    state: Arc<watch::Sender<SessionState>>,
    store: Option<SessionStore>,
}

impl Session {
    /// A session that is never persisted. Useful for one-off scripts and tests.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(watch::Sender::new(SessionState::default())),
            store: None,
        }
    }

    /// Restores the session from `store` and keeps persisting changes there.
    pub fn restore(store: SessionStore) -> SessionResult<Self> {
        let initial = store.load()?;
        if initial.is_signed_in() {
            tracing::info!("restored session from {}", store.path().display());
        }
        Ok(Self {
            state: Arc::new(watch::Sender::new(initial)),
            store: Some(store),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_signed_in()
    }

    /// Stores a freshly issued token and notifies subscribers.
    pub fn sign_in(&self, token: impl Into<String>, email: Option<String>) -> SessionResult<()> {
        let next = SessionState {
            token: Some(token.into()),
            email,
        };
        if let Some(store) = &self.store {
            store.save(&next)?;
        }
        self.state.send_replace(next);
        Ok(())
    }

    /// Clears the token, removes the stored session and notifies subscribers.
    ///
    /// The in-memory state is cleared even if removing the file fails.
    pub fn logout(&self) -> SessionResult<()> {
        self.state.send_replace(SessionState::default());
        tracing::info!("session cleared");
        match &self.store {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }

    /// Receives every sign-in and logout from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
