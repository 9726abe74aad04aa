//! Authentication state: stored credentials, the session identity and the
//! navigation guard that consumes them.
//!
//! This module provides:
//! - `CredentialStore`: access/refresh token pair with pluggable persistence
//! - `SessionState`: cached identity and derived authorization flags
//! - `AuthContext`: the shared, explicitly owned bundle of the two
//! - `NavigationGuard`: route access decisions for the front end
//!
//! The access token is persisted for 7 days; the refresh token lives in the
//! OS keychain (or memory) and identity is always re-fetched from the API.

pub mod credentials;
pub mod guard;
pub mod session;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::Identity;

pub use credentials::{CredentialStore, FileSlot, KeyringSlot, MemorySlot, TokenSlot};
pub use guard::{login_location, GuardDecision, NavigationGuard, RouteAccess, LOGIN_PATH};
pub use session::SessionState;

/// Session context shared by the API client and the navigation guard.
pub struct AuthContext {
    credentials: Arc<CredentialStore>,
    session: SessionState,
    refresh_gate: Mutex<()>,
}

impl AuthContext {
    pub fn new(credentials: CredentialStore) -> Self {
        let credentials = Arc::new(credentials);
        Self {
            session: SessionState::new(credentials.clone()),
            credentials,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    /// Serializes token refreshes so concurrent 401s share one outcome
    pub(crate) fn refresh_gate(&self) -> &Mutex<()> {
        &self.refresh_gate
    }

    /// Forget tokens and identity. Safe to call repeatedly.
    pub fn clear(&self) -> Result<()> {
        self.session.clear();
        let result = self.credentials.clear();
        debug!("Authentication state cleared");
        result
    }
}
