use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::Identity;

use super::CredentialStore;

/// In-memory record of who is logged in.
///
/// The identity is only meaningful while the credential store holds an
/// access token; every accessor checks the token first.
pub struct SessionState {
    credentials: Arc<CredentialStore>,
    identity: RwLock<Option<Identity>>,
    /// Held while the profile is being fetched so concurrent loads share it
    load_gate: Mutex<()>,
}

impl SessionState {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self {
            credentials,
            identity: RwLock::new(None),
            load_gate: Mutex::new(()),
        }
    }

    /// Load the current identity from the API unless it is already cached.
    ///
    /// Issues at most one `GET /users/profile` per session. Any failure is
    /// reported as `ApiError::IdentityFetch`; the caller decides whether to
    /// log out.
    pub async fn initialize(&self, client: &ApiClient) -> ApiResult<Identity> {
        if !self.is_authenticated() {
            return Err(ApiError::IdentityFetch(Box::new(ApiError::SessionExpired)));
        }
        if let Some(identity) = self.identity() {
            return Ok(identity);
        }

        let _loading = self.load_gate.lock().await;
        if let Some(identity) = self.identity() {
            debug!("Identity loaded by a concurrent caller");
            return Ok(identity);
        }

        debug!("Fetching current user profile");
        let identity = client
            .fetch_profile()
            .await
            .map_err(|e| ApiError::IdentityFetch(Box::new(e)))?;

        info!(user_id = identity.id, username = %identity.username, "Session identity loaded");
        self.set(identity.clone());
        Ok(identity)
    }

    pub fn set(&self, identity: Identity) {
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Some(identity);
    }

    pub fn clear(&self) {
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The cached identity, if loaded and backed by a token
    pub fn identity(&self) -> Option<Identity> {
        if !self.is_authenticated() {
            return None;
        }
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.has_access_token()
    }

    pub fn is_admin(&self) -> bool {
        self.identity().map(|i| i.is_admin()).unwrap_or(false)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.identity().map(|i| i.id)
    }

    pub fn username(&self) -> Option<String> {
        self.identity().map(|i| i.username)
    }
}
