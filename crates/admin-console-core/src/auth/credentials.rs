use std::path::PathBuf;
use std::sync::{Mutex, PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Keychain service name for stored tokens
pub const KEYRING_SERVICE: &str = "admin-console";

/// Days a persisted access token stays readable.
pub const ACCESS_TOKEN_EXPIRY_DAYS: i64 = 7;

/// A persistence channel holding at most one token.
pub trait TokenSlot: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, token: &str) -> Result<()>;
    /// Remove the token. Removing an absent token is not an error.
    fn remove(&self) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    stored_at: DateTime<Utc>,
}

impl StoredToken {
    fn is_expired(&self, max_age: Duration) -> bool {
        Utc::now() > self.stored_at + max_age
    }
}

/// Token persisted as JSON on disk, readable across restarts until it ages out.
pub struct FileSlot {
    path: PathBuf,
    max_age: Duration,
}

impl FileSlot {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_age: Duration::days(ACCESS_TOKEN_EXPIRY_DAYS),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

impl TokenSlot for FileSlot {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        let stored: StoredToken =
            serde_json::from_str(&contents).context("Failed to parse session file")?;

        if stored.is_expired(self.max_age) || stored.token.is_empty() {
            debug!(path = ?self.path, "Persisted token expired");
            return Ok(None);
        }
        Ok(Some(stored.token))
    }

    fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            token: token.to_string(),
            stored_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// Token held in the OS keychain.
pub struct KeyringSlot {
    service: String,
    account: String,
}

impl KeyringSlot {
    pub fn new(account: &str) -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            account: account.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.account).context("Failed to create keyring entry")
    }
}

impl TokenSlot for KeyringSlot {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn remove(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// Token kept only for the lifetime of the process.
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl TokenSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Default)]
struct Mirror {
    access: Option<String>,
    refresh: Option<String>,
}

/// Owns the access/refresh token pair.
///
/// Reads are served from an in-memory mirror so concurrent requests never
/// touch disk or the keychain; writes go to the backing slot first and then
/// replace the mirror under a write lock, so any request started afterwards
/// observes the new value.
pub struct CredentialStore {
    access_slot: Box<dyn TokenSlot>,
    refresh_slot: Box<dyn TokenSlot>,
    mirror: RwLock<Mirror>,
}

impl CredentialStore {
    /// Open the store, loading whatever the slots currently hold
    pub fn open(access_slot: Box<dyn TokenSlot>, refresh_slot: Box<dyn TokenSlot>) -> Self {
        let access = access_slot.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load access token");
            None
        });
        let refresh = refresh_slot.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load refresh token");
            None
        });
        debug!(
            has_access = access.is_some(),
            has_refresh = refresh.is_some(),
            "Credential store opened"
        );
        Self {
            access_slot,
            refresh_slot,
            mirror: RwLock::new(Mirror { access, refresh }),
        }
    }

    /// Store backed only by memory, for tests and throwaway sessions
    pub fn in_memory() -> Self {
        Self::open(Box::<MemorySlot>::default(), Box::<MemorySlot>::default())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access.clone().filter(|t| !t.is_empty())
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.access_slot.store(token)?;
        self.write().access = Some(token.to_string());
        Ok(())
    }

    pub fn clear_access_token(&self) -> Result<()> {
        self.write().access = None;
        self.access_slot.remove()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh.clone().filter(|t| !t.is_empty())
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.refresh_slot.store(token)?;
        self.write().refresh = Some(token.to_string());
        Ok(())
    }

    pub fn clear_refresh_token(&self) -> Result<()> {
        self.write().refresh = None;
        self.refresh_slot.remove()
    }

    /// Replace both tokens, as after a login or refresh
    pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        self.access_slot.store(access)?;
        self.refresh_slot.store(refresh)?;
        let mut mirror = self.write();
        mirror.access = Some(access.to_string());
        mirror.refresh = Some(refresh.to_string());
        Ok(())
    }

    /// Drop both tokens. The in-memory copy is always cleared, even when a
    /// backing slot fails to delete.
    pub fn clear(&self) -> Result<()> {
        {
            let mut mirror = self.write();
            mirror.access = None;
            mirror.refresh = None;
        }
        let access = self.access_slot.remove();
        let refresh = self.refresh_slot.remove();
        access.and(refresh)
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token().is_some()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Mirror> {
        self.mirror.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Mirror> {
        self.mirror.write().unwrap_or_else(PoisonError::into_inner)
    }
}
