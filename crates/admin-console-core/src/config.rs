//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, request timeout, where the refresh token is kept and
//! the last username used to log in.
//!
//! Configuration is stored at `~/.config/admin-console/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, FileSlot, KeyringSlot, MemorySlot, TokenSlot};

/// Application name used for config/data directory paths
const APP_NAME: &str = "admin-console";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Access token file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Keychain account name for the refresh token
const REFRESH_TOKEN_ACCOUNT: &str = "refresh-token";

/// Base URL of the management API when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8082/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "ADMIN_CONSOLE_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenStorage {
    #[default]
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub refresh_token_storage: RefreshTokenStorage,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_token_storage: RefreshTokenStorage::default(),
            last_username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides on top of the file values
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Open the credential store described by this configuration
    pub fn credential_store(&self) -> Result<CredentialStore> {
        let access = FileSlot::new(self.data_dir()?.join(SESSION_FILE));
        let refresh: Box<dyn TokenSlot> = match self.refresh_token_storage {
            RefreshTokenStorage::Keyring => Box::new(KeyringSlot::new(REFRESH_TOKEN_ACCOUNT)),
            RefreshTokenStorage::Memory => Box::<MemorySlot>::default(),
        };
        Ok(CredentialStore::open(Box::new(access), refresh))
    }
}
