//! Configuration and session storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::auth::StoredToken;
use crate::models::User;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.quickblox.com";

/// Application credentials issued by the backend admin panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCredentials {
    pub application_id: u64,
    pub auth_key: String,
    pub auth_secret: String,
}

/// Refresh behavior of the dialog list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Keep the current dialog list when a refresh returns no dialogs.
    pub keep_dialogs_on_empty: bool,
    /// Page size for dialog and user fetches
    pub page_limit: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            keep_dialogs_on_empty: true,
            page_limit: 100,
        }
    }
}

/// Application configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// REST API base URL (defaults to the public cloud endpoint)
    pub api_endpoint: Option<String>,
    pub credentials: Option<AppCredentials>,
    /// Session token from the last login
    pub session_token: Option<StoredToken>,
    /// Logged-in user (from last login)
    pub current_user: Option<User>,
    #[serde(default)]
    pub refresh: RefreshSettings,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "conference-dialogs", "conference-dialogs")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // Set restrictive permissions on config file (contains secrets)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    pub fn api_endpoint(&self) -> &str {
        self.api_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_API_ENDPOINT)
            .trim_end_matches('/')
    }

    pub fn credentials(&self) -> Result<&AppCredentials> {
        self.credentials
            .as_ref()
            .context("No application credentials. Run 'conference-dialogs setup' first.")
    }

    /// Room the current user belongs to (first user tag).
    pub fn room(&self) -> Option<&str> {
        self.current_user
            .as_ref()
            .and_then(|u| u.tags.first())
            .map(String::as_str)
    }

    pub fn set_session(&mut self, token: String, expires_in: Option<u64>, user: User) {
        self.session_token = Some(StoredToken::new(token, expires_in));
        self.current_user = Some(user);
    }

    pub fn clear_session(&mut self) {
        self.session_token = None;
        self.current_user = None;
    }
}
