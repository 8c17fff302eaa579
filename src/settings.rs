// SPDX-License-Identifier: MPL-2.0

use crate::config::{
    APP_ID, DEFAULT_BACKEND_URL, DEFAULT_IMAGE_ORIENTATION, DEFAULT_IMAGE_QUERY,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UNSPLASH_API,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the hosted backend (REST + auth)
    pub backend_url: String,
    /// Public API key sent as `apikey` on every backend call
    pub anon_key: String,
    /// Bearer token of the signed-in user, if any
    pub access_token: Option<String>,
    pub unsplash_access_key: String,
    pub unsplash_api_url: String,
    pub image_query: String,
    pub image_orientation: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            anon_key: String::new(),
            access_token: None,
            unsplash_access_key: String::new(),
            unsplash_api_url: DEFAULT_UNSPLASH_API.to_string(),
            image_query: DEFAULT_IMAGE_QUERY.to_string(),
            image_orientation: DEFAULT_IMAGE_ORIENTATION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Get the settings file path (~/.config/io.github.pawsandfound.PawsFeed/settings.json)
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_ID);
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk (defaults if missing or malformed), then
    /// apply `PAWS_*` environment overrides.
    pub fn load() -> Self {
        let mut settings = match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        settings.apply_env(|name| std::env::var(name).ok());
        settings
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("PAWS_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = lookup("PAWS_ANON_KEY") {
            self.anon_key = v;
        }
        if let Some(v) = lookup("PAWS_ACCESS_TOKEN") {
            self.access_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Some(v) = lookup("PAWS_UNSPLASH_ACCESS_KEY") {
            self.unsplash_access_key = v;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path().ok_or("Could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), String> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {e}"))?;

        Ok(())
    }
}
