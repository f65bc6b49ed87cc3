//! User settings persistence.
//!
//! Stores preferences in ~/.skillview/settings.json.
//! Effective values follow env var > settings.json > default priority;
//! command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Index location used when nothing else is configured.
pub const DEFAULT_INDEX: &str = "skills_index.json";
/// Document root used when nothing else is configured.
pub const DEFAULT_DOCUMENT_ROOT: &str = "skills";
/// Back-link target for the parent catalog view.
pub const DEFAULT_CATALOG_URL: &str = "/skills";

/// Env var overriding `sources.index`.
pub const ENV_INDEX: &str = "SKILLVIEW_INDEX";
/// Env var overriding `sources.document_root`.
pub const ENV_DOCUMENT_ROOT: &str = "SKILLVIEW_DOCUMENT_ROOT";
/// Env var overriding `display.catalog_url`.
pub const ENV_CATALOG_URL: &str = "SKILLVIEW_CATALOG_URL";

/// User settings persisted to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Where the index and documents are read from.
    #[serde(default)]
    pub sources: SourceSettings,

    /// Rendering and copy feedback.
    #[serde(default)]
    pub display: DisplaySettings,
}

/// Index and document locations. Each is a URL or a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Catalog index (`skills_index.json`).
    #[serde(default = "default_index")]
    pub index: String,

    /// Directory or URL that skill paths are resolved against.
    #[serde(default = "default_document_root")]
    pub document_root: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn default_document_root() -> String {
    DEFAULT_DOCUMENT_ROOT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            index: default_index(),
            document_root: default_document_root(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// How pages are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Back-link target shown on every page.
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Wrap width for rendered markdown. 0 = terminal width.
    #[serde(default)]
    pub width: usize,
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            width: 0,
        }
    }
}

impl Settings {
    /// Get the default settings file path (~/.skillview/settings.json).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skillview")
            .join("settings.json")
    }

    /// Load settings from a specific path.
    ///
    /// A missing or unparseable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write settings as pretty JSON, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(write_err)
    }

    /// Overlay values from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(index) = non_empty(ENV_INDEX) {
            self.sources.index = index;
        }
        if let Some(root) = non_empty(ENV_DOCUMENT_ROOT) {
            self.sources.document_root = root;
        }
        if let Some(url) = non_empty(ENV_CATALOG_URL) {
            self.display.catalog_url = url;
        }
    }

    /// Settings file plus process environment.
    pub fn load_effective(path: &Path) -> Self {
        let mut settings = Self::load_from(path);
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.request_timeout_secs)
    }

    /// Get a setting value by dotted path (e.g., "display.catalog_url").
    pub fn get(&self, path: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;

        for part in path.split('.') {
            current = current.get(part)?;
        }

        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            serde_json::Value::Null => Some("null".to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Set a setting value by dotted path.
    ///
    /// The new value is parsed according to the type of the existing one.
    pub fn set(&mut self, path: &str, value: &str) -> Result<(), SettingsError> {
        let mut json = serde_json::to_value(&self)?;

        let parts: Vec<&str> = path.split('.').collect();
        let Some((final_key, parents)) = parts.split_last() else {
            return Err(SettingsError::PathNotFound(path.to_string()));
        };

        let mut current = &mut json;
        for part in parents {
            current = current
                .get_mut(*part)
                .ok_or_else(|| SettingsError::PathNotFound(path.to_string()))?;
        }

        let obj = current
            .as_object_mut()
            .ok_or_else(|| SettingsError::PathNotFound(path.to_string()))?;
        let existing = obj
            .get(*final_key)
            .ok_or_else(|| SettingsError::PathNotFound(path.to_string()))?;

        let invalid = |reason: String| SettingsError::InvalidValue {
            path: path.to_string(),
            reason,
        };
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("expected boolean, got '{}'", value)))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("expected integer, got '{}'", value)))?
                    .into(),
            ),
            _ => serde_json::Value::String(value.to_string()),
        };

        obj.insert((*final_key).to_string(), new_value);
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// List all settings as (path, value) pairs, sorted by path.
    pub fn list(&self) -> Vec<(String, String)> {
        let json = match serde_json::to_value(self) {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };

        let mut results = Vec::new();
        collect_settings(&json, String::new(), &mut results);
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}

/// Recursively collect settings paths and values.
fn collect_settings(value: &serde_json::Value, prefix: String, results: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_settings(val, path, results);
            }
        }
        serde_json::Value::String(s) => results.push((prefix, s.clone())),
        other => results.push((prefix, other.to_string())),
    }
}
