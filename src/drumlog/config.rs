//! # Configuration
//!
//! Settings live in `config.json` inside the data directory. A missing file
//! means defaults; unknown keys in the file are ignored.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `backend` | `local` | `local` (JSON files) or `remote` (Firestore) |
//! | `id-strategy` | `random` | `random` (UUID) or `timestamp` (Unix millis) |
//! | `user` | unset | Signed-in user id; selects the user partition |
//! | `project-id` | unset | Firestore project, required by the remote backend |
//! | `firestore-url` | `https://firestore.googleapis.com` | Firestore REST endpoint |
//! | `catalog-url` | `https://itunes.apple.com` | Catalog search endpoint |
//! | `sort` | `recent` | Default list order |

use crate::catalog;
use crate::error::{DrumlogError, Result};
use crate::id::IdStrategy;
use crate::model::SortMethod;
use crate::store::firestore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const CONFIG_FILENAME: &str = "config.json";

pub const KEYS: [&str; 7] = [
    "backend",
    "id-strategy",
    "user",
    "project-id",
    "firestore-url",
    "catalog-url",
    "sort",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = DrumlogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            other => Err(DrumlogError::Config(format!(
                "Unknown backend: {} (expected local or remote)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DrumlogConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub id_strategy: IdStrategy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,

    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    #[serde(default)]
    pub sort: SortMethod,
}

fn default_firestore_url() -> String {
    firestore::DEFAULT_BASE_URL.to_string()
}

fn default_catalog_url() -> String {
    catalog::DEFAULT_BASE_URL.to_string()
}

impl Default for DrumlogConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            id_strategy: IdStrategy::default(),
            user: None,
            project_id: None,
            firestore_url: default_firestore_url(),
            catalog_url: default_catalog_url(),
            sort: SortMethod::default(),
        }
    }
}

impl DrumlogConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(DrumlogError::Io)?;
        let config: DrumlogConfig =
            serde_json::from_str(&content).map_err(DrumlogError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(DrumlogError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(DrumlogError::Serialization)?;
        fs::write(config_path, content).map_err(DrumlogError::Io)?;
        Ok(())
    }

    /// Current value of a key as shown to the user. `None` for unknown keys;
    /// unset optional keys show as an empty string.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "backend" => self.backend.to_string(),
            "id-strategy" => self.id_strategy.to_string(),
            "user" => self.user.clone().unwrap_or_default(),
            "project-id" => self.project_id.clone().unwrap_or_default(),
            "firestore-url" => self.firestore_url.clone(),
            "catalog-url" => self.catalog_url.clone(),
            "sort" => self.sort.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a key from its string form. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "backend" => self.backend = value.parse()?,
            "id-strategy" => self.id_strategy = value.parse()?,
            "user" => self.user = non_empty(value),
            "project-id" => self.project_id = non_empty(value),
            "firestore-url" => self.firestore_url = url_or_default(value, default_firestore_url),
            "catalog-url" => self.catalog_url = url_or_default(value, default_catalog_url),
            "sort" => {
                self.sort = value
                    .parse()
                    .map_err(|e: DrumlogError| DrumlogError::Config(e.to_string()))?
            }
            other => {
                return Err(DrumlogError::Config(format!(
                    "Unknown config key: {} (known keys: {})",
                    other,
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn url_or_default(value: &str, default: fn() -> String) -> String {
    if value.is_empty() {
        default()
    } else {
        value.trim_end_matches('/').to_string()
    }
}
