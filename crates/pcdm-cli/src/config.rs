//! CLI configuration

use std::path::{Path, PathBuf};

use pcdm_core::{DuplicatePolicy, GraphConfig, ParentPolicy};
use serde::{Deserialize, Serialize};

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pcdm")
}

/// Get default config file location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pcdm")
        .join("config.toml")
}

/// Configuration for the CLI, stored as TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (overridden by --data-dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Default output format (overridden by --format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Graph policies
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Config {
    /// Load from `path`, falling back to defaults if missing or unreadable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["data_dir", "format", "parent_policy", "related_duplicates"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => self.data_dir.as_ref().map(|p| p.display().to_string()),
            "format" => self.format.clone(),
            "parent_policy" => Some(self.graph.parent_policy.to_string()),
            "related_duplicates" => Some(self.graph.related_duplicates.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = Some(PathBuf::from(value)),
            "format" => match value {
                "table" | "json" => self.format = Some(value.to_string()),
                _ => anyhow::bail!("format must be table or json"),
            },
            "parent_policy" => {
                self.graph.parent_policy = value.parse::<ParentPolicy>().map_err(anyhow::Error::msg)?
            }
            "related_duplicates" => {
                self.graph.related_duplicates =
                    value.parse::<DuplicatePolicy>().map_err(anyhow::Error::msg)?
            }
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}
