//! Worker configuration
//!
//! Read from `~/.config/syntax-worker/config.yaml` (or an explicit path):
//!
//! ```yaml
//! node_limit: 10000        # null disables the highlight budget
//! tokenize_node_limit: 600
//! aliases:
//!   rs: rust
//! dependencies:
//!   vue: [html, javascript]
//! theme:
//!   keyword: kw-3f2a
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diff::TOKENIZE_NODE_LIMIT;
use crate::syntax::{LanguageTables, Theme};

/// Default highlight budget
pub const DEFAULT_NODE_LIMIT: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_node_limit")]
    pub node_limit: Option<usize>,
    #[serde(default = "default_tokenize_node_limit")]
    pub tokenize_node_limit: usize,
    /// Extra aliases, layered over the built-in table
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Extra dependencies, layered over the built-in table
    #[serde(default)]
    pub dependencies: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub theme: Theme,
}

fn default_node_limit() -> Option<usize> {
    Some(DEFAULT_NODE_LIMIT)
}

fn default_tokenize_node_limit() -> usize {
    TOKENIZE_NODE_LIMIT
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            node_limit: default_node_limit(),
            tokenize_node_limit: default_tokenize_node_limit(),
            aliases: HashMap::new(),
            dependencies: HashMap::new(),
            theme: Theme::default(),
        }
    }
}

impl WorkerConfig {
    /// Load config from the config directory, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load config from `path`
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        let config = Self::parse(&content)
            .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document is a valid, all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Built-in alias and dependency tables with this config's entries on top
    pub fn language_tables(&self) -> LanguageTables {
        LanguageTables::default().merge(LanguageTables {
            aliases: self.aliases.clone(),
            dependencies: self.dependencies.clone(),
        })
    }
}
