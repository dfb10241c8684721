// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::itinerary::ConnectionRules;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunables for the pipeline, persisted as `search.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_min_connection")]
    pub min_connection_minutes: i64,
    #[serde(default = "default_max_connection")]
    pub max_connection_minutes: i64,
    /// Upper bound on emitted itineraries.
    #[serde(default = "default_max_itineraries")]
    pub max_itineraries: usize,
}

fn default_min_connection() -> i64 {
    ConnectionRules::default().min_minutes
}

fn default_max_connection() -> i64 {
    ConnectionRules::default().max_minutes
}

fn default_max_itineraries() -> usize {
    5000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_connection_minutes: default_min_connection(),
            max_connection_minutes: default_max_connection(),
            max_itineraries: default_max_itineraries(),
        }
    }
}

impl SearchConfig {
    pub fn connection_rules(&self) -> ConnectionRules {
        ConnectionRules {
            min_minutes: self.min_connection_minutes,
            max_minutes: self.max_connection_minutes,
        }
    }

    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("search.json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).context("Failed to read search.json")?;
        serde_json::from_str(&content).context("Failed to parse search.json")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize search config")?;
        fs::write(path, content).context("Failed to write search.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("search.json");
        fs::write(&path, r#"{"max_itineraries": 10}"#).unwrap();
        let cfg = SearchConfig::load(&path).unwrap();
        assert_eq!(cfg.max_itineraries, 10);
        assert_eq!(cfg.min_connection_minutes, 30);
        assert_eq!(cfg.max_connection_minutes, 1440);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg").join("search.json");
        let cfg = SearchConfig {
            min_connection_minutes: 45,
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        assert_eq!(SearchConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(
            SearchConfig::load(&dir.path().join("nope.json")).unwrap(),
            SearchConfig::default()
        );
    }
}
