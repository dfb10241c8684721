// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod cabin;
pub mod pricing;
pub mod rules;

pub use cabin::Cabin;
pub use pricing::{CabinCeilings, PricingTier, TierChart, TierRow};
pub use rules::{
    Exclusion, FareClassRule, PolicyError, SingleCarrierRule, StripRule, TrustPolicy,
    CURRENT_SCHEMA_VERSION,
};

/// The persisted trust policy plus the path it was loaded from.
#[derive(Clone, Debug)]
pub struct PolicyStore {
    pub policy: Arc<TrustPolicy>,
    config_path: PathBuf,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::at_path(Self::get_config_path())
    }
}

impl PolicyStore {
    /// Loads the policy from the per-user config directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the policy at `path`, falling back to the built-in table if the
    /// file is missing or unreadable.
    pub fn at_path(path: PathBuf) -> Self {
        let policy = Self::load_policy(&path).unwrap_or_else(|e| {
            log::warn!(
                "[Policy] Falling back to default trust policy — path={} error={:#}",
                path.display(),
                e
            );
            TrustPolicy::default()
        });
        Self {
            policy: Arc::new(policy),
            config_path: path,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn update_policy(&mut self, policy: TrustPolicy) {
        self.policy = Arc::new(policy);
    }

    fn get_config_path() -> PathBuf {
        ProjectDirs::from("org", "award-search", "award-search")
            .map(|dirs| dirs.config_dir().join("trust_policy.json"))
            .unwrap_or_else(|| PathBuf::from("trust_policy.json"))
    }

    fn load_policy(path: &Path) -> Result<TrustPolicy> {
        if !path.exists() {
            log::debug!(
                "[Policy] No policy file found at {:?}, using defaults",
                path
            );
            return Ok(TrustPolicy::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut policy: TrustPolicy = serde_json::from_str(&content).map_err(|e| {
            log::error!("[Policy] JSON Parse error for {:?}: {}", path, e);
            e
        })?;

        if policy.schema_version < CURRENT_SCHEMA_VERSION {
            log::info!(
                "[Policy] Migrating trust_policy.json from schema v{} to v{}",
                policy.schema_version,
                CURRENT_SCHEMA_VERSION
            );
            let defaults = TrustPolicy::default();

            // v1→v2: single-carrier rules gained per-source scoping
            if policy.schema_version <= 1 {
                policy.strip_rules = defaults.strip_rules.clone();
                policy.single_carrier_rules = defaults.single_carrier_rules.clone();
                log::info!("[Policy] v1→v2: Reset strip and single-carrier rules");
            }

            // v2→v3: distance buckets became inclusive upper bounds.
            // User zone assignments are kept.
            if policy.schema_version <= 2 {
                policy.tiers = defaults.tiers.clone();
                log::info!("[Policy] v2→v3: Reset pricing tiers");
            }

            policy.schema_version = CURRENT_SCHEMA_VERSION;
            if let Err(e) = Self::write_policy(path, &policy) {
                log::warn!("[Policy] Could not persist migrated policy: {:#}", e);
            }
        }

        policy.validate()?;
        log::debug!(
            "[Policy] Loaded {} sources, {} zones, {} tier rows",
            policy.source_priority.len(),
            policy.zones.len(),
            policy.tiers.rows.len()
        );
        Ok(policy)
    }

    fn write_policy(path: &Path, policy: &TrustPolicy) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content =
            serde_json::to_string_pretty(policy).context("Failed to serialize trust policy")?;
        fs::write(path, content).context("Failed to write trust_policy.json")
    }

    pub fn save(&self) -> Result<()> {
        log::debug!("[Policy] Saving trust policy to {:?}", self.config_path);
        Self::write_policy(&self.config_path, &self.policy)
    }

    pub fn reset_defaults(&mut self) -> Result<()> {
        self.policy = Arc::new(TrustPolicy::default());
        self.save()
    }
}
