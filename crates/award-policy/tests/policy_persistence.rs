// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

// Persistence and schema migration of trust_policy.json.

use award_policy::{PolicyStore, TrustPolicy, CURRENT_SCHEMA_VERSION};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let store = PolicyStore::at_path(dir.path().join("trust_policy.json"));
    assert_eq!(*store.policy, TrustPolicy::default());
}

#[test]
fn test_save_and_reload_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("trust_policy.json");

    let mut store = PolicyStore::at_path(path.clone());
    let mut policy = (*store.policy).clone();
    policy.excluded_carriers.push("W6".to_string());
    policy
        .zones
        .insert("KEF".to_string(), "Europe".to_string());
    store.update_policy(policy);
    store.save().unwrap();

    let reloaded = PolicyStore::at_path(path);
    assert!(reloaded.policy.excluded_carriers.contains(&"W6".to_string()));
    assert_eq!(reloaded.policy.zone_of("kef"), Some("Europe"));
}

#[test]
fn test_migration_resets_tiers_but_keeps_zones() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trust_policy.json");

    let mut old = TrustPolicy::default();
    old.schema_version = 2;
    old.tiers.rows.clear();
    old.zones.insert("KEF".to_string(), "Europe".to_string());
    fs::write(&path, serde_json::to_string_pretty(&old).unwrap()).unwrap();

    let store = PolicyStore::at_path(path.clone());
    assert_eq!(store.policy.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(store.policy.tiers, TrustPolicy::default().tiers);
    assert_eq!(store.policy.zone_of("KEF"), Some("Europe"));

    // Migrated file is written back
    let on_disk: TrustPolicy =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.schema_version, CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trust_policy.json");
    fs::write(&path, "{ not json").unwrap();

    let store = PolicyStore::at_path(path);
    assert_eq!(*store.policy, TrustPolicy::default());
}

#[test]
fn test_reset_defaults_overwrites_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trust_policy.json");

    let mut store = PolicyStore::at_path(path.clone());
    let mut policy = (*store.policy).clone();
    policy.source_priority.reverse();
    store.update_policy(policy);
    store.save().unwrap();

    store.reset_defaults().unwrap();
    let reloaded = PolicyStore::at_path(path);
    assert_eq!(*reloaded.policy, TrustPolicy::default());
}
