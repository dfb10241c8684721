// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::pricing::{CabinCeilings, PricingTier, TierChart, TierRow};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Airline codes a source's feed reports that actually belong to another carrier.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct StripRule {
    pub source: String,
    pub airlines: Vec<String>,
}

/// A carrier whose lone appearance in a cabin claim needs price corroboration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct SingleCarrierRule {
    pub carrier: String,
    /// Empty = applies to every source.
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct FareClassRule {
    pub carrier: String,
    pub allowed: Vec<String>,
}

/// Why a trip record was dropped before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Stops(u32),
    ExcludedCarrier(String),
    CompoundFareClass(String),
    FareClassNotAllowed { carrier: String, fare_class: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid airline code '{0}'")]
    InvalidAirline(String),
    #[error("Invalid airport code '{0}'")]
    InvalidAirport(String),
    #[error("Source '{0}' appears more than once in the priority list")]
    DuplicateSource(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TrustPolicy {
    /// Sources earlier in the list are merged first. Unlisted sources go last.
    pub source_priority: Vec<String>,
    #[serde(default)]
    pub strip_rules: Vec<StripRule>,
    #[serde(default)]
    pub single_carrier_rules: Vec<SingleCarrierRule>,
    #[serde(default)]
    pub excluded_carriers: Vec<String>,
    #[serde(default)]
    pub fare_class_rules: Vec<FareClassRule>,
    /// Airport code -> pricing zone.
    #[serde(default)]
    pub zones: BTreeMap<String, String>,
    #[serde(default)]
    pub tiers: TierChart,
    /// Schema version for migration. Increment when breaking changes are made.
    #[serde(default)]
    pub schema_version: u32,
}

/// When a user's file has a lower version, its rule tables are reset on load.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

fn strs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_zones() -> BTreeMap<String, String> {
    let table: &[(&str, &[&str])] = &[
        (
            "North America",
            &[
                "ATL", "BOS", "DFW", "EWR", "IAD", "IAH", "JFK", "LAX", "ORD", "SEA", "SFO",
                "YUL", "YVR", "YYZ",
            ],
        ),
        (
            "Europe",
            &[
                "AMS", "ARN", "BCN", "CDG", "CPH", "DUB", "FCO", "FRA", "HEL", "IST", "LHR",
                "MAD", "MUC", "ZRH",
            ],
        ),
        ("Middle East", &["AUH", "DOH", "DXB", "RUH"]),
        (
            "Asia",
            &[
                "BKK", "DEL", "HKG", "HND", "ICN", "KUL", "MNL", "NRT", "PEK", "SIN", "TPE",
            ],
        ),
        ("Oceania", &["AKL", "BNE", "MEL", "SYD"]),
        ("South America", &["BOG", "EZE", "GRU", "LIM", "SCL"]),
        ("Africa", &["ADD", "CAI", "CPT", "JNB", "NBO"]),
    ];
    let mut zones = BTreeMap::new();
    for (zone, airports) in table {
        for apt in airports.iter() {
            zones.insert(apt.to_string(), zone.to_string());
        }
    }
    zones
}

fn default_tiers() -> TierChart {
    let row = |o: &str, d: &str, max: u32, y: u32, j: u32, f: u32| TierRow {
        origin_zone: o.to_string(),
        destination_zone: d.to_string(),
        max_distance: max,
        ceilings: CabinCeilings {
            economy: Some(y),
            premium: None,
            business: Some(j),
            first: Some(f),
        },
    };
    TierChart::new(vec![
        row("Middle East", "Middle East", 1500, 15000, 30000, 45000),
        row("Middle East", "Europe", 3000, 25000, 55000, 80000),
        row("Middle East", "Europe", 6000, 35000, 70000, 105000),
        row("Middle East", "Asia", 3000, 25000, 50000, 75000),
        row("Middle East", "Asia", 7000, 40000, 80000, 120000),
        row("Middle East", "North America", 9000, 50000, 100000, 150000),
        row("Middle East", "Africa", 4500, 30000, 60000, 90000),
        row("Middle East", "Oceania", 9000, 50000, 110000, 160000),
        row("Europe", "Asia", 7000, 40000, 85000, 130000),
        row("North America", "Europe", 6000, 35000, 75000, 115000),
        row("North America", "Asia", 8000, 45000, 95000, 140000),
    ])
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            source_priority: strs(&[
                "united",
                "aeroplan",
                "alaska",
                "american",
                "delta",
                "virginatlantic",
                "flyingblue",
                "qantas",
                "emirates",
                "etihad",
                "lifemiles",
                "smiles",
                "velocity",
                "eurobonus",
                "turkish",
                "azul",
            ]),
            strip_rules: vec![
                StripRule {
                    source: "smiles".to_string(),
                    airlines: strs(&["G3"]),
                },
                StripRule {
                    source: "azul".to_string(),
                    airlines: strs(&["AD"]),
                },
            ],
            single_carrier_rules: vec![SingleCarrierRule {
                carrier: "EY".to_string(),
                sources: Vec::new(),
            }],
            excluded_carriers: strs(&["NK", "F9", "G4", "SY"]),
            fare_class_rules: vec![FareClassRule {
                carrier: "UA".to_string(),
                allowed: strs(&["X", "I", "O"]),
            }],
            zones: default_zones(),
            tiers: default_tiers(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }
}

fn airline_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9]{2}$").unwrap())
}

fn airport_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}$").unwrap())
}

impl TrustPolicy {
    /// Position of `source` in the merge order. Unknown sources share the last rank.
    pub fn source_rank(&self, source: &str) -> usize {
        self.source_priority
            .iter()
            .position(|s| s.eq_ignore_ascii_case(source))
            .unwrap_or(self.source_priority.len())
    }

    /// Drops the airline codes this source is known to misattribute.
    pub fn strip_airlines(&self, source: &str, airlines: &[String]) -> Vec<String> {
        let stripped: Vec<&String> = self
            .strip_rules
            .iter()
            .filter(|r| r.source.eq_ignore_ascii_case(source))
            .flat_map(|r| r.airlines.iter())
            .collect();
        airlines
            .iter()
            .filter(|a| !stripped.iter().any(|s| s.eq_ignore_ascii_case(a)))
            .cloned()
            .collect()
    }

    /// Returns the carrier if `airlines` is exactly one low-confidence carrier for `source`.
    pub fn low_confidence_carrier<'a>(
        &self,
        source: &str,
        airlines: &'a [String],
    ) -> Option<&'a str> {
        let [only] = airlines else {
            return None;
        };
        self.single_carrier_rules
            .iter()
            .any(|r| {
                r.carrier.eq_ignore_ascii_case(only)
                    && (r.sources.is_empty()
                        || r.sources.iter().any(|s| s.eq_ignore_ascii_case(source)))
            })
            .then_some(only.as_str())
    }

    pub fn zone_of(&self, airport: &str) -> Option<&str> {
        self.zones
            .get(&airport.to_ascii_uppercase())
            .map(|z| z.as_str())
    }

    /// Silent exclusion policy applied to raw trip records.
    pub fn screen_trip(&self, carrier: &str, stops: u32, fare_class: &str) -> Option<Exclusion> {
        if stops != 0 {
            return Some(Exclusion::Stops(stops));
        }
        if self
            .excluded_carriers
            .iter()
            .any(|c| c.eq_ignore_ascii_case(carrier))
        {
            return Some(Exclusion::ExcludedCarrier(carrier.to_string()));
        }
        let fare_class = fare_class.trim();
        if fare_class.chars().count() == 2 {
            return Some(Exclusion::CompoundFareClass(fare_class.to_string()));
        }
        for rule in self
            .fare_class_rules
            .iter()
            .filter(|r| r.carrier.eq_ignore_ascii_case(carrier))
        {
            if !rule
                .allowed
                .iter()
                .any(|f| f.eq_ignore_ascii_case(fare_class))
            {
                return Some(Exclusion::FareClassNotAllowed {
                    carrier: carrier.to_string(),
                    fare_class: fare_class.to_string(),
                });
            }
        }
        None
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        let mut seen = std::collections::HashSet::new();
        for source in &self.source_priority {
            if !seen.insert(source.to_lowercase()) {
                return Err(PolicyError::DuplicateSource(source.clone()));
            }
        }

        let airlines = self
            .strip_rules
            .iter()
            .flat_map(|r| r.airlines.iter())
            .chain(self.single_carrier_rules.iter().map(|r| &r.carrier))
            .chain(self.excluded_carriers.iter())
            .chain(self.fare_class_rules.iter().map(|r| &r.carrier));
        for code in airlines {
            if !airline_code_re().is_match(code) {
                return Err(PolicyError::InvalidAirline(code.clone()));
            }
        }

        for airport in self.zones.keys() {
            if !airport_code_re().is_match(airport) {
                return Err(PolicyError::InvalidAirport(airport.clone()));
            }
        }
        Ok(())
    }
}

impl PricingTier for TrustPolicy {
    fn ceiling(
        &self,
        origin_zone: &str,
        destination_zone: &str,
        distance: u32,
    ) -> Option<CabinCeilings> {
        self.tiers.ceiling(origin_zone, destination_zone, distance)
    }
}
