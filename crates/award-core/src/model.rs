// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use award_policy::Cabin;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One cabin's claim inside a source's availability record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CabinClaim {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub direct: bool,
    /// Airlines the source says fly this cabin nonstop.
    #[serde(default)]
    pub airlines: Vec<String>,
    #[serde(default)]
    pub mileage_cost: u32,
    #[serde(default)]
    pub taxes: u32,
    /// Id to re-fetch for trip detail. Falls back to the record id.
    #[serde(default)]
    pub detail_id: Option<String>,
}

/// One source's claim for a (route, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    pub source: String,
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    /// Great-circle miles; 0 when the feed omits it.
    #[serde(default)]
    pub distance: u32,
    #[serde(default)]
    pub cabins: BTreeMap<Cabin, CabinClaim>,
}

impl SourceRecord {
    pub fn claim(&self, cabin: Cabin) -> Option<&CabinClaim> {
        self.cabins.get(&cabin)
    }

    pub fn detail_id(&self, cabin: Cabin) -> &str {
        self.claim(cabin)
            .and_then(|c| c.detail_id.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn route_key(&self) -> (String, String, NaiveDate) {
        (
            self.origin.to_ascii_uppercase(),
            self.destination.to_ascii_uppercase(),
            self.date,
        )
    }
}

/// One source vouching for one airline in a canonical cabin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub airline: String,
    pub source: String,
    pub record_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CabinAvailability {
    pub direct: bool,
    /// Unique, in order of first appearance across sources.
    pub airlines: Vec<String>,
    pub contributions: Vec<Contribution>,
}

impl CabinAvailability {
    /// Unique (source, record id) pairs that vouched for at least one airline.
    pub fn detail_ids(&self) -> Vec<(&str, &str)> {
        let mut seen = BTreeSet::new();
        self.contributions
            .iter()
            .map(|c| (c.source.as_str(), c.record_id.as_str()))
            .filter(|pair| seen.insert(*pair))
            .collect()
    }

    pub fn last_contributor(&self) -> Option<&Contribution> {
        self.contributions.last()
    }
}

/// The reconciled availability for one (route, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub distance: u32,
    pub cabins: BTreeMap<Cabin, CabinAvailability>,
}

impl CanonicalRecord {
    pub fn is_direct(&self, cabin: Cabin) -> bool {
        self.cabins.get(&cabin).map(|c| c.direct).unwrap_or(false)
    }

    pub fn any_direct(&self) -> bool {
        self.cabins.values().any(|c| c.direct)
    }

    pub fn airlines(&self, cabin: Cabin) -> &[String] {
        self.cabins
            .get(&cabin)
            .map(|c| c.airlines.as_slice())
            .unwrap_or(&[])
    }

    /// Record ids to fetch for trip detail, grouped by source.
    pub fn detail_requests(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut requests: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for cabin in self.cabins.values() {
            for (source, id) in cabin.detail_ids() {
                requests
                    .entry(source.to_string())
                    .or_default()
                    .insert(id.to_string());
            }
        }
        requests
    }
}

/// Per-cabin availability booleans of a concrete flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CabinFlags {
    pub economy: bool,
    pub premium: bool,
    pub business: bool,
    pub first: bool,
}

impl CabinFlags {
    pub fn only(cabin: Cabin) -> Self {
        let mut flags = Self::default();
        flags.set(cabin, true);
        flags
    }

    pub fn get(&self, cabin: Cabin) -> bool {
        match cabin {
            Cabin::Economy => self.economy,
            Cabin::PremiumEconomy => self.premium,
            Cabin::Business => self.business,
            Cabin::First => self.first,
        }
    }

    pub fn set(&mut self, cabin: Cabin, value: bool) {
        match cabin {
            Cabin::Economy => self.economy = value,
            Cabin::PremiumEconomy => self.premium = value,
            Cabin::Business => self.business = value,
            Cabin::First => self.first = value,
        }
    }

    pub fn union(self, other: CabinFlags) -> CabinFlags {
        CabinFlags {
            economy: self.economy || other.economy,
            premium: self.premium || other.premium,
            business: self.business || other.business,
            first: self.first || other.first,
        }
    }

    pub fn any(&self) -> bool {
        self.economy || self.premium || self.business || self.first
    }
}

impl fmt::Display for CabinFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cabin in Cabin::ALL {
            let c = if self.get(cabin) { cabin.code() } else { '-' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Identity of a flight: number plus exact local departure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub flight_number: String,
    pub departs_at: NaiveDateTime,
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.flight_number,
            self.departs_at.format("%Y-%m-%dT%H:%M")
        )
    }
}

/// A single nonstop trip as returned by a detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrip {
    pub id: String,
    /// The availability record this trip belongs to.
    pub availability_id: String,
    pub source: String,
    pub flight_number: String,
    pub carrier: String,
    pub cabin: Cabin,
    #[serde(default)]
    pub stops: u32,
    #[serde(default)]
    pub fare_class: String,
    pub origin: String,
    pub destination: String,
    pub departs_at: NaiveDateTime,
    pub arrives_at: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub aircraft: String,
    #[serde(default)]
    pub distance: u32,
}

/// A concrete flight offered on one segment. Times are local to each airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightOption {
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departs_at: NaiveDateTime,
    pub arrives_at: NaiveDateTime,
    pub duration_minutes: u32,
    pub aircraft: String,
    pub cabins: CabinFlags,
    pub distance: u32,
    pub segment_index: usize,
    /// Sorted, unique.
    pub sources: Vec<String>,
}

impl FlightOption {
    pub fn key(&self) -> FlightKey {
        FlightKey {
            flight_number: self.flight_number.clone(),
            departs_at: self.departs_at,
        }
    }

    pub fn matches(&self, key: &FlightKey) -> bool {
        self.flight_number == key.flight_number && self.departs_at == key.departs_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(airline: &str, source: &str, id: &str) -> Contribution {
        Contribution {
            airline: airline.to_string(),
            source: source.to_string(),
            record_id: id.to_string(),
        }
    }

    #[test]
    fn test_detail_ids_unique_in_order() {
        let cabin = CabinAvailability {
            direct: true,
            airlines: vec!["UA".into(), "NH".into(), "LH".into()],
            contributions: vec![
                contribution("UA", "united", "u1"),
                contribution("NH", "united", "u1"),
                contribution("LH", "aeroplan", "a7"),
            ],
        };
        assert_eq!(cabin.detail_ids(), vec![("united", "u1"), ("aeroplan", "a7")]);
        assert_eq!(cabin.last_contributor().unwrap().source, "aeroplan");
    }

    #[test]
    fn test_cabin_flags_union_and_display() {
        let a = CabinFlags::only(Cabin::Economy);
        let b = CabinFlags::only(Cabin::Business);
        let u = a.union(b);
        assert!(u.economy && u.business && !u.first);
        assert_eq!(u.to_string(), "Y-J-");
        assert!(!CabinFlags::default().any());
    }

    #[test]
    fn test_record_detail_id_fallback() {
        let mut cabins = BTreeMap::new();
        cabins.insert(
            Cabin::Business,
            CabinClaim {
                detail_id: Some("trip-9".into()),
                ..Default::default()
            },
        );
        cabins.insert(Cabin::Economy, CabinClaim::default());
        let record = SourceRecord {
            id: "rec-1".into(),
            source: "united".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            origin: "sfo".into(),
            destination: "NRT".into(),
            distance: 5130,
            cabins,
        };
        assert_eq!(record.detail_id(Cabin::Business), "trip-9");
        assert_eq!(record.detail_id(Cabin::Economy), "rec-1");
        assert_eq!(record.detail_id(Cabin::First), "rec-1");
        assert_eq!(record.route_key().0, "SFO");
    }
}
