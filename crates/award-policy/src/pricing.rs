// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::cabin::Cabin;
use serde::{Deserialize, Serialize};

/// Maximum believable mileage cost per cabin for one zone pair and distance bucket.
/// `None` means the chart has no opinion for that cabin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CabinCeilings {
    #[serde(default)]
    pub economy: Option<u32>,
    #[serde(default)]
    pub premium: Option<u32>,
    #[serde(default)]
    pub business: Option<u32>,
    #[serde(default)]
    pub first: Option<u32>,
}

impl CabinCeilings {
    pub fn get(&self, cabin: Cabin) -> Option<u32> {
        match cabin {
            Cabin::Economy => self.economy,
            Cabin::PremiumEconomy => self.premium,
            Cabin::Business => self.business,
            Cabin::First => self.first,
        }
    }
}

/// One row of the award chart: a zone pair and the upper bound of its distance bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRow {
    pub origin_zone: String,
    pub destination_zone: String,
    /// Inclusive upper bound in miles.
    pub max_distance: u32,
    pub ceilings: CabinCeilings,
}

/// Source of price ceilings for the single-carrier trust heuristic.
pub trait PricingTier: Send + Sync {
    fn ceiling(&self, origin_zone: &str, destination_zone: &str, distance: u32)
        -> Option<CabinCeilings>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierChart {
    pub rows: Vec<TierRow>,
}

impl TierChart {
    pub fn new(rows: Vec<TierRow>) -> Self {
        Self { rows }
    }

    fn lookup(&self, origin_zone: &str, destination_zone: &str, distance: u32) -> Option<&TierRow> {
        self.rows
            .iter()
            .filter(|r| {
                r.origin_zone.eq_ignore_ascii_case(origin_zone)
                    && r.destination_zone.eq_ignore_ascii_case(destination_zone)
                    && distance <= r.max_distance
            })
            .min_by_key(|r| r.max_distance)
    }
}

impl PricingTier for TierChart {
    fn ceiling(
        &self,
        origin_zone: &str,
        destination_zone: &str,
        distance: u32,
    ) -> Option<CabinCeilings> {
        // Charts are symmetric unless a row says otherwise
        self.lookup(origin_zone, destination_zone, distance)
            .or_else(|| self.lookup(destination_zone, origin_zone, distance))
            .map(|r| r.ceilings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(o: &str, d: &str, max: u32, business: u32) -> TierRow {
        TierRow {
            origin_zone: o.to_string(),
            destination_zone: d.to_string(),
            max_distance: max,
            ceilings: CabinCeilings {
                business: Some(business),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_smallest_matching_bucket_wins() {
        let chart = TierChart::new(vec![
            row("Europe", "Middle East", 10000, 90000),
            row("Europe", "Middle East", 3000, 50000),
        ]);
        let c = chart.ceiling("Europe", "Middle East", 2500).unwrap();
        assert_eq!(c.get(Cabin::Business), Some(50000));

        let c = chart.ceiling("Europe", "Middle East", 4000).unwrap();
        assert_eq!(c.get(Cabin::Business), Some(90000));

        assert!(chart.ceiling("Europe", "Middle East", 12000).is_none());
    }

    #[test]
    fn test_reverse_direction_lookup() {
        let chart = TierChart::new(vec![row("North America", "Europe", 6000, 70000)]);
        let c = chart.ceiling("Europe", "north america", 3500).unwrap();
        assert_eq!(c.business, Some(70000));
        assert_eq!(c.get(Cabin::Economy), None);
    }
}
