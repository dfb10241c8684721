// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::{CabinAvailability, CanonicalRecord, Contribution, SourceRecord};
use award_policy::{Cabin, PricingTier, TrustPolicy};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};

/// Merges every source's claim for one (route, date) into a canonical record.
pub struct Reconciler<'a> {
    policy: &'a TrustPolicy,
    pricing: &'a dyn PricingTier,
}

impl<'a> Reconciler<'a> {
    pub fn new(policy: &'a TrustPolicy, pricing: &'a dyn PricingTier) -> Self {
        Self { policy, pricing }
    }

    /// Returns `None` when there is nothing to merge.
    /// Records are assumed to share a route and date; see [`Reconciler::reconcile_all`].
    pub fn reconcile(&self, records: &[SourceRecord]) -> Option<CanonicalRecord> {
        let first = records.first()?;

        let mut ordered: Vec<&SourceRecord> = records.iter().collect();
        // Stable: ties between unlisted sources keep name order
        ordered.sort_by(|a, b| {
            self.policy
                .source_rank(&a.source)
                .cmp(&self.policy.source_rank(&b.source))
                .then_with(|| a.source.cmp(&b.source))
        });

        let mut cabins: BTreeMap<Cabin, CabinAvailability> = Cabin::ALL
            .iter()
            .map(|c| (*c, CabinAvailability::default()))
            .collect();

        for record in ordered {
            for cabin in Cabin::ALL {
                let Some(claim) = record.claim(cabin) else {
                    continue;
                };
                let airlines = self.corrected_airlines(record, cabin);
                let direct = !airlines.is_empty();
                if direct != claim.direct {
                    debug!(
                        "Direct flag corrected — source={} date={} cabin={} claimed={} corrected={}",
                        record.source, record.date, cabin, claim.direct, direct
                    );
                }

                let canonical = cabins.entry(cabin).or_default();
                canonical.direct |= direct;
                for airline in airlines {
                    canonical.contributions.push(Contribution {
                        airline: airline.clone(),
                        source: record.source.clone(),
                        record_id: record.detail_id(cabin).to_string(),
                    });
                    if !canonical.airlines.contains(&airline) {
                        canonical.airlines.push(airline);
                    }
                }
            }
        }

        Some(CanonicalRecord {
            origin: first.origin.to_ascii_uppercase(),
            destination: first.destination.to_ascii_uppercase(),
            date: first.date,
            distance: records.iter().map(|r| r.distance).max().unwrap_or(0),
            cabins,
        })
    }

    /// Groups records by (origin, destination, date) and reconciles each group.
    pub fn reconcile_all(&self, records: &[SourceRecord]) -> Vec<CanonicalRecord> {
        let mut groups: BTreeMap<_, Vec<SourceRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.route_key())
                .or_default()
                .push(record.clone());
        }
        groups
            .values()
            .filter_map(|group| self.reconcile(group))
            .collect()
    }

    /// The source's airline list after strip rules and the single-carrier price check.
    fn corrected_airlines(&self, record: &SourceRecord, cabin: Cabin) -> Vec<String> {
        let Some(claim) = record.claim(cabin) else {
            return Vec::new();
        };
        let normalized: Vec<String> = claim
            .airlines
            .iter()
            .map(|a| a.trim().to_ascii_uppercase())
            .filter(|a| !a.is_empty())
            .collect();
        let mut seen = BTreeSet::new();
        let mut airlines: Vec<String> = self
            .policy
            .strip_airlines(&record.source, &normalized)
            .into_iter()
            .filter(|a| seen.insert(a.clone()))
            .collect();

        if let Some(carrier) = self.policy.low_confidence_carrier(&record.source, &airlines) {
            if self.exceeds_ceiling(record, cabin, claim.mileage_cost) {
                info!(
                    "Rejecting single-carrier claim — source={} carrier={} route={}-{} date={} cabin={} cost={}",
                    record.source,
                    carrier,
                    record.origin,
                    record.destination,
                    record.date,
                    cabin,
                    claim.mileage_cost
                );
                airlines.clear();
            }
        }
        airlines
    }

    /// Unknown zones, an unknown distance or a missing chart row mean no
    /// evidence, so nothing is rejected.
    fn exceeds_ceiling(&self, record: &SourceRecord, cabin: Cabin, cost: u32) -> bool {
        if record.distance == 0 {
            debug!(
                "No distance for {}-{} from {}; skipping ceiling check",
                record.origin, record.destination, record.source
            );
            return false;
        }
        let (Some(oz), Some(dz)) = (
            self.policy.zone_of(&record.origin),
            self.policy.zone_of(&record.destination),
        ) else {
            debug!(
                "No pricing zone for {}-{}; skipping ceiling check",
                record.origin, record.destination
            );
            return false;
        };
        match self
            .pricing
            .ceiling(oz, dz, record.distance)
            .and_then(|c| c.get(cabin))
        {
            Some(ceiling) => cost > ceiling,
            None => false,
        }
    }
}
