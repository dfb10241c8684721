// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::{FlightKey, FlightOption};
use std::collections::BTreeMap;

/// Merges flights sharing a number and departure into one multi-cabin entry.
///
/// Cabin flags are OR-ed, contributing sources are unioned (sorted, unique),
/// and every other field comes from the first entry seen for the key. Output
/// is ordered by key, so the result does not depend on input order.
pub fn dedupe<I>(options: I) -> Vec<FlightOption>
where
    I: IntoIterator<Item = FlightOption>,
{
    let mut merged: BTreeMap<FlightKey, FlightOption> = BTreeMap::new();

    for option in options {
        match merged.get_mut(&option.key()) {
            Some(existing) => {
                existing.cabins = existing.cabins.union(option.cabins);
                existing.sources.extend(option.sources);
            }
            None => {
                merged.insert(option.key(), option);
            }
        }
    }

    merged
        .into_values()
        .map(|mut o| {
            o.sources.sort();
            o.sources.dedup();
            o
        })
        .collect()
}
