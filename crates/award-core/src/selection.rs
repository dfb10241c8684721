// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::itinerary::Itinerary;
use crate::model::{FlightKey, FlightOption};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PICK_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Receives show/hide instructions for displayed flights.
/// Callers pass their own implementation; nothing here touches global state.
pub trait VisibilityController {
    fn show(&mut self, key: &FlightKey);
    fn hide(&mut self, key: &FlightKey);
    /// Make every flight visible again.
    fn reset(&mut self);
}

/// In-memory controller that just remembers which flights are hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionSet {
    hidden: BTreeSet<FlightKey>,
}

impl SuppressionSet {
    pub fn is_hidden(&self, key: &FlightKey) -> bool {
        self.hidden.contains(key)
    }

    pub fn hidden(&self) -> &BTreeSet<FlightKey> {
        &self.hidden
    }
}

impl VisibilityController for SuppressionSet {
    fn show(&mut self, key: &FlightKey) {
        self.hidden.remove(key);
    }

    fn hide(&mut self, key: &FlightKey) {
        self.hidden.insert(key.clone());
    }

    fn reset(&mut self) {
        self.hidden.clear();
    }
}

/// Partial choice of one flight per segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    chosen: BTreeMap<usize, FlightKey>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `option` for its segment, or deselects it if already chosen.
    /// Returns whether the option is selected afterwards.
    pub fn toggle(&mut self, option: &FlightOption) -> bool {
        let key = option.key();
        if self.chosen.get(&option.segment_index) == Some(&key) {
            self.chosen.remove(&option.segment_index);
            false
        } else {
            self.chosen.insert(option.segment_index, key);
            true
        }
    }

    pub fn select(&mut self, segment_index: usize, key: FlightKey) {
        self.chosen.insert(segment_index, key);
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    pub fn get(&self, segment_index: usize) -> Option<&FlightKey> {
        self.chosen.get(&segment_index)
    }

    pub fn is_selected(&self, key: &FlightKey) -> bool {
        self.chosen.values().any(|k| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&usize, &FlightKey)> {
        self.chosen.iter()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    #[error("Invalid pick '{0}': expected FLIGHT or FLIGHT@YYYY-MM-DDTHH:MM")]
    Invalid(String),
    #[error("No displayed flight matches {0}")]
    NotFound(String),
    #[error("{pick} matches several departures: {}", .candidates.join(", "))]
    Ambiguous {
        pick: String,
        candidates: Vec<String>,
    },
}

/// A flight named by the user, e.g. `NH7` or `NH7@2026-11-01T11:00`.
/// The departure is needed only when the number alone is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightPick {
    pub flight_number: String,
    pub departs_at: Option<NaiveDateTime>,
}

impl FlightPick {
    pub fn matches(&self, option: &FlightOption) -> bool {
        option.flight_number.eq_ignore_ascii_case(&self.flight_number)
            && self.departs_at.map_or(true, |t| t == option.departs_at)
    }

    /// The single displayed option this pick names.
    pub fn resolve<'o>(
        &self,
        displayed: &'o [FlightOption],
    ) -> Result<&'o FlightOption, PickError> {
        let mut found = displayed.iter().filter(|o| self.matches(o));
        let first = found
            .next()
            .ok_or_else(|| PickError::NotFound(self.to_string()))?;
        let rest: Vec<&FlightOption> = found.filter(|o| o.key() != first.key()).collect();
        if rest.is_empty() {
            return Ok(first);
        }
        let candidates = std::iter::once(first)
            .chain(rest)
            .map(|o| o.key().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Err(PickError::Ambiguous {
            pick: self.to_string(),
            candidates,
        })
    }
}

impl FromStr for FlightPick {
    type Err = PickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PickError::Invalid(s.to_string());
        let (number, departs_at) = match s.trim().split_once('@') {
            Some((number, time)) => {
                let time = NaiveDateTime::parse_from_str(time.trim(), PICK_TIME_FORMAT)
                    .map_err(|_| invalid())?;
                (number, Some(time))
            }
            None => (s.trim(), None),
        };
        let number = number.trim();
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        Ok(Self {
            flight_number: number.to_ascii_uppercase(),
            departs_at,
        })
    }
}

impl fmt::Display for FlightPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.departs_at {
            Some(t) => write!(f, "{}@{}", self.flight_number, t.format(PICK_TIME_FORMAT)),
            None => f.write_str(&self.flight_number),
        }
    }
}

/// Narrows the itinerary set to what is still reachable from a selection.
pub struct SelectionValidator<'a> {
    itineraries: &'a [Itinerary],
}

impl<'a> SelectionValidator<'a> {
    pub fn new(itineraries: &'a [Itinerary]) -> Self {
        Self { itineraries }
    }

    /// Itineraries whose flight at every selected segment matches the selection.
    pub fn valid_combos(&self, selection: &Selection) -> Vec<&'a Itinerary> {
        self.itineraries
            .iter()
            .filter(|it| {
                selection.iter().all(|(seg, key)| {
                    it.flight_at(*seg)
                        .map(|f| f.matches(key))
                        .unwrap_or(false)
                })
            })
            .collect()
    }

    pub fn valid_keys(&self, selection: &Selection) -> BTreeSet<FlightKey> {
        self.valid_combos(selection)
            .into_iter()
            .flat_map(|it| it.keys())
            .collect()
    }

    /// Displayed flights that no longer fit any combination. Selected flights never appear.
    pub fn suppressed(
        &self,
        selection: &Selection,
        displayed: &[FlightOption],
    ) -> BTreeSet<FlightKey> {
        if selection.is_empty() {
            return BTreeSet::new();
        }
        let valid = self.valid_keys(selection);
        displayed
            .iter()
            .map(|f| f.key())
            .filter(|k| !valid.contains(k) && !selection.is_selected(k))
            .collect()
    }

    /// Pushes the current suppression state to `controller`.
    pub fn apply(
        &self,
        selection: &Selection,
        displayed: &[FlightOption],
        controller: &mut dyn VisibilityController,
    ) {
        if selection.is_empty() {
            controller.reset();
            return;
        }
        let suppressed = self.suppressed(selection, displayed);
        for flight in displayed {
            let key = flight.key();
            if suppressed.contains(&key) {
                controller.hide(&key);
            } else {
                controller.show(&key);
            }
        }
    }
}
