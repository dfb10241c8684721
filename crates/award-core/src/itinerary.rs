// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::{FlightKey, FlightOption};
use crate::route::{Route, StopoverSpec};
use award_policy::Cabin;
use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: i64 = 1440;

/// Ordinary connection bounds in minutes, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRules {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl Default for ConnectionRules {
    fn default() -> Self {
        Self {
            min_minutes: 30,
            max_minutes: MINUTES_PER_DAY,
        }
    }
}

/// One flight per segment that has data, in segment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub flights: Vec<FlightOption>,
}

impl Itinerary {
    pub fn first_departure(&self) -> Option<NaiveDateTime> {
        self.flights.first().map(|f| f.departs_at)
    }

    pub fn last_arrival(&self) -> Option<NaiveDateTime> {
        self.flights.last().map(|f| f.arrives_at)
    }

    /// Local-clock minutes from first departure to last arrival.
    pub fn elapsed_minutes(&self) -> i64 {
        match (self.first_departure(), self.last_arrival()) {
            (Some(dep), Some(arr)) => (arr - dep).num_minutes(),
            _ => 0,
        }
    }

    /// Minutes between each arrival and the following departure.
    pub fn connections(&self) -> Vec<i64> {
        self.flights
            .windows(2)
            .map(|w| (w[1].departs_at - w[0].arrives_at).num_minutes())
            .collect()
    }

    pub fn flight_at(&self, segment_index: usize) -> Option<&FlightOption> {
        self.flights
            .iter()
            .find(|f| f.segment_index == segment_index)
    }

    pub fn contains(&self, key: &FlightKey) -> bool {
        self.flights.iter().any(|f| f.matches(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = FlightKey> + '_ {
        self.flights.iter().map(|f| f.key())
    }

    /// True when every flight has a seat in `cabin`.
    pub fn offers(&self, cabin: Cabin) -> bool {
        self.flights.iter().all(|f| f.cabins.get(cabin))
    }
}

/// What the search hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    Itineraries {
        itineraries: Vec<Itinerary>,
        /// The emission cap was reached and the list is incomplete.
        truncated: bool,
    },
    /// No complete itinerary exists; every option grouped by segment, unfiltered.
    Flattened(Vec<Vec<FlightOption>>),
}

impl SearchOutcome {
    pub fn itineraries(&self) -> &[Itinerary] {
        match self {
            SearchOutcome::Itineraries { itineraries, .. } => itineraries,
            SearchOutcome::Flattened(_) => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SearchOutcome::Flattened(_))
    }
}

/// Depth-first, connection-constrained search over per-segment option lists.
pub struct ItinerarySearch<'a> {
    route: &'a Route,
    stopover: Option<&'a StopoverSpec>,
    rules: ConnectionRules,
    max_results: usize,
}

impl<'a> ItinerarySearch<'a> {
    pub fn new(route: &'a Route, stopover: Option<&'a StopoverSpec>) -> Self {
        Self {
            route,
            stopover,
            rules: ConnectionRules::default(),
            max_results: usize::MAX,
        }
    }

    pub fn with_rules(mut self, rules: ConnectionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Inclusive bounds for a connection into segment `segment_index`.
    fn bounds(&self, segment_index: usize) -> (i64, i64) {
        match (self.route.junction(segment_index), self.stopover) {
            (Some(junction), Some(s)) if s.is_at(junction) => {
                let days = i64::from(s.days);
                (days * MINUTES_PER_DAY, (days + 1) * MINUTES_PER_DAY)
            }
            _ => (self.rules.min_minutes, self.rules.max_minutes),
        }
    }

    pub fn accepts(&self, prev_arrival: NaiveDateTime, option: &FlightOption, segment_index: usize) -> bool {
        let connection = (option.departs_at - prev_arrival).num_minutes();
        let (min, max) = self.bounds(segment_index);
        connection >= min && connection <= max
    }

    /// All complete paths in depth-first order, plus whether the cap cut the search short.
    ///
    /// Segments without options are skipped rather than represented. The frontier
    /// never holds more than one pending frame per option of each open segment.
    pub fn search(&self, segments: &[Vec<FlightOption>]) -> (Vec<Itinerary>, bool) {
        let Some(last_seg) = segments.iter().rposition(|s| !s.is_empty()) else {
            return (Vec::new(), false);
        };
        let first_seg = segments.iter().position(|s| !s.is_empty()).unwrap_or(0);

        let mut results = Vec::new();
        // (next segment to extend, indices into each visited segment)
        let mut stack: Vec<(usize, Vec<(usize, usize)>)> = vec![(first_seg, Vec::new())];

        while let Some((seg, path)) = stack.pop() {
            if seg > last_seg {
                if results.len() >= self.max_results {
                    warn!(
                        "Itinerary cap reached — cap={} route={}",
                        self.max_results, self.route
                    );
                    return (results, true);
                }
                results.push(Itinerary {
                    flights: path
                        .iter()
                        .map(|&(s, i)| segments[s][i].clone())
                        .collect(),
                });
                continue;
            }

            let options = &segments[seg];
            if options.is_empty() {
                stack.push((seg + 1, path));
                continue;
            }

            let prev_arrival = path.last().map(|&(s, i)| segments[s][i].arrives_at);
            // Reverse so the first option is explored first
            for (i, option) in options.iter().enumerate().rev() {
                let accepted = match prev_arrival {
                    None => true,
                    Some(arrival) => self.accepts(arrival, option, seg),
                };
                if accepted {
                    let mut next = path.clone();
                    next.push((seg, i));
                    stack.push((seg + 1, next));
                }
            }
        }

        debug!(
            "Itinerary search — route={} segments={} found={}",
            self.route,
            segments.len(),
            results.len()
        );
        (results, false)
    }

    /// Runs the search and falls back to the flattened view when nothing connects.
    pub fn assemble(&self, segments: &[Vec<FlightOption>]) -> SearchOutcome {
        let (itineraries, truncated) = self.search(segments);
        if itineraries.is_empty() {
            debug!("No valid itinerary for {}; using flattened view", self.route);
            return SearchOutcome::Flattened(segments.to_vec());
        }
        SearchOutcome::Itineraries {
            itineraries,
            truncated,
        }
    }
}

/// Stable presentation order: earliest departure, then shortest elapsed time.
pub fn sort_itineraries(itineraries: &mut [Itinerary]) {
    itineraries.sort_by(|a, b| {
        a.first_departure()
            .cmp(&b.first_departure())
            .then_with(|| a.elapsed_minutes().cmp(&b.elapsed_minutes()))
    });
}
