// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::SearchError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Ordered airports of a requested journey. Segment `i` flies
/// `airports[i] -> airports[i + 1]`. Serialised as its "SFO-NRT-BKK" form
/// and parsed back through [`Route::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route {
    airports: Vec<String>,
}

impl Route {
    /// Accepts "SFO-NRT-BKK", "sfo, nrt, bkk", "SFO > NRT > BKK".
    pub fn parse(input: &str) -> Result<Self, SearchError> {
        static SPLIT_RE: OnceLock<Regex> = OnceLock::new();
        static CODE_RE: OnceLock<Regex> = OnceLock::new();
        let split_re = SPLIT_RE.get_or_init(|| Regex::new(r"[\s,/>\-]+").unwrap());
        let code_re = CODE_RE.get_or_init(|| Regex::new(r"^[A-Z]{3}$").unwrap());

        let invalid = |reason: &str| SearchError::InvalidRoute {
            route: input.to_string(),
            reason: reason.to_string(),
        };

        let airports: Vec<String> = split_re
            .split(input.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_uppercase())
            .collect();

        if airports.len() < 2 {
            return Err(invalid("at least two airports are required"));
        }
        if let Some(bad) = airports.iter().find(|a| !code_re.is_match(a)) {
            return Err(invalid(&format!("'{}' is not a three-letter airport code", bad)));
        }
        if airports.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("consecutive airports must differ"));
        }

        Ok(Self { airports })
    }

    pub fn airports(&self) -> &[String] {
        &self.airports
    }

    pub fn segment_count(&self) -> usize {
        self.airports.len() - 1
    }

    pub fn segment(&self, index: usize) -> Option<(&str, &str)> {
        let origin = self.airports.get(index)?;
        let destination = self.airports.get(index + 1)?;
        Some((origin.as_str(), destination.as_str()))
    }

    /// Route string for a single segment, e.g. "SFO-NRT".
    pub fn segment_route(&self, index: usize) -> Option<String> {
        self.segment(index).map(|(o, d)| format!("{}-{}", o, d))
    }

    /// The airport where segment `index - 1` ends and segment `index` starts.
    pub fn junction(&self, index: usize) -> Option<&str> {
        if index == 0 || index >= self.airports.len() - 1 {
            return None;
        }
        self.airports.get(index).map(|a| a.as_str())
    }

    pub fn is_intermediate(&self, airport: &str) -> bool {
        let n = self.airports.len();
        self.airports[1..n - 1]
            .iter()
            .any(|a| a.eq_ignore_ascii_case(airport))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.airports.join("-"))
    }
}

impl FromStr for Route {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl TryFrom<String> for Route {
    type Error = SearchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Route::parse(&s)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.to_string()
    }
}

/// A deliberate multi-day layover at one intermediate airport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopoverSpec {
    pub airport: String,
    pub days: u32,
}

impl StopoverSpec {
    pub fn new(airport: &str, days: u32) -> Self {
        Self {
            airport: airport.trim().to_ascii_uppercase(),
            days,
        }
    }

    pub fn is_at(&self, airport: &str) -> bool {
        self.airport.eq_ignore_ascii_case(airport)
    }

    /// Rejects a stopover at the origin, the destination, or off-route.
    pub fn validate(&self, route: &Route) -> Result<(), SearchError> {
        if route.is_intermediate(&self.airport) {
            Ok(())
        } else {
            Err(SearchError::InvalidStopover {
                airport: self.airport.clone(),
                route: route.to_string(),
            })
        }
    }
}

impl FromStr for StopoverSpec {
    type Err = String;

    /// "NRT:2" or "NRT=2".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (airport, days) = s
            .split_once([':', '='])
            .ok_or_else(|| format!("expected AIRPORT:DAYS, got '{}'", s))?;
        let days = days
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid stopover days '{}': {}", days, e))?;
        Ok(StopoverSpec::new(airport, days))
    }
}
