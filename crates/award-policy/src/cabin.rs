// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fare-class bucket. Ordered from cheapest to most premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cabin {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl Cabin {
    pub const ALL: [Cabin; 4] = [
        Cabin::Economy,
        Cabin::PremiumEconomy,
        Cabin::Business,
        Cabin::First,
    ];

    /// Single-letter code used by the availability feeds (Y/W/J/F).
    pub fn code(&self) -> char {
        match self {
            Cabin::Economy => 'Y',
            Cabin::PremiumEconomy => 'W',
            Cabin::Business => 'J',
            Cabin::First => 'F',
        }
    }

    pub fn from_code(code: char) -> Option<Cabin> {
        match code.to_ascii_uppercase() {
            'Y' => Some(Cabin::Economy),
            'W' => Some(Cabin::PremiumEconomy),
            'J' => Some(Cabin::Business),
            'F' => Some(Cabin::First),
            _ => None,
        }
    }
}

impl fmt::Display for Cabin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cabin::Economy => "economy",
            Cabin::PremiumEconomy => "premium",
            Cabin::Business => "business",
            Cabin::First => "first",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cabin '{0}'")]
pub struct UnknownCabin(pub String);

impl FromStr for Cabin {
    type Err = UnknownCabin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "economy" | "eco" => Ok(Cabin::Economy),
            "premium" | "premium economy" | "premiumeconomy" => Ok(Cabin::PremiumEconomy),
            "business" | "biz" => Ok(Cabin::Business),
            "first" => Ok(Cabin::First),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Cabin::from_code(c).ok_or_else(|| UnknownCabin(s.to_string())),
                    _ => Err(UnknownCabin(s.to_string())),
                }
            }
        }
    }
}
