// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

pub mod calendar;
pub mod config;
pub mod dedup;
pub mod export;
pub mod file_source;
pub mod filter;
pub mod generation;
pub mod itinerary;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod reconcile;
pub mod remote;
pub mod route;
pub mod selection;
pub mod window;

pub use award_policy::Cabin;

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that block a search before any fetch is issued, or end it early.
/// Per-source and per-date problems are absorbed and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("No API credential configured")]
    MissingCredential,
    #[error("No date range selected")]
    MissingDateRange,
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },
    #[error("Stopover airport {airport} is not an intermediate point of {route}")]
    InvalidStopover { airport: String, route: String },
    #[error("Search generation {0} was superseded by a newer search")]
    Superseded(u64),
}

/// Directory holding `search.json` and other per-user settings.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "award-search", "award-search")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".award-search"))
}
