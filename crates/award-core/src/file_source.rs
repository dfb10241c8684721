// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::{RawTrip, SourceRecord};
use crate::provider::{AvailabilityProvider, DetailFetcher, FetchError};
use chrono::NaiveDate;
use log::debug;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const AVAILABILITY_FILE: &str = "availability.json";
pub const TRIPS_FILE: &str = "trips.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FetchError> {
    let content = fs::read_to_string(path)?;
    let items: Vec<T> = serde_json::from_str(&content)?;
    debug!(
        "Loaded {} items — path={}",
        items.len(),
        path.display()
    );
    Ok(items)
}

/// Serves `availability.json` from a data directory (a saved provider dump).
#[derive(Debug, Clone)]
pub struct FileAvailabilityProvider {
    path: PathBuf,
}

impl FileAvailabilityProvider {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(AVAILABILITY_FILE),
        }
    }
}

impl AvailabilityProvider for FileAvailabilityProvider {
    fn availability(
        &self,
        route: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<SourceRecord>, FetchError> {
        let (origin, destination) = route.split_once('-').unwrap_or((route, ""));
        let records: Vec<SourceRecord> = read_json(&self.path)?;
        Ok(records
            .into_iter()
            .filter(|r| {
                r.origin.eq_ignore_ascii_case(origin)
                    && r.destination.eq_ignore_ascii_case(destination)
                    && start.map(|s| r.date >= s).unwrap_or(true)
            })
            .collect())
    }
}

/// Serves `trips.json` from a data directory, matched on source and availability id.
#[derive(Debug, Clone)]
pub struct FileDetailFetcher {
    path: PathBuf,
}

impl FileDetailFetcher {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(TRIPS_FILE),
        }
    }
}

impl DetailFetcher for FileDetailFetcher {
    fn fetch_trips(&self, source: &str, ids: &[String]) -> Result<Vec<RawTrip>, FetchError> {
        let trips: Vec<RawTrip> = read_json(&self.path)?;
        Ok(trips
            .into_iter()
            .filter(|t| t.source.eq_ignore_ascii_case(source) && ids.contains(&t.availability_id))
            .collect())
    }
}
