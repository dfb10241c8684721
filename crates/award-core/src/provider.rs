// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::{RawTrip, SourceRecord};
use chrono::NaiveDate;
use thiserror::Error;

/// A single collaborator call that failed. Always absorbed by the pipeline.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("{name} rejected the request: {message}")]
    Rejected { name: String, message: String },
}

/// Per-source availability claims for a route.
pub trait AvailabilityProvider: Send + Sync {
    /// One record per (date, origin, destination, source) on or after `start`.
    fn availability(
        &self,
        route: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<SourceRecord>, FetchError>;

    /// True when the provider needs a credential it does not have.
    fn credential_missing(&self) -> bool {
        false
    }
}

/// Full trip detail for availability record ids of one source.
pub trait DetailFetcher: Send + Sync {
    fn fetch_trips(&self, source: &str, ids: &[String]) -> Result<Vec<RawTrip>, FetchError>;
}
