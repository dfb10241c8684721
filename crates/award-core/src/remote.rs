// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::{RawTrip, SourceRecord};
use crate::provider::{AvailabilityProvider, DetailFetcher, FetchError};
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const AUTH_HEADER: &str = "Partner-Authorization";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Blocking JSON client for a partner availability API.
#[derive(Debug, Clone)]
pub struct PartnerClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl PartnerClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    /// `base_url` plus percent-encoded path segments and query pairs.
    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, FetchError> {
        let invalid = |message: String| FetchError::InvalidUrl {
            url: self.base_url.clone(),
            message,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, FetchError> {
        let url = self.url(segments, query)?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, &self.api_key)
            .send()?
            .error_for_status()?;
        let envelope: Envelope<T> = response.json()?;
        Ok(envelope.data)
    }
}

#[derive(Debug, Clone)]
pub struct HttpAvailabilityProvider {
    client: PartnerClient,
}

impl HttpAvailabilityProvider {
    pub fn new(client: PartnerClient) -> Self {
        Self { client }
    }
}

impl AvailabilityProvider for HttpAvailabilityProvider {
    fn availability(
        &self,
        route: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<SourceRecord>, FetchError> {
        let start = start.map(|s| s.format("%Y-%m-%d").to_string());
        let mut query = vec![("route", route)];
        if let Some(start) = start.as_deref() {
            query.push(("start_date", start));
        }
        let records: Vec<SourceRecord> = self.client.get(&["availability"], &query)?;
        info!(
            "Fetched availability — route={} records={}",
            route,
            records.len()
        );
        Ok(records)
    }

    fn credential_missing(&self) -> bool {
        self.client.api_key.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct HttpDetailFetcher {
    client: PartnerClient,
}

impl HttpDetailFetcher {
    pub fn new(client: PartnerClient) -> Self {
        Self { client }
    }
}

impl DetailFetcher for HttpDetailFetcher {
    fn fetch_trips(&self, source: &str, ids: &[String]) -> Result<Vec<RawTrip>, FetchError> {
        let mut trips = Vec::new();
        for id in ids {
            let batch: Vec<RawTrip> = self
                .client
                .get(&["trips", id.as_str()], &[("source", source)])?;
            trips.extend(batch);
        }
        debug!(
            "Fetched trips — source={} ids={} trips={}",
            source,
            ids.len(),
            trips.len()
        );
        Ok(trips)
    }
}
