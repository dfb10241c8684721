// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::calendar::AvailabilityCalendar;
use crate::config::SearchConfig;
use crate::dedup::dedupe;
use crate::filter::options_from_trips;
use crate::generation::{GenerationToken, ResultSlot, Ticket};
use crate::itinerary::{ItinerarySearch, SearchOutcome};
use crate::model::{FlightOption, RawTrip, SourceRecord};
use crate::provider::{AvailabilityProvider, DetailFetcher, FetchError};
use crate::reconcile::Reconciler;
use crate::route::{Route, StopoverSpec};
use crate::window::{segment_window, DateRange, TimeWindow};
use crate::SearchError;
use award_policy::{Cabin, PricingTier, TrustPolicy};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// What the user asked for. `dates` is optional only so that a missing
/// range can be reported instead of silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub route: String,
    pub dates: Option<DateRange>,
    pub stopover: Option<StopoverSpec>,
}

impl SearchRequest {
    pub fn new(route: &str, dates: DateRange) -> Self {
        Self {
            route: route.to_string(),
            dates: Some(dates),
            stopover: None,
        }
    }

    pub fn with_stopover(mut self, stopover: StopoverSpec) -> Self {
        self.stopover = Some(stopover);
        self
    }
}

/// Everything resolved for one segment of the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentResult {
    pub index: usize,
    pub origin: String,
    pub destination: String,
    pub window: TimeWindow,
    pub calendar: AvailabilityCalendar,
    pub options: Vec<FlightOption>,
    /// Sources whose detail fetch failed and contributed nothing.
    pub failed_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    pub generation: u64,
    pub route: Route,
    pub stopover: Option<StopoverSpec>,
    pub segments: Vec<SegmentResult>,
    pub outcome: SearchOutcome,
}

impl SearchReport {
    pub fn options(&self) -> Vec<Vec<FlightOption>> {
        self.segments.iter().map(|s| s.options.clone()).collect()
    }

    /// Drops every flight and itinerary without a seat in `cabin`.
    pub fn restrict_to_cabin(&mut self, cabin: Cabin) {
        for segment in &mut self.segments {
            segment.options.retain(|o| o.cabins.get(cabin));
        }
        match &mut self.outcome {
            SearchOutcome::Itineraries { itineraries, .. } => {
                itineraries.retain(|it| it.offers(cabin))
            }
            SearchOutcome::Flattened(segments) => {
                for options in segments {
                    options.retain(|o| o.cabins.get(cabin));
                }
            }
        }
    }
}

/// Validated inputs shared by `run` and `calendars`.
struct Plan {
    route: Route,
    dates: DateRange,
    stopover: Option<StopoverSpec>,
}

/// Drives availability lookup, reconciliation, detail fetch and itinerary
/// assembly for one route. Segments resolve in order; detail fetches within a
/// segment run in parallel and are joined before the next segment starts.
pub struct SearchPipeline<'a> {
    provider: &'a dyn AvailabilityProvider,
    fetcher: &'a dyn DetailFetcher,
    policy: &'a TrustPolicy,
    pricing: &'a dyn PricingTier,
    config: SearchConfig,
    generation: GenerationToken,
    results: Arc<ResultSlot<SearchReport>>,
}

impl<'a> SearchPipeline<'a> {
    pub fn new(
        provider: &'a dyn AvailabilityProvider,
        fetcher: &'a dyn DetailFetcher,
        policy: &'a TrustPolicy,
    ) -> Self {
        Self {
            provider,
            fetcher,
            policy,
            pricing: policy,
            config: SearchConfig::default(),
            generation: GenerationToken::new(),
            results: Arc::new(ResultSlot::new()),
        }
    }

    pub fn with_pricing(mut self, pricing: &'a dyn PricingTier) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares a generation counter with other pipelines writing the same slot.
    pub fn with_generation(mut self, generation: GenerationToken) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_results(mut self, results: Arc<ResultSlot<SearchReport>>) -> Self {
        self.results = results;
        self
    }

    pub fn generation(&self) -> &GenerationToken {
        &self.generation
    }

    /// Latest published report; never older than one already observed.
    pub fn results(&self) -> Arc<ResultSlot<SearchReport>> {
        Arc::clone(&self.results)
    }

    fn plan(&self, request: &SearchRequest) -> Result<Plan, SearchError> {
        if self.provider.credential_missing() {
            return Err(SearchError::MissingCredential);
        }
        let dates = request.dates.ok_or(SearchError::MissingDateRange)?;
        let route = Route::parse(&request.route)?;
        if let Some(stopover) = &request.stopover {
            stopover.validate(&route)?;
        }
        Ok(Plan {
            route,
            dates,
            stopover: request.stopover.clone(),
        })
    }

    /// Runs a full search. Returns `Superseded` if a newer search began while
    /// this one was in flight; its result is then never published.
    pub fn run(&self, request: &SearchRequest) -> Result<SearchReport, SearchError> {
        let plan = self.plan(request)?;
        let ticket = self.generation.begin();
        info!(
            "Search started — generation={} route={} dates={}..{}",
            ticket.id(),
            plan.route,
            plan.dates.start,
            plan.dates.end
        );

        let mut segments: Vec<SegmentResult> = Vec::with_capacity(plan.route.segment_count());
        for index in 0..plan.route.segment_count() {
            let previous: &[FlightOption] =
                segments.last().map(|s| s.options.as_slice()).unwrap_or(&[]);
            let window = segment_window(
                index,
                &plan.dates,
                previous,
                &plan.route,
                plan.stopover.as_ref(),
            );
            let segment = self.resolve_segment(&ticket, &plan.route, index, window)?;
            segments.push(segment);
        }

        let per_segment: Vec<Vec<FlightOption>> =
            segments.iter().map(|s| s.options.clone()).collect();
        let outcome = ItinerarySearch::new(&plan.route, plan.stopover.as_ref())
            .with_rules(self.config.connection_rules())
            .with_max_results(self.config.max_itineraries)
            .assemble(&per_segment);
        ticket.ensure_current()?;

        let report = SearchReport {
            generation: ticket.id(),
            route: plan.route,
            stopover: plan.stopover,
            segments,
            outcome,
        };
        if !self.results.publish(&ticket, report.clone()) {
            return Err(SearchError::Superseded(ticket.id()));
        }
        info!(
            "Search finished — generation={} itineraries={} degraded={}",
            report.generation,
            report.outcome.itineraries().len(),
            report.outcome.is_degraded()
        );
        Ok(report)
    }

    /// Reconciled availability for every segment over the whole date range,
    /// without fetching trip detail.
    pub fn calendars(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<AvailabilityCalendar>, SearchError> {
        let plan = self.plan(request)?;
        let window = plan.dates.window();
        Ok((0..plan.route.segment_count())
            .filter_map(|index| plan.route.segment(index).map(|seg| (index, seg)))
            .map(|(index, (origin, destination))| {
                let records = self.query(origin, destination, &window);
                self.reconcile(index, origin, destination, &records)
            })
            .collect())
    }

    fn query(&self, origin: &str, destination: &str, window: &TimeWindow) -> Vec<SourceRecord> {
        let route = format!("{}-{}", origin, destination);
        match self.provider.availability(&route, Some(window.start.date())) {
            Ok(records) => records
                .into_iter()
                .filter(|r| window.contains_date(r.date))
                .collect(),
            Err(e) => {
                warn!("Availability unavailable — route={} error={}", route, e);
                Vec::new()
            }
        }
    }

    fn reconcile(
        &self,
        index: usize,
        origin: &str,
        destination: &str,
        records: &[SourceRecord],
    ) -> AvailabilityCalendar {
        let reconciler = Reconciler::new(self.policy, self.pricing);
        AvailabilityCalendar::from_records(
            index,
            origin,
            destination,
            reconciler.reconcile_all(records),
        )
    }

    fn resolve_segment(
        &self,
        ticket: &Ticket,
        route: &Route,
        index: usize,
        window: TimeWindow,
    ) -> Result<SegmentResult, SearchError> {
        let Some((origin, destination)) = route.segment(index) else {
            return Err(SearchError::InvalidRoute {
                route: route.to_string(),
                reason: format!("no segment {}", index),
            });
        };
        debug!(
            "Resolving segment — index={} {}-{} window={}..{}",
            index, origin, destination, window.start, window.end
        );

        let records = self.query(origin, destination, &window);
        ticket.ensure_current()?;
        let calendar = self.reconcile(index, origin, destination, &records);

        let mut requests: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in calendar.days.values() {
            for (source, ids) in record.detail_requests() {
                requests.entry(source).or_default().extend(ids);
            }
        }

        let fetcher = self.fetcher;
        let fetched: Vec<(String, Result<Vec<RawTrip>, FetchError>)> = requests
            .into_par_iter()
            .map(|(source, ids)| {
                let ids: Vec<String> = ids.into_iter().collect();
                let result = fetcher.fetch_trips(&source, &ids);
                (source, result)
            })
            .collect();
        ticket.ensure_current()?;

        let mut trips = Vec::new();
        let mut failed_sources = Vec::new();
        for (source, result) in fetched {
            match result {
                Ok(batch) => trips.extend(batch),
                Err(e) => {
                    warn!("Detail fetch failed — source={} error={}", source, e);
                    failed_sources.push(source);
                }
            }
        }

        let options = dedupe(options_from_trips(
            trips,
            index,
            origin,
            destination,
            self.policy,
        ));
        debug!(
            "Segment resolved — index={} dates={} options={} failed={}",
            index,
            calendar.days.len(),
            options.len(),
            failed_sources.len()
        );

        Ok(SegmentResult {
            index,
            origin: origin.to_string(),
            destination: destination.to_string(),
            window,
            calendar,
            options,
            failed_sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CabinClaim;
    use award_policy::Cabin;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct Fixed {
        records: Vec<SourceRecord>,
        missing_key: bool,
    }

    impl AvailabilityProvider for Fixed {
        fn availability(
            &self,
            route: &str,
            _start: Option<NaiveDate>,
        ) -> Result<Vec<SourceRecord>, FetchError> {
            Ok(self
                .records
                .iter()
                .filter(|r| format!("{}-{}", r.origin, r.destination) == route)
                .cloned()
                .collect())
        }

        fn credential_missing(&self) -> bool {
            self.missing_key
        }
    }

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl DetailFetcher for Recording {
        fn fetch_trips(&self, source: &str, ids: &[String]) -> Result<Vec<RawTrip>, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((source.to_string(), ids.to_vec()));
            Ok(Vec::new())
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn record(id: &str, source: &str, day: u32, airlines: &[&str]) -> SourceRecord {
        let mut cabins = BTreeMap::new();
        cabins.insert(
            Cabin::Economy,
            CabinClaim {
                available: true,
                direct: true,
                airlines: airlines.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            },
        );
        SourceRecord {
            id: id.into(),
            source: source.into(),
            date: d(day),
            origin: "SFO".into(),
            destination: "NRT".into(),
            distance: 5130,
            cabins,
        }
    }

    #[test]
    fn test_missing_inputs_block_before_fetch() {
        let policy = TrustPolicy::default();
        let fetcher = Recording::default();
        let provider = Fixed {
            records: vec![],
            missing_key: true,
        };
        let pipeline = SearchPipeline::new(&provider, &fetcher, &policy);
        let request = SearchRequest::new("SFO-NRT", DateRange::new(d(1), d(2)).unwrap());
        assert_eq!(pipeline.run(&request), Err(SearchError::MissingCredential));

        let provider = Fixed {
            records: vec![],
            missing_key: false,
        };
        let pipeline = SearchPipeline::new(&provider, &fetcher, &policy);
        let request = SearchRequest {
            route: "SFO-NRT".into(),
            dates: None,
            stopover: None,
        };
        assert_eq!(pipeline.run(&request), Err(SearchError::MissingDateRange));
        assert_eq!(pipeline.generation().current(), 0);
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_detail_requests_cover_every_contributor() {
        let policy = TrustPolicy::default();
        let fetcher = Recording::default();
        let provider = Fixed {
            records: vec![
                record("u-1", "united", 1, &["NH"]),
                record("a-1", "aeroplan", 1, &["NH"]),
                // Outside the requested range
                record("u-9", "united", 9, &["NH"]),
            ],
            missing_key: false,
        };
        let pipeline = SearchPipeline::new(&provider, &fetcher, &policy);
        let report = pipeline
            .run(&SearchRequest::new(
                "SFO-NRT",
                DateRange::new(d(1), d(2)).unwrap(),
            ))
            .unwrap();

        let mut calls = fetcher.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("aeroplan".to_string(), vec!["a-1".to_string()]),
                ("united".to_string(), vec!["u-1".to_string()]),
            ]
        );
        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.segments[0].calendar.open_dates(), vec![d(1)]);
        assert!(report.outcome.is_degraded());
        assert_eq!(pipeline.results().generation(), Some(report.generation));
    }
}
