// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::CanonicalRecord;
use award_policy::Cabin;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reconciled availability for one segment, keyed by date.
/// A missing date means no source had data for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCalendar {
    pub segment_index: usize,
    pub origin: String,
    pub destination: String,
    pub days: BTreeMap<NaiveDate, CanonicalRecord>,
}

impl AvailabilityCalendar {
    pub fn new(segment_index: usize, origin: &str, destination: &str) -> Self {
        Self {
            segment_index,
            origin: origin.to_string(),
            destination: destination.to_string(),
            days: BTreeMap::new(),
        }
    }

    pub fn from_records(
        segment_index: usize,
        origin: &str,
        destination: &str,
        records: Vec<CanonicalRecord>,
    ) -> Self {
        let mut calendar = Self::new(segment_index, origin, destination);
        for record in records {
            calendar.days.insert(record.date, record);
        }
        calendar
    }

    pub fn record(&self, date: NaiveDate) -> Option<&CanonicalRecord> {
        self.days.get(&date)
    }

    pub fn has_direct(&self, date: NaiveDate, cabin: Cabin) -> bool {
        self.record(date).map(|r| r.is_direct(cabin)).unwrap_or(false)
    }

    pub fn direct_dates(&self, cabin: Cabin) -> Vec<NaiveDate> {
        self.days
            .values()
            .filter(|r| r.is_direct(cabin))
            .map(|r| r.date)
            .collect()
    }

    /// Dates with direct availability in at least one cabin.
    pub fn open_dates(&self) -> Vec<NaiveDate> {
        self.days
            .values()
            .filter(|r| r.any_direct())
            .map(|r| r.date)
            .collect()
    }
}
