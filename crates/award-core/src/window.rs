// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::FlightOption;
use crate::route::{Route, StopoverSpec};
use crate::SearchError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The user's selected travel dates, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SearchError> {
        if start > end {
            return Err(SearchError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: start_of_day(self.start),
            end: end_of_day(self.end),
        }
    }
}

/// Closed interval of local instants to query for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Calendar dates whose day overlaps the window.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut day = self.start.date();
        while day <= self.end.date() {
            dates.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        dates
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start.date() && date <= self.end.date()
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1) - Duration::seconds(1)
}

/// Query window for `segment_index`, given the resolved options of the previous segment.
pub fn segment_window(
    segment_index: usize,
    range: &DateRange,
    previous: &[FlightOption],
    route: &Route,
    stopover: Option<&StopoverSpec>,
) -> TimeWindow {
    if segment_index == 0 {
        return range.window();
    }

    let earliest = previous.iter().map(|o| o.arrives_at).min();
    let latest = previous.iter().map(|o| o.arrives_at).max();
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return range.window();
    };

    let offset = match (route.junction(segment_index), stopover) {
        (Some(junction), Some(s)) if s.is_at(junction) => Duration::days(i64::from(s.days)),
        _ => Duration::zero(),
    };

    TimeWindow {
        start: earliest + offset,
        end: latest + offset + Duration::hours(24),
    }
}
