// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use award_core::itinerary::{ItinerarySearch, SearchOutcome};
use award_core::model::{CabinFlags, FlightOption};
use award_core::route::{Route, StopoverSpec};
use award_core::Cabin;
use chrono::{NaiveDate, NaiveDateTime};

fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 11, day)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn flight(
    number: &str,
    from: &str,
    to: &str,
    departs: NaiveDateTime,
    arrives: NaiveDateTime,
    seg: usize,
) -> FlightOption {
    FlightOption {
        flight_number: number.into(),
        origin: from.into(),
        destination: to.into(),
        departs_at: departs,
        arrives_at: arrives,
        duration_minutes: (arrives - departs).num_minutes() as u32,
        aircraft: String::new(),
        cabins: CabinFlags::only(Cabin::Economy),
        distance: 0,
        segment_index: seg,
        sources: vec!["united".into()],
    }
}

/// A->B arriving 10:00 and 14:00 on day 1.
fn first_leg() -> Vec<FlightOption> {
    vec![
        flight("AB100", "AAA", "BBB", at(1, 7, 0), at(1, 10, 0), 0),
        flight("AB200", "AAA", "BBB", at(1, 11, 0), at(1, 14, 0), 0),
    ]
}

/// B->C departing 10:40 and 15:10 on `day`.
fn second_leg(day: u32) -> Vec<FlightOption> {
    vec![
        flight("BC300", "BBB", "CCC", at(day, 10, 40), at(day, 12, 0), 1),
        flight("BC400", "BBB", "CCC", at(day, 15, 10), at(day, 17, 0), 1),
    ]
}

fn numbers(outcome: &SearchOutcome) -> Vec<Vec<String>> {
    outcome
        .itineraries()
        .iter()
        .map(|it| it.flights.iter().map(|f| f.flight_number.clone()).collect())
        .collect()
}

#[test]
fn test_same_day_connections_without_stopover() {
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let outcome = ItinerarySearch::new(&route, None).assemble(&[first_leg(), second_leg(1)]);

    let mut found = numbers(&outcome);
    found.sort();
    assert_eq!(
        found,
        vec![
            vec!["AB100".to_string(), "BC300".to_string()],
            vec!["AB100".to_string(), "BC400".to_string()],
            vec!["AB200".to_string(), "BC400".to_string()],
        ]
    );
    for itinerary in outcome.itineraries() {
        for gap in itinerary.connections() {
            assert!((30..=1440).contains(&gap), "connection {} out of bounds", gap);
        }
    }
}

#[test]
fn test_two_day_stopover_rejects_same_day_departures() {
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let stopover = StopoverSpec::new("BBB", 2);
    let outcome =
        ItinerarySearch::new(&route, Some(&stopover)).assemble(&[first_leg(), second_leg(1)]);

    assert!(outcome.itineraries().is_empty());
    // Nothing connects, so both segments are offered unfiltered
    match outcome {
        SearchOutcome::Flattened(segments) => {
            assert_eq!(segments.len(), 2);
            assert_eq!(segments[1].len(), 2);
        }
        other => panic!("expected flattened view, got {:?}", other),
    }
}

#[test]
fn test_two_day_stopover_accepts_departure_two_days_later() {
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let stopover = StopoverSpec::new("BBB", 2);
    let outcome =
        ItinerarySearch::new(&route, Some(&stopover)).assemble(&[first_leg(), second_leg(3)]);

    // 10:00 -> +2d 10:40 is 2920 minutes; 14:00 -> +2d 10:40 is 2680, short of 2880.
    // The +2d 15:10 departure is 3190 and 2950 minutes away, so both arrivals reach it.
    let mut found = numbers(&outcome);
    found.sort();
    assert_eq!(
        found,
        vec![
            vec!["AB100".to_string(), "BC300".to_string()],
            vec!["AB100".to_string(), "BC400".to_string()],
            vec!["AB200".to_string(), "BC400".to_string()],
        ]
    );
    for itinerary in outcome.itineraries() {
        let gap = itinerary.connections()[0];
        assert!((2880..=4320).contains(&gap), "connection {} out of bounds", gap);
    }
}

#[test]
fn test_stopover_only_applies_at_its_junction() {
    let route = Route::parse("AAA-BBB-CCC-DDD").unwrap();
    let stopover = StopoverSpec::new("CCC", 1);
    let third = vec![flight("CD500", "CCC", "DDD", at(2, 13, 0), at(2, 16, 0), 2)];
    let outcome = ItinerarySearch::new(&route, Some(&stopover)).assemble(&[
        first_leg(),
        second_leg(1),
        third,
    ]);

    // BC300 lands 12:00 day 1, CD500 leaves 13:00 day 2: 1500 minutes, inside [1440, 2880]
    let found = numbers(&outcome);
    assert!(found.contains(&vec![
        "AB100".to_string(),
        "BC300".to_string(),
        "CD500".to_string()
    ]));
    // BC400 lands 17:00 day 1: 1200 minutes, too short for a one-day stopover
    assert!(found.iter().all(|path| path[1] != "BC400"));
}

#[test]
fn test_empty_segment_is_skipped() {
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let outcome = ItinerarySearch::new(&route, None).assemble(&[first_leg(), Vec::new()]);

    assert_eq!(outcome.itineraries().len(), 2);
    assert!(outcome.itineraries().iter().all(|it| it.flights.len() == 1));
}

#[test]
fn test_cap_marks_truncation() {
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let outcome = ItinerarySearch::new(&route, None)
        .with_max_results(2)
        .assemble(&[first_leg(), second_leg(1)]);

    match outcome {
        SearchOutcome::Itineraries {
            itineraries,
            truncated,
        } => {
            assert_eq!(itineraries.len(), 2);
            assert!(truncated);
        }
        other => panic!("expected itineraries, got {:?}", other),
    }
}
