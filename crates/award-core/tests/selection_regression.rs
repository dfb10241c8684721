// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use award_core::itinerary::ItinerarySearch;
use award_core::model::{CabinFlags, FlightKey, FlightOption};
use award_core::route::Route;
use award_core::selection::{Selection, SelectionValidator, SuppressionSet, VisibilityController};
use award_core::Cabin;
use chrono::{NaiveDate, NaiveDateTime};

fn at(hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 11, 1)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn flight(number: &str, seg: usize, departs: NaiveDateTime, arrives: NaiveDateTime) -> FlightOption {
    FlightOption {
        flight_number: number.into(),
        origin: if seg == 0 { "AAA" } else { "BBB" }.into(),
        destination: if seg == 0 { "BBB" } else { "CCC" }.into(),
        departs_at: departs,
        arrives_at: arrives,
        duration_minutes: (arrives - departs).num_minutes() as u32,
        aircraft: String::new(),
        cabins: CabinFlags::only(Cabin::Business),
        distance: 0,
        segment_index: seg,
        sources: vec!["aeroplan".into()],
    }
}

fn displayed() -> Vec<Vec<FlightOption>> {
    vec![
        vec![
            flight("AB100", 0, at(7, 0), at(10, 0)),
            flight("AB200", 0, at(11, 0), at(14, 0)),
        ],
        vec![
            flight("BC300", 1, at(10, 40), at(12, 0)),
            flight("BC400", 1, at(15, 10), at(17, 0)),
        ],
    ]
}

/// Records every call so the order of instructions can be checked.
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

impl VisibilityController for Recorder {
    fn show(&mut self, key: &FlightKey) {
        self.calls.push(format!("show {}", key.flight_number));
    }

    fn hide(&mut self, key: &FlightKey) {
        self.calls.push(format!("hide {}", key.flight_number));
    }

    fn reset(&mut self) {
        self.calls.push("reset".to_string());
    }
}

#[test]
fn test_toggle_never_hides_the_toggled_flight() {
    let segments = displayed();
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let outcome = ItinerarySearch::new(&route, None).assemble(&segments);
    let validator = SelectionValidator::new(outcome.itineraries());
    let flat: Vec<FlightOption> = segments.iter().flatten().cloned().collect();

    for option in &flat {
        let mut selection = Selection::new();
        assert!(selection.toggle(option));
        let mut hidden = SuppressionSet::default();
        validator.apply(&selection, &flat, &mut hidden);
        assert!(
            !hidden.is_hidden(&option.key()),
            "{} hid itself",
            option.flight_number
        );
    }
}

#[test]
fn test_selection_narrows_then_clear_restores() {
    let segments = displayed();
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let outcome = ItinerarySearch::new(&route, None).assemble(&segments);
    let validator = SelectionValidator::new(outcome.itineraries());
    let flat: Vec<FlightOption> = segments.iter().flatten().cloned().collect();

    let mut hidden = SuppressionSet::default();
    let mut selection = Selection::new();

    // AB200 lands at 14:00 and only connects to BC400
    selection.toggle(&segments[0][1]);
    validator.apply(&selection, &flat, &mut hidden);
    let names: Vec<&str> = hidden
        .hidden()
        .iter()
        .map(|k| k.flight_number.as_str())
        .collect();
    assert_eq!(names, vec!["AB100", "BC300"]);
    assert_eq!(validator.valid_combos(&selection).len(), 1);

    // Toggling it again deselects
    assert!(!selection.toggle(&segments[0][1]));
    assert!(selection.is_empty());
    validator.apply(&selection, &flat, &mut hidden);
    assert!(hidden.hidden().is_empty());

    // Two picks, then clear
    selection.toggle(&segments[0][0]);
    selection.toggle(&segments[1][1]);
    validator.apply(&selection, &flat, &mut hidden);
    assert_eq!(
        hidden.hidden().iter().map(|k| k.flight_number.as_str()).collect::<Vec<_>>(),
        vec!["AB200", "BC300"]
    );
    selection.clear();
    validator.apply(&selection, &flat, &mut hidden);
    assert!(flat.iter().all(|f| !hidden.is_hidden(&f.key())));
}

#[test]
fn test_controller_receives_one_instruction_per_flight() {
    let segments = displayed();
    let route = Route::parse("AAA-BBB-CCC").unwrap();
    let outcome = ItinerarySearch::new(&route, None).assemble(&segments);
    let validator = SelectionValidator::new(outcome.itineraries());
    let flat: Vec<FlightOption> = segments.iter().flatten().cloned().collect();

    let mut recorder = Recorder::default();
    validator.apply(&Selection::new(), &flat, &mut recorder);
    assert_eq!(recorder.calls, vec!["reset"]);

    let mut selection = Selection::new();
    selection.toggle(&segments[1][0]);
    let mut recorder = Recorder::default();
    validator.apply(&selection, &flat, &mut recorder);
    assert_eq!(
        recorder.calls,
        vec!["show AB100", "hide AB200", "show BC300", "hide BC400"]
    );
}
