// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::itinerary::Itinerary;
use crate::model::FlightOption;
use anyhow::Result;
use std::io::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn write_flight<W: Write>(
    wtr: &mut csv::Writer<W>,
    itinerary: &str,
    f: &FlightOption,
) -> Result<()> {
    let row: [String; 11] = [
        itinerary.to_string(),
        f.segment_index.to_string(),
        f.flight_number.clone(),
        f.origin.clone(),
        f.destination.clone(),
        f.departs_at.format(TIME_FORMAT).to_string(),
        f.arrives_at.format(TIME_FORMAT).to_string(),
        f.duration_minutes.to_string(),
        f.aircraft.clone(),
        f.cabins.to_string(),
        f.sources.join(" "),
    ];
    wtr.write_record(&row)?;
    Ok(())
}

const HEADER: [&str; 11] = [
    "itinerary",
    "segment",
    "flight",
    "origin",
    "destination",
    "departs",
    "arrives",
    "minutes",
    "aircraft",
    "cabins",
    "sources",
];

/// One row per flight, numbered by itinerary (1-based).
pub fn itineraries_to_csv<W: Write>(writer: W, itineraries: &[Itinerary]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for (n, itinerary) in itineraries.iter().enumerate() {
        let label = (n + 1).to_string();
        for flight in &itinerary.flights {
            write_flight(&mut wtr, &label, flight)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Degraded view: every option by segment, itinerary column left empty.
pub fn options_to_csv<W: Write>(writer: W, segments: &[Vec<FlightOption>]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for flight in segments.iter().flatten() {
        write_flight(&mut wtr, "", flight)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CabinFlags;
    use award_policy::Cabin;
    use chrono::NaiveDate;

    #[test]
    fn test_csv_rows() {
        let day = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let flight = FlightOption {
            flight_number: "NH7".into(),
            origin: "SFO".into(),
            destination: "NRT".into(),
            departs_at: day.and_hms_opt(11, 0, 0).unwrap(),
            arrives_at: day.succ_opt().unwrap().and_hms_opt(15, 0, 0).unwrap(),
            duration_minutes: 660,
            aircraft: "Boeing 787-9".into(),
            cabins: CabinFlags::only(Cabin::Business),
            distance: 5130,
            segment_index: 0,
            sources: vec!["aeroplan".into(), "united".into()],
        };
        let mut out = Vec::new();
        itineraries_to_csv(
            &mut out,
            &[Itinerary {
                flights: vec![flight],
            }],
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("itinerary,segment,flight"));
        assert_eq!(
            lines[1],
            "1,0,NH7,SFO,NRT,2026-11-01 11:00,2026-11-02 15:00,660,Boeing 787-9,--J-,aeroplan united"
        );
    }
}
