// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::model::{CabinFlags, FlightOption, RawTrip};
use award_policy::TrustPolicy;
use log::debug;

/// Drops trips the policy refuses (stops, excluded carriers, fare classes)
/// and trips that do not fly the requested segment. Exclusion is silent.
pub fn screen_trips(
    trips: Vec<RawTrip>,
    origin: &str,
    destination: &str,
    policy: &TrustPolicy,
) -> Vec<RawTrip> {
    let before = trips.len();
    let kept: Vec<RawTrip> = trips
        .into_iter()
        .filter(|t| {
            if !t.origin.eq_ignore_ascii_case(origin)
                || !t.destination.eq_ignore_ascii_case(destination)
            {
                debug!(
                    "Dropping off-route trip — id={} route={}-{} wanted={}-{}",
                    t.id, t.origin, t.destination, origin, destination
                );
                return false;
            }
            match policy.screen_trip(&t.carrier, t.stops, &t.fare_class) {
                Some(reason) => {
                    debug!(
                        "Dropping trip — id={} flight={} source={} reason={:?}",
                        t.id, t.flight_number, t.source, reason
                    );
                    false
                }
                None => true,
            }
        })
        .collect();
    debug!(
        "screen_trips — segment={}-{} kept={} dropped={}",
        origin,
        destination,
        kept.len(),
        before - kept.len()
    );
    kept
}

/// A trip carries one cabin; duplicates across cabins are merged later.
pub fn to_option(trip: RawTrip, segment_index: usize) -> FlightOption {
    let duration_minutes = if trip.duration_minutes > 0 {
        trip.duration_minutes
    } else {
        // Local times only, so this is a best effort when the feed omits duration
        (trip.arrives_at - trip.departs_at).num_minutes().max(0) as u32
    };
    FlightOption {
        flight_number: trip.flight_number.trim().to_ascii_uppercase(),
        origin: trip.origin.to_ascii_uppercase(),
        destination: trip.destination.to_ascii_uppercase(),
        departs_at: trip.departs_at,
        arrives_at: trip.arrives_at,
        duration_minutes,
        aircraft: trip.aircraft,
        cabins: CabinFlags::only(trip.cabin),
        distance: trip.distance,
        segment_index,
        sources: vec![trip.source],
    }
}

pub fn options_from_trips(
    trips: Vec<RawTrip>,
    segment_index: usize,
    origin: &str,
    destination: &str,
    policy: &TrustPolicy,
) -> Vec<FlightOption> {
    screen_trips(trips, origin, destination, policy)
        .into_iter()
        .map(|t| to_option(t, segment_index))
        .collect()
}
