use chrono::{DateTime, Duration, Utc};

use crate::models::Flight;

/// How long a flight's last-known status may be trusted, tiered by hours to
/// departure. Each threshold is a hard edge; departures already in the past
/// fall into the slowest tier.
pub fn cache_expiry(hours_to_departure: f64) -> Duration {
    if hours_to_departure < 0.0 || hours_to_departure.is_nan() {
        Duration::hours(2)
    } else if hours_to_departure < 2.0 {
        Duration::minutes(5)
    } else if hours_to_departure < 6.0 {
        Duration::minutes(15)
    } else if hours_to_departure < 24.0 {
        Duration::minutes(30)
    } else {
        Duration::hours(2)
    }
}

/// A flight is due when it has never been checked or its cache window has elapsed.
pub fn is_due(flight: &Flight, now: DateTime<Utc>) -> bool {
    match flight.last_checked {
        None => true,
        Some(last) => now - last >= cache_expiry(flight.hours_to_departure(now)),
    }
}
