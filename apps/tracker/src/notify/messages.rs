use chrono::{DateTime, Utc};

use crate::models::{Flight, FlightStatus};

/// e.g. "Mar 5, 02:35 PM" (UTC).
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %I:%M %p").to_string()
}

pub fn subject(flight: &Flight) -> String {
    format!("Flight {} {}", flight.flight_number, flight.status)
}

/// Text sent to each passenger on the flight.
pub fn passenger_message(flight: &Flight) -> String {
    match flight.status {
        FlightStatus::Delayed => format!(
            "Flight Update: Your flight {} from {} to {} is delayed by {} minutes. New departure time: {}.",
            flight.flight_number,
            flight.departure_airport,
            flight.arrival_airport,
            flight.delay_minutes,
            format_datetime(flight.estimated_departure()),
        ),
        FlightStatus::Cancelled => format!(
            "Flight Alert: Your flight {} from {} to {} scheduled for {} has been cancelled. Please contact your airline for rebooking options.",
            flight.flight_number,
            flight.departure_airport,
            flight.arrival_airport,
            format_datetime(flight.scheduled_departure),
        ),
        other => format!(
            "Flight Update: Your flight {} from {} to {} is now {}.",
            flight.flight_number, flight.departure_airport, flight.arrival_airport, other,
        ),
    }
}

/// Summary for the administrator, including how many passengers are affected.
pub fn admin_summary(flight: &Flight, passenger_count: usize) -> String {
    match flight.status {
        FlightStatus::Delayed => format!(
            "ALERT: Flight {} ({} to {}) with {} passengers is delayed by {} minutes. New departure: {}.",
            flight.flight_number,
            flight.departure_airport,
            flight.arrival_airport,
            passenger_count,
            flight.delay_minutes,
            format_datetime(flight.estimated_departure()),
        ),
        FlightStatus::Cancelled => format!(
            "ALERT: Flight {} ({} to {}) with {} passengers has been CANCELLED. Originally scheduled for {}.",
            flight.flight_number,
            flight.departure_airport,
            flight.arrival_airport,
            passenger_count,
            format_datetime(flight.scheduled_departure),
        ),
        other => format!(
            "UPDATE: Flight {} ({} to {}) with {} passengers is now {}.",
            flight.flight_number,
            flight.departure_airport,
            flight.arrival_airport,
            passenger_count,
            other,
        ),
    }
}
