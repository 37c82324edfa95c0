use serde::{Deserialize, Serialize};

use crate::models::FlightStatus;

/// Edge trigger: notify on entering Delayed or Cancelled, never on reconfirmation.
pub fn should_notify(prev: FlightStatus, new: FlightStatus) -> bool {
    (new == FlightStatus::Delayed && prev != FlightStatus::Delayed)
        || (new == FlightStatus::Cancelled && prev != FlightStatus::Cancelled)
}

/// When a flight's `notification_sent` flag is cleared again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RearmPolicy {
    /// Flag stays set for the flight's lifetime: one notification per flight.
    #[default]
    Never,
    /// A Delayed flight that recovers to Scheduled or In Air can notify again.
    OnRecovery,
}

impl RearmPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "never" => Some(RearmPolicy::Never),
            "on_recovery" | "on-recovery" => Some(RearmPolicy::OnRecovery),
            _ => None,
        }
    }

    pub fn should_rearm(&self, prev: FlightStatus, new: FlightStatus) -> bool {
        match self {
            RearmPolicy::Never => false,
            RearmPolicy::OnRecovery => {
                prev == FlightStatus::Delayed
                    && matches!(new, FlightStatus::Scheduled | FlightStatus::InAir)
            }
        }
    }
}
