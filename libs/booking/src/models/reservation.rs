//! Reservation model and status machine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::geo::Coordinates;
use crate::error::BookingError;

/// Lifecycle status of a reservation
///
/// Any status may be reassigned to any other by an administrator; see
/// [`ReservationStatus::is_conventional_transition`] for the advisory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    /// Storage/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    /// Customer-facing label
    pub fn label(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "접수대기",
            ReservationStatus::Confirmed => "예약확정",
            ReservationStatus::Completed => "작업완료",
            ReservationStatus::Cancelled => "취소됨",
        }
    }

    /// Whether `self -> to` follows the usual booking flow
    ///
    /// Advisory only. Re-setting the current status counts as conventional.
    pub fn is_conventional_transition(self, to: ReservationStatus) -> bool {
        use ReservationStatus::*;

        self == to
            || matches!(
                (self, to),
                (Pending, Confirmed)
                    | (Pending, Cancelled)
                    | (Confirmed, Completed)
                    | (Confirmed, Cancelled)
            )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s || status.label() == s)
            .ok_or_else(|| BookingError::Validation(format!("unknown reservation status: {}", s)))
    }
}

/// A customer's request for a service visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub location_name: String,
    pub coordinates: Coordinates,
    pub requested_date: NaiveDate,
    pub description: String,
    pub photo_urls: Vec<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

/// Reservation form as submitted by a customer, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub location_name: String,
    pub coordinates: Option<Coordinates>,
    pub requested_date: Option<NaiveDate>,
    pub description: String,
}

/// Validated reservation ready to be written; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub location_name: String,
    pub coordinates: Coordinates,
    pub requested_date: NaiveDate,
    pub description: String,
    pub photo_urls: Vec<String>,
    pub status: ReservationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_codes_and_labels() {
        assert_eq!(
            "CONFIRMED".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Confirmed
        );
        assert_eq!(
            "작업완료".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Completed
        );
        assert!("DONE".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&ReservationStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }

    #[test]
    fn test_conventional_transitions() {
        use ReservationStatus::*;

        assert!(Pending.is_conventional_transition(Confirmed));
        assert!(Confirmed.is_conventional_transition(Completed));
        assert!(Completed.is_conventional_transition(Completed));
        assert!(!Completed.is_conventional_transition(Pending));
        assert!(!Cancelled.is_conventional_transition(Confirmed));
        assert!(!Pending.is_conventional_transition(Completed));
    }
}
