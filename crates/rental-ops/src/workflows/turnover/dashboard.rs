use super::classifier::CleaningWindow;
use super::domain::{Apartment, Reservation, ReservationId, TurnoverError};
use chrono::NaiveDate;
use serde::Serialize;

/// One apartment turning over on the dashboard date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardEntry {
    pub apartment: Apartment,
    pub checkout_reservation: Reservation,
    pub checkin_reservation: Option<Reservation>,
    pub cleaning_window: CleaningWindow,
    pub is_late_checkout: bool,
    pub is_early_checkin: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TurnoverError>,
}

/// An apartment whose entry could not be built. The rest of the dashboard is
/// unaffected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryFailure {
    pub apartment: Apartment,
    pub checkout_reservation_id: ReservationId,
    pub error: TurnoverError,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TurnoverError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineDashboard {
    pub date: NaiveDate,
    pub apartments: Vec<DashboardEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<EntryFailure>,
}

impl TimelineDashboard {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            apartments: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}
