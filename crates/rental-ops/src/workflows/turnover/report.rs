use super::classifier::WindowStatus;
use super::dashboard::{DashboardEntry, EntryFailure, TimelineDashboard};
use super::domain::{ApartmentId, ReservationId};
use super::position::TimelineMarkers;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineRowView {
    pub apartment_id: ApartmentId,
    pub apartment_name: String,
    pub checkout_reservation: ReservationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_guest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_reservation: Option<ReservationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_guest: Option<String>,
    pub checkout_time: String,
    pub checkin_time: String,
    pub duration_minutes: i32,
    pub duration_formatted: String,
    pub status: WindowStatus,
    pub status_label: &'static str,
    pub is_late_checkout: bool,
    pub is_early_checkin: bool,
    pub markers: TimelineMarkers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TimelineRowView {
    fn from_entry(entry: &DashboardEntry) -> Self {
        let window = &entry.cleaning_window;
        Self {
            apartment_id: entry.apartment.id.clone(),
            apartment_name: entry.apartment.name.clone(),
            checkout_reservation: entry.checkout_reservation.id.clone(),
            checkout_guest: entry.checkout_reservation.guest_name.clone(),
            checkin_reservation: entry.checkin_reservation.as_ref().map(|r| r.id.clone()),
            checkin_guest: entry
                .checkin_reservation
                .as_ref()
                .and_then(|r| r.guest_name.clone()),
            checkout_time: window.start_time.to_string(),
            checkin_time: window.end_time.to_string(),
            duration_minutes: window.duration_minutes,
            duration_formatted: window.duration_formatted.clone(),
            status: window.status,
            status_label: window.status.label(),
            is_late_checkout: entry.is_late_checkout,
            is_early_checkin: entry.is_early_checkin,
            markers: TimelineMarkers::for_window(window),
            warnings: entry.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureView {
    pub apartment_id: ApartmentId,
    pub apartment_name: String,
    pub checkout_reservation: ReservationId,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl FailureView {
    fn from_failure(failure: &EntryFailure) -> Self {
        Self {
            apartment_id: failure.apartment.id.clone(),
            apartment_name: failure.apartment.name.clone(),
            checkout_reservation: failure.checkout_reservation_id.clone(),
            detail: failure.error.to_string(),
            warnings: failure.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub date: NaiveDate,
    pub checkouts: usize,
    pub normal: usize,
    pub critical: usize,
    pub invalid: usize,
    pub late_checkouts: usize,
    pub early_checkins: usize,
    pub rows: Vec<TimelineRowView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureView>,
}

impl DashboardSummary {
    pub fn needs_attention(&self) -> bool {
        self.critical + self.invalid + self.failures.len() > 0
    }
}

impl TimelineDashboard {
    pub fn summary(&self) -> DashboardSummary {
        let count = |status: WindowStatus| {
            self.apartments
                .iter()
                .filter(|entry| entry.cleaning_window.status == status)
                .count()
        };

        DashboardSummary {
            date: self.date,
            checkouts: self.apartments.len() + self.failures.len(),
            normal: count(WindowStatus::Normal),
            critical: count(WindowStatus::Critical),
            invalid: count(WindowStatus::Invalid),
            late_checkouts: self
                .apartments
                .iter()
                .filter(|entry| entry.is_late_checkout)
                .count(),
            early_checkins: self
                .apartments
                .iter()
                .filter(|entry| entry.is_early_checkin)
                .count(),
            rows: self.apartments.iter().map(TimelineRowView::from_entry).collect(),
            failures: self.failures.iter().map(FailureView::from_failure).collect(),
        }
    }
}
