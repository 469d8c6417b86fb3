use super::classifier::CleaningPolicy;
use super::dashboard::{DashboardEntry, EntryFailure, TimelineDashboard};
use super::domain::{
    Apartment, ApartmentId, ClockTime, Reservation, ScheduleSlot, TurnoverError,
};
use super::index::ReservationIndex;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Dashboards default to the day after the caller's current date.
pub fn default_target_date(today: NaiveDate) -> NaiveDate {
    today.succ_opt().unwrap_or(today)
}

/// Builds the per-apartment checkout/check-in dashboard for a single day.
#[derive(Debug, Clone, Default)]
pub struct TimelineAssembler {
    policy: CleaningPolicy,
}

impl TimelineAssembler {
    pub fn new(policy: CleaningPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CleaningPolicy {
        &self.policy
    }

    /// Only active apartments with a checkout on `date` produce an entry.
    /// Entries come out ordered by apartment name, then id. A malformed time
    /// on one reservation lands in `failures` instead of aborting the batch.
    pub fn assemble(
        &self,
        date: NaiveDate,
        apartments: &[Apartment],
        index: &ReservationIndex,
    ) -> TimelineDashboard {
        let mut active: Vec<&Apartment> = apartments.iter().filter(|apt| apt.active).collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        // First row per id in sorted order wins, wherever the duplicate sits.
        let mut seen = HashSet::with_capacity(active.len());
        active.retain(|&apt| seen.insert(&apt.id));

        report_unknown_apartments(date, &active, index);

        let mut dashboard = TimelineDashboard::empty(date);
        for apartment in active {
            let Some(checkout) = index.find_checkout(&apartment.id, date) else {
                continue;
            };
            let checkin = index.find_checkin(&apartment.id, date);
            let warnings = ambiguity_warnings(index, &apartment.id, date);
            for warning in &warnings {
                warn!(apartment = %apartment.id, %warning, "ambiguous turnover schedule");
            }

            match self.entry_for(apartment, checkout, checkin) {
                Ok(mut entry) => {
                    entry.warnings = warnings;
                    debug!(
                        apartment = %apartment.id,
                        checkout = %entry.cleaning_window.start_time,
                        checkin = %entry.cleaning_window.end_time,
                        status = entry.cleaning_window.status.label(),
                        "turnover entry built"
                    );
                    dashboard.apartments.push(entry);
                }
                Err(error) => {
                    warn!(apartment = %apartment.id, reservation = %checkout.id, %error, "turnover entry skipped");
                    dashboard.failures.push(EntryFailure {
                        apartment: apartment.clone(),
                        checkout_reservation_id: checkout.id.clone(),
                        error,
                        warnings,
                    });
                }
            }
        }

        info!(
            %date,
            entries = dashboard.apartments.len(),
            failures = dashboard.failures.len(),
            "turnover dashboard assembled"
        );
        dashboard
    }

    fn entry_for(
        &self,
        apartment: &Apartment,
        checkout: &Reservation,
        checkin: Option<&Reservation>,
    ) -> Result<DashboardEntry, TurnoverError> {
        let checkout_time = resolve_time(
            checkout.planned_checkout_time.as_deref(),
            self.policy.checkout_default,
        )?;
        let checkin_time = resolve_time(
            checkin.and_then(|reservation| reservation.planned_arrival_time.as_deref()),
            self.policy.checkin_default,
        )?;

        let cleaning_window = self.policy.classify(checkout_time, checkin_time);

        Ok(DashboardEntry {
            apartment: apartment.clone(),
            checkout_reservation: checkout.clone(),
            checkin_reservation: checkin.cloned(),
            cleaning_window,
            is_late_checkout: checkout_time.hour() > self.policy.checkout_default.hour(),
            is_early_checkin: checkin_time.hour() < self.policy.checkin_default.hour(),
            warnings: Vec::new(),
        })
    }
}

fn resolve_time(raw: Option<&str>, fallback: ClockTime) -> Result<ClockTime, TurnoverError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => ClockTime::parse(value),
        None => Ok(fallback),
    }
}

fn ambiguity_warnings(
    index: &ReservationIndex,
    apartment_id: &ApartmentId,
    date: NaiveDate,
) -> Vec<TurnoverError> {
    let sides = [
        (
            ScheduleSlot::Checkout,
            index.find_checkout(apartment_id, date),
            index.checkout_conflicts(apartment_id, date),
        ),
        (
            ScheduleSlot::Checkin,
            index.find_checkin(apartment_id, date),
            index.checkin_conflicts(apartment_id, date),
        ),
    ];

    sides
        .into_iter()
        .filter_map(|(slot, chosen, losers)| {
            let chosen = chosen?;
            if losers.is_empty() {
                return None;
            }
            Some(TurnoverError::AmbiguousSchedule {
                apartment_id: apartment_id.clone(),
                date,
                slot,
                chosen: chosen.id.clone(),
                contenders: losers.into_iter().map(|r| r.id.clone()).collect(),
            })
        })
        .collect()
}

fn report_unknown_apartments(date: NaiveDate, active: &[&Apartment], index: &ReservationIndex) {
    let known: HashSet<&ApartmentId> = active.iter().map(|apt| &apt.id).collect();
    for reservation in index.reservations_on(date) {
        if known.contains(&reservation.apartment_id) {
            continue;
        }
        let error = TurnoverError::MissingApartmentReference {
            reservation_id: reservation.id.clone(),
            apartment_id: reservation.apartment_id.clone(),
        };
        debug!(%error, "reservation ignored for scheduling");
    }
}
