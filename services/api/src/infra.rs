use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rental_ops::workflows::cleanings::CleaningAssignment;
use rental_ops::workflows::turnover::{
    Apartment, Reservation, Snapshot, SnapshotSource, SourceError,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Snapshot held in memory and swapped wholesale when a new export arrives.
#[derive(Default, Clone)]
pub(crate) struct InMemorySnapshotSource {
    snapshot: Arc<Mutex<Snapshot>>,
}

impl InMemorySnapshotSource {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub(crate) fn replace(&self, snapshot: Snapshot) -> Result<(), SourceError> {
        *self.lock()? = snapshot;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, SourceError> {
        self.snapshot
            .lock()
            .map_err(|_| SourceError::Unavailable("snapshot mutex poisoned".to_string()))
    }
}

impl SnapshotSource for InMemorySnapshotSource {
    fn apartments(&self) -> Result<Vec<Apartment>, SourceError> {
        Ok(self.lock()?.apartments.clone())
    }

    fn reservations(&self) -> Result<Vec<Reservation>, SourceError> {
        Ok(self.lock()?.reservations.clone())
    }

    fn cleanings(&self) -> Result<Vec<CleaningAssignment>, SourceError> {
        Ok(self.lock()?.cleanings.clone())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
