use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::assembler::TimelineAssembler;
use super::classifier::CleaningPolicy;
use super::dashboard::TimelineDashboard;
use super::domain::{Apartment, Reservation};
use super::index::ReservationIndex;
use crate::workflows::cleanings::{my_cleanings, CleaningAssignment, CleaningStatus};

/// Read-only view onto whatever persistence layer owns inventory and bookings.
pub trait SnapshotSource: Send + Sync {
    fn apartments(&self) -> Result<Vec<Apartment>, SourceError>;
    fn reservations(&self) -> Result<Vec<Reservation>, SourceError>;
    fn cleanings(&self) -> Result<Vec<CleaningAssignment>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
}

/// A fully materialised snapshot, e.g. loaded from CSV exports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub apartments: Vec<Apartment>,
    pub reservations: Vec<Reservation>,
    #[serde(default)]
    pub cleanings: Vec<CleaningAssignment>,
}

impl SnapshotSource for Snapshot {
    fn apartments(&self) -> Result<Vec<Apartment>, SourceError> {
        Ok(self.apartments.clone())
    }

    fn reservations(&self) -> Result<Vec<Reservation>, SourceError> {
        Ok(self.reservations.clone())
    }

    fn cleanings(&self) -> Result<Vec<CleaningAssignment>, SourceError> {
        Ok(self.cleanings.clone())
    }
}

/// Service pairing a snapshot source with the timeline assembler.
///
/// Holds no scheduling state: each call pulls a fresh snapshot and rebuilds
/// the reservation index.
pub struct TurnoverService<S> {
    source: Arc<S>,
    assembler: TimelineAssembler,
}

impl<S> TurnoverService<S>
where
    S: SnapshotSource + 'static,
{
    pub fn new(source: Arc<S>, policy: CleaningPolicy) -> Self {
        Self {
            source,
            assembler: TimelineAssembler::new(policy),
        }
    }

    pub fn policy(&self) -> &CleaningPolicy {
        self.assembler.policy()
    }

    pub fn dashboard(&self, date: NaiveDate) -> Result<TimelineDashboard, TurnoverServiceError> {
        let apartments = self.source.apartments()?;
        let index = ReservationIndex::new(self.source.reservations()?);
        Ok(self.assembler.assemble(date, &apartments, &index))
    }

    pub fn cleanings_for(
        &self,
        assignee: &str,
        statuses: &[CleaningStatus],
    ) -> Result<Vec<CleaningAssignment>, TurnoverServiceError> {
        let assignments = self.source.cleanings()?;
        Ok(my_cleanings(&assignments, assignee, statuses))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TurnoverServiceError {
    #[error(transparent)]
    Source(#[from] SourceError),
}
