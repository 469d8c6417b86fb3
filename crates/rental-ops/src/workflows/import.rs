//! Loads apartment, reservation and cleaning snapshots from CSV exports or
//! already-deserialized boundary records.

use crate::workflows::cleanings::{CleaningAssignment, CleaningRecord};
use crate::workflows::turnover::records::{ApartmentRecord, RecordError, ReservationRecord};
use crate::workflows::turnover::{Apartment, Reservation, Snapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum SnapshotImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotImportError::Io(err) => write!(f, "failed to read snapshot export: {}", err),
            SnapshotImportError::Csv(err) => write!(f, "invalid snapshot CSV data: {}", err),
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io(err) => Some(err),
            SnapshotImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SnapshotImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A row that parsed but did not carry enough identity to schedule with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub source: &'static str,
    /// 1-based position among data rows (the CSV header is not counted).
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub apartments: usize,
    pub reservations: usize,
    pub cleanings: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedRow>,
}

pub struct SnapshotImporter;

impl SnapshotImporter {
    pub fn from_paths<P: AsRef<Path>>(
        apartments: P,
        reservations: P,
        cleanings: Option<P>,
    ) -> Result<(Snapshot, ImportReport), SnapshotImportError> {
        let apartments = File::open(apartments)?;
        let reservations = File::open(reservations)?;
        let cleanings = cleanings.map(File::open).transpose()?;
        Self::from_readers(apartments, reservations, cleanings)
    }

    pub fn from_readers<A, R, C>(
        apartments: A,
        reservations: R,
        cleanings: Option<C>,
    ) -> Result<(Snapshot, ImportReport), SnapshotImportError>
    where
        A: Read,
        R: Read,
        C: Read,
    {
        let apartments = read_csv::<_, ApartmentRecord>(apartments)?;
        let reservations = read_csv::<_, ReservationRecord>(reservations)?;
        let cleanings = match cleanings {
            Some(reader) => read_csv::<_, CleaningRecord>(reader)?,
            None => Vec::new(),
        };
        Ok(Self::from_records(apartments, reservations, cleanings))
    }

    /// Converts boundary records, skipping (and reporting) rows that fail
    /// validation. Never fails as a whole.
    pub fn from_records(
        apartments: Vec<ApartmentRecord>,
        reservations: Vec<ReservationRecord>,
        cleanings: Vec<CleaningRecord>,
    ) -> (Snapshot, ImportReport) {
        let mut report = ImportReport::default();

        let apartments: Vec<Apartment> = convert("apartments", apartments, &mut report);
        let reservations: Vec<Reservation> = convert("reservations", reservations, &mut report);
        let cleanings: Vec<CleaningAssignment> = convert("cleanings", cleanings, &mut report);

        report.apartments = apartments.len();
        report.reservations = reservations.len();
        report.cleanings = cleanings.len();

        info!(
            apartments = report.apartments,
            reservations = report.reservations,
            cleanings = report.cleanings,
            rejected = report.rejected.len(),
            "snapshot imported"
        );

        (
            Snapshot {
                apartments,
                reservations,
                cleanings,
            },
            report,
        )
    }
}

fn read_csv<R, T>(reader: R) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<T>().collect()
}

fn convert<Rec, T>(source: &'static str, records: Vec<Rec>, report: &mut ImportReport) -> Vec<T>
where
    T: TryFrom<Rec, Error = RecordError>,
{
    let mut accepted = Vec::with_capacity(records.len());
    for (position, record) in records.into_iter().enumerate() {
        match T::try_from(record) {
            Ok(value) => accepted.push(value),
            Err(error) => {
                let row = position + 1;
                warn!(source, row, %error, "skipping snapshot row");
                report.rejected.push(RejectedRow {
                    source,
                    row,
                    reason: error.to_string(),
                });
            }
        }
    }
    accepted
}
