//! Checkout/check-in timeline scheduling.
//!
//! For a target date the engine finds, per active apartment, the reservation
//! checking out and the one checking in, then classifies the cleaning window
//! between them. Everything here is rebuilt per request from a snapshot; no
//! component keeps state between calls.

mod assembler;
mod classifier;
pub mod dashboard;
pub mod domain;
mod index;
pub mod position;
pub mod records;
pub mod report;
pub mod router;
pub mod service;

pub use assembler::{default_target_date, TimelineAssembler};
pub use classifier::{
    format_duration, CleaningPolicy, CleaningWindow, WindowStatus,
    DEFAULT_CRITICAL_THRESHOLD_MINUTES,
};
pub use dashboard::{DashboardEntry, EntryFailure, TimelineDashboard};
pub use domain::{
    Apartment, ApartmentId, ClockTime, Reservation, ReservationId, ReservationStatus,
    ScheduleSlot, TurnoverError,
};
pub use index::ReservationIndex;
pub use position::{position_fraction, position_of, position_percent, TimelineMarkers};
pub use records::{ApartmentRecord, RecordError, ReservationRecord};
pub use report::{DashboardSummary, FailureView, TimelineRowView};
pub use router::turnover_router;
pub use service::{Snapshot, SnapshotSource, SourceError, TurnoverService, TurnoverServiceError};
