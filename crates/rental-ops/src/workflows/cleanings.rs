//! Cleaning assignments and the "my scheduled cleanings" query.

use crate::workflows::turnover::domain::ApartmentId;
use crate::workflows::turnover::records::{empty_string_as_none, parse_datetime, RecordError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleaningId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStatus {
    Scheduled,
    InProgress,
    Completed,
    Canceled,
}

impl CleaningStatus {
    /// Statuses that still represent work on someone's plate.
    pub const OPEN: [Self; 2] = [Self::Scheduled, Self::InProgress];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "scheduled" => Some(Self::Scheduled),
            "in_progress" => Some(Self::InProgress),
            "completed" | "done" => Some(Self::Completed),
            "canceled" | "cancelled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningAssignment {
    pub id: CleaningId,
    pub apartment_id: ApartmentId,
    pub assignee: String,
    pub status: CleaningStatus,
    pub scheduled_start: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Assignments for `assignee` whose status is in `statuses`, earliest first.
/// Ties on start time are ordered by assignment id.
pub fn my_cleanings(
    assignments: &[CleaningAssignment],
    assignee: &str,
    statuses: &[CleaningStatus],
) -> Vec<CleaningAssignment> {
    let mut mine: Vec<CleaningAssignment> = assignments
        .iter()
        .filter(|assignment| assignment.assignee == assignee)
        .filter(|assignment| statuses.contains(&assignment.status))
        .cloned()
        .collect();
    mine.sort_by(|a, b| {
        a.scheduled_start
            .cmp(&b.scheduled_start)
            .then_with(|| a.id.cmp(&b.id))
    });
    mine
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningRecord {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub apartment_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub scheduled_start: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
}

impl TryFrom<CleaningRecord> for CleaningAssignment {
    type Error = RecordError;

    fn try_from(record: CleaningRecord) -> Result<Self, Self::Error> {
        let id = record.id.ok_or(RecordError::MissingField("id"))?;
        let apartment_id = record
            .apartment_id
            .ok_or(RecordError::MissingField("apartment_id"))?;
        let assignee = record.assignee.ok_or(RecordError::MissingField("assignee"))?;
        let raw_start = record
            .scheduled_start
            .ok_or(RecordError::MissingField("scheduled_start"))?;
        let scheduled_start = parse_datetime(&raw_start).ok_or(RecordError::InvalidField {
            field: "scheduled_start",
            value: raw_start,
        })?;
        let status = match record.status {
            None => CleaningStatus::Scheduled,
            Some(raw) => CleaningStatus::parse(&raw).ok_or(RecordError::InvalidField {
                field: "status",
                value: raw,
            })?,
        };

        Ok(CleaningAssignment {
            id: CleaningId(id),
            apartment_id: ApartmentId(apartment_id),
            assignee,
            status,
            scheduled_start,
            notes: record.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(id: &str, assignee: &str, status: CleaningStatus, start: &str) -> CleaningAssignment {
        CleaningAssignment {
            id: CleaningId(id.into()),
            apartment_id: ApartmentId("apt-1".into()),
            assignee: assignee.into(),
            status,
            scheduled_start: NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M")
                .expect("valid start"),
            notes: None,
        }
    }

    #[test]
    fn filters_by_assignee_and_status_then_sorts_by_start() {
        let assignments = vec![
            assignment("c-3", "maria", CleaningStatus::Scheduled, "2025-06-10 15:00"),
            assignment("c-1", "maria", CleaningStatus::Completed, "2025-06-10 09:00"),
            assignment("c-2", "jon", CleaningStatus::Scheduled, "2025-06-10 08:00"),
            assignment("c-4", "maria", CleaningStatus::InProgress, "2025-06-10 11:00"),
            assignment("c-5", "maria", CleaningStatus::Scheduled, "2025-06-10 11:00"),
        ];

        let ids: Vec<String> = my_cleanings(&assignments, "maria", &CleaningStatus::OPEN)
            .into_iter()
            .map(|a| a.id.0)
            .collect();
        assert_eq!(ids, vec!["c-4", "c-5", "c-3"]);
    }

    #[test]
    fn empty_status_filter_matches_nothing() {
        let assignments = vec![assignment(
            "c-1",
            "maria",
            CleaningStatus::Scheduled,
            "2025-06-10 09:00",
        )];
        assert!(my_cleanings(&assignments, "maria", &[]).is_empty());
    }

    #[test]
    fn status_parsing_normalises_separators() {
        assert_eq!(
            CleaningStatus::parse("In Progress"),
            Some(CleaningStatus::InProgress)
        );
        assert_eq!(
            CleaningStatus::parse("in-progress"),
            Some(CleaningStatus::InProgress)
        );
        assert_eq!(CleaningStatus::parse("paused"), None);
    }

    #[test]
    fn record_requires_an_assignee() {
        let record = CleaningRecord {
            id: Some("c-1".into()),
            apartment_id: Some("apt-1".into()),
            scheduled_start: Some("2025-06-10T11:00:00".into()),
            ..CleaningRecord::default()
        };
        assert_eq!(
            CleaningAssignment::try_from(record),
            Err(RecordError::MissingField("assignee"))
        );
    }
}
