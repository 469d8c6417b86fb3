//! Loosely-typed boundary records.
//!
//! Snapshots arrive from CSV exports and JSON payloads where any column may be
//! missing or blank. These records accept that shape and convert into the
//! domain types with `TryFrom`, rejecting anything without apartment and date
//! identity. Guest-supplied times stay raw so a malformed value only fails the
//! one apartment it belongs to during assembly.

use super::domain::{Apartment, ApartmentId, Reservation, ReservationId, ReservationStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` has invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApartmentRecord {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<Flag>,
}

/// Boolean column as it shows up in the wild: `true`, `1`, `"yes"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl Flag {
    fn resolve(&self) -> Option<bool> {
        match self {
            Flag::Bool(value) => Some(*value),
            Flag::Number(0) => Some(false),
            Flag::Number(1) => Some(true),
            Flag::Number(_) => None,
            Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(true),
                "false" | "no" | "n" | "0" => Some(false),
                _ => None,
            },
        }
    }

    fn raw(&self) -> String {
        match self {
            Flag::Bool(value) => value.to_string(),
            Flag::Number(value) => value.to_string(),
            Flag::Text(text) => text.clone(),
        }
    }
}

impl TryFrom<ApartmentRecord> for Apartment {
    type Error = RecordError;

    fn try_from(record: ApartmentRecord) -> Result<Self, Self::Error> {
        let id = record.id.ok_or(RecordError::MissingField("id"))?;
        let name = record.name.ok_or(RecordError::MissingField("name"))?;
        // Inventory exports omit the flag for units that were never retired.
        let active = match record.active {
            None => true,
            Some(flag) => flag.resolve().ok_or_else(|| RecordError::InvalidField {
                field: "active",
                value: flag.raw(),
            })?,
        };

        Ok(Apartment {
            id: ApartmentId(id),
            name,
            active,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub apartment_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub guest_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub check_in_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub check_out_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub planned_arrival_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub planned_checkout_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub created_at: Option<String>,
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = RecordError;

    fn try_from(record: ReservationRecord) -> Result<Self, Self::Error> {
        let id = record.id.ok_or(RecordError::MissingField("id"))?;
        let apartment_id = record
            .apartment_id
            .ok_or(RecordError::MissingField("apartment_id"))?;
        let check_in_date = required_date("check_in_date", record.check_in_date)?;
        let check_out_date = required_date("check_out_date", record.check_out_date)?;

        let status = match record.status {
            None => ReservationStatus::Active,
            Some(raw) => {
                ReservationStatus::parse(&raw).ok_or(RecordError::InvalidField {
                    field: "status",
                    value: raw,
                })?
            }
        };

        let created_at = match record.created_at {
            None => None,
            Some(raw) => Some(parse_datetime(&raw).ok_or(RecordError::InvalidField {
                field: "created_at",
                value: raw,
            })?),
        };

        Ok(Reservation {
            id: ReservationId(id),
            apartment_id: ApartmentId(apartment_id),
            guest_name: record.guest_name,
            check_in_date,
            check_out_date,
            planned_arrival_time: record.planned_arrival_time,
            planned_checkout_time: record.planned_checkout_time,
            status,
            created_at,
        })
    }
}

fn required_date(field: &'static str, raw: Option<String>) -> Result<NaiveDate, RecordError> {
    let raw = raw.ok_or(RecordError::MissingField(field))?;
    parse_datetime(&raw)
        .map(|value| value.date())
        .ok_or(RecordError::InvalidField { field, value: raw })
}

pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and bare dates.
/// Calendar matching only ever looks at the date part.
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation_record() -> ReservationRecord {
        ReservationRecord {
            id: Some("res-1".into()),
            apartment_id: Some("apt-1".into()),
            check_in_date: Some("2025-06-01".into()),
            check_out_date: Some("2025-06-04".into()),
            ..ReservationRecord::default()
        }
    }

    #[test]
    fn missing_status_defaults_to_active() {
        let reservation = Reservation::try_from(reservation_record()).expect("converts");
        assert_eq!(reservation.status, ReservationStatus::Active);
        assert!(reservation.planned_checkout_time.is_none());
    }

    #[test]
    fn rejects_records_without_apartment_identity() {
        let record = ReservationRecord {
            apartment_id: None,
            ..reservation_record()
        };
        assert_eq!(
            Reservation::try_from(record),
            Err(RecordError::MissingField("apartment_id"))
        );
    }

    #[test]
    fn rejects_records_without_dates() {
        let record = ReservationRecord {
            check_out_date: None,
            ..reservation_record()
        };
        assert_eq!(
            Reservation::try_from(record),
            Err(RecordError::MissingField("check_out_date"))
        );
    }

    #[test]
    fn timestamps_collapse_to_calendar_dates() {
        let record = ReservationRecord {
            check_out_date: Some("2025-06-04T10:30:00Z".into()),
            created_at: Some("2025-05-01 08:00:00".into()),
            ..reservation_record()
        };
        let reservation = Reservation::try_from(record).expect("converts");
        assert_eq!(
            reservation.check_out_date,
            NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()
        );
        assert!(reservation.created_at.is_some());
    }

    #[test]
    fn unknown_status_is_reported() {
        let record = ReservationRecord {
            status: Some("tentative".into()),
            ..reservation_record()
        };
        assert_eq!(
            Reservation::try_from(record),
            Err(RecordError::InvalidField {
                field: "status",
                value: "tentative".into()
            })
        );
    }

    #[test]
    fn blank_json_fields_are_treated_as_absent() {
        let record: ReservationRecord = serde_json::from_str(
            r#"{"id":"r-9","apartment_id":"apt-2","check_in_date":"2025-06-01",
                "check_out_date":"2025-06-03","planned_checkout_time":"  "}"#,
        )
        .expect("parses");
        assert!(record.planned_checkout_time.is_none());
    }

    #[test]
    fn apartment_flag_accepts_loose_spellings() {
        let record: ApartmentRecord =
            serde_json::from_str(r#"{"id":"apt-1","name":"Loft","active":"no"}"#).expect("parses");
        let apartment = Apartment::try_from(record).expect("converts");
        assert!(!apartment.active);

        let record: ApartmentRecord =
            serde_json::from_str(r#"{"id":"apt-2","name":"Studio"}"#).expect("parses");
        assert!(Apartment::try_from(record).expect("converts").active);

        let record: ApartmentRecord =
            serde_json::from_str(r#"{"id":"apt-3","name":"Annex","active":"maybe"}"#)
                .expect("parses");
        assert_eq!(
            Apartment::try_from(record),
            Err(RecordError::InvalidField {
                field: "active",
                value: "maybe".into()
            })
        );
    }
}
