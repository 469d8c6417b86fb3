use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApartmentId(pub String);

impl fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub String);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inventory reference data. The engine never mutates apartments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: ApartmentId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Active,
    Canceled,
    Completed,
}

impl ReservationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Canceled => "Canceled",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "canceled" | "cancelled" => Some(Self::Canceled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub apartment_id: ApartmentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    /// Guest-supplied arrival time, kept as entered ("HH:MM").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_arrival_time: Option<String>,
    /// Guest-supplied departure time, kept as entered ("HH:MM").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_checkout_time: Option<String>,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

/// A wall-clock time of day with minute resolution.
///
/// Cleaning windows compare two of these on the same calendar day, so the
/// value is stored as minutes since midnight (0..=1439).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: Self = Self(0);
    pub const STANDARD_CHECKOUT: Self = Self(11 * 60);
    pub const STANDARD_CHECKIN: Self = Self(14 * 60);

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self::from)
    }

    /// Parses `H:MM`, `HH:MM` or `HH:MM:SS`. Seconds are accepted and dropped.
    pub fn parse(raw: &str) -> Result<Self, TurnoverError> {
        let trimmed = raw.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(Self::from)
            .map_err(|_| TurnoverError::MalformedTimeInput {
                value: raw.to_string(),
            })
    }

    pub const fn minutes_since_midnight(self) -> u16 {
        self.0
    }

    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    pub const fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Which side of a turnover a reservation occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSlot {
    Checkout,
    Checkin,
}

impl fmt::Display for ScheduleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout => f.write_str("checkout"),
            Self::Checkin => f.write_str("check-in"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnoverError {
    #[error("malformed time '{value}': expected HH:MM")]
    MalformedTimeInput { value: String },
    #[error(
        "reservation {reservation_id} references apartment {apartment_id}, which is not an active apartment"
    )]
    MissingApartmentReference {
        reservation_id: ReservationId,
        apartment_id: ApartmentId,
    },
    #[error(
        "apartment {apartment_id} has {} active {slot} reservations on {date}; using {chosen}",
        .contenders.len() + 1
    )]
    AmbiguousSchedule {
        apartment_id: ApartmentId,
        date: NaiveDate,
        slot: ScheduleSlot,
        chosen: ReservationId,
        contenders: Vec<ReservationId>,
    },
}
