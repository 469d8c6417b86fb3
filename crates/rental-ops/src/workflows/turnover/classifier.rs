use super::domain::{ClockTime, TurnoverError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CRITICAL_THRESHOLD_MINUTES: i32 = 120;

/// House rules the scheduler falls back on when guests leave times blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningPolicy {
    pub checkout_default: ClockTime,
    pub checkin_default: ClockTime,
    pub critical_threshold_minutes: i32,
}

impl Default for CleaningPolicy {
    fn default() -> Self {
        Self {
            checkout_default: ClockTime::STANDARD_CHECKOUT,
            checkin_default: ClockTime::STANDARD_CHECKIN,
            critical_threshold_minutes: DEFAULT_CRITICAL_THRESHOLD_MINUTES,
        }
    }
}

impl CleaningPolicy {
    /// Both times are taken to fall on the same calendar day. A check-in that
    /// precedes the checkout yields a negative, invalid window rather than
    /// wrapping past midnight.
    pub fn classify(&self, start: ClockTime, end: ClockTime) -> CleaningWindow {
        let duration_minutes =
            i32::from(end.minutes_since_midnight()) - i32::from(start.minutes_since_midnight());

        let status = if duration_minutes < 0 {
            WindowStatus::Invalid
        } else if duration_minutes < self.critical_threshold_minutes {
            WindowStatus::Critical
        } else {
            WindowStatus::Normal
        };

        CleaningWindow {
            start_time: start,
            end_time: end,
            duration_minutes,
            duration_formatted: format_duration(duration_minutes),
            status,
            is_critical: status == WindowStatus::Critical,
            is_invalid: status == WindowStatus::Invalid,
        }
    }

    pub fn classify_times(&self, start: &str, end: &str) -> Result<CleaningWindow, TurnoverError> {
        let start = ClockTime::parse(start)?;
        let end = ClockTime::parse(end)?;
        Ok(self.classify(start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStatus {
    Normal,
    Critical,
    Invalid,
}

impl WindowStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Critical => "Critical",
            Self::Invalid => "Invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningWindow {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub duration_minutes: i32,
    pub duration_formatted: String,
    pub status: WindowStatus,
    pub is_critical: bool,
    pub is_invalid: bool,
}

/// Renders minutes as `"<H>h <M>m"`; negative spans keep a leading `-`.
pub fn format_duration(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let magnitude = minutes.unsigned_abs();
    format!("{sign}{}h {}m", magnitude / 60, magnitude % 60)
}
