//! Maps clock times onto a fixed 00:00-24:00 axis for timeline rendering.

use super::classifier::CleaningWindow;
use super::domain::{ClockTime, TurnoverError};
use serde::Serialize;

pub const MINUTES_PER_DAY: f64 = 1440.0;

pub fn position_fraction(time: ClockTime) -> f64 {
    f64::from(time.minutes_since_midnight()) / MINUTES_PER_DAY
}

pub fn position_percent(time: ClockTime) -> f64 {
    position_fraction(time) * 100.0
}

pub fn position_of(raw: &str) -> Result<f64, TurnoverError> {
    ClockTime::parse(raw).map(position_fraction)
}

/// Marker positions for one row of the timeline bar, in percent of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineMarkers {
    pub checkout_percent: f64,
    pub checkin_percent: f64,
}

impl TimelineMarkers {
    pub fn for_window(window: &CleaningWindow) -> Self {
        Self {
            checkout_percent: position_percent(window.start_time),
            checkin_percent: position_percent(window.end_time),
        }
    }
}
