//! Soft target times attached to stops.
//!
//! Clients send time windows as "HH:MM" strings. The sequencer only needs
//! the minute of the day, and treats anything it cannot read as "no
//! preference".

use std::fmt;

use chrono::{NaiveTime, Timelike};

/// Minute-of-day value used for a missing or unreadable time window.
///
/// It sits above every real minute of the day, so it never earns an
/// early-time bonus.
pub const NO_WINDOW_MINUTES: u32 = 9999;

/// Error returned when parsing an invalid time window string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time window: {reason}")]
pub struct TimeWindowError {
    reason: &'static str,
}

impl TimeWindowError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A target time of day for visiting a stop.
///
/// # Examples
///
/// ```
/// use route_server::domain::TimeWindow;
///
/// let window = TimeWindow::parse("09:30").unwrap();
/// assert_eq!(window.minutes_of_day(), 570);
/// assert_eq!(window.to_string(), "09:30");
///
/// // Single-digit hours are accepted
/// assert_eq!(TimeWindow::parse("7:05").unwrap().minutes_of_day(), 425);
///
/// assert!(TimeWindow::parse("0930").is_err());
/// assert!(TimeWindow::parse("24:00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeWindow(NaiveTime);

impl TimeWindow {
    /// Parse an "HH:MM" (or "H:MM") string.
    pub fn parse(s: &str) -> Result<Self, TimeWindowError> {
        let (hours, minutes) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TimeWindowError::new("expected HH:MM format"))?;

        if hours.is_empty() || hours.len() > 2 {
            return Err(TimeWindowError::new("hour must have one or two digits"));
        }
        if minutes.len() != 2 {
            return Err(TimeWindowError::new("minute must have two digits"));
        }

        let hour = parse_digits(hours).ok_or_else(|| TimeWindowError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeWindowError::new("hour must be 0-23"));
        }

        let minute =
            parse_digits(minutes).ok_or_else(|| TimeWindowError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeWindowError::new("minute must be 0-59"));
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeWindowError::new("invalid time"))
    }

    /// Minutes since midnight (0-1439).
    pub fn minutes_of_day(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    /// Minutes since midnight for an optional raw window string.
    ///
    /// Missing or unparsable windows map to [`NO_WINDOW_MINUTES`].
    pub fn minutes_or_none(raw: Option<&str>) -> u32 {
        raw.and_then(|s| Self::parse(s).ok())
            .map_or(NO_WINDOW_MINUTES, |w| w.minutes_of_day())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
