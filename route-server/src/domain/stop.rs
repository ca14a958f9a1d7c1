//! Stops and their priority classes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geo::Coordinate;
use super::time_window::TimeWindow;

/// Opaque stop identifier, stable across reorderings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StopId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Priority class of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Visited before every non-`First` stop.
    First,
    /// Scored as if 2 degree-units closer during greedy selection.
    High,
    #[default]
    Normal,
    /// Visited after every non-`Last` stop.
    Last,
}

impl Priority {
    /// Sequencing tier: all tier-0 stops come before tier-1, and so on.
    pub fn tier(self) -> u8 {
        match self {
            Priority::First => 0,
            Priority::High | Priority::Normal => 1,
            Priority::Last => 2,
        }
    }
}

/// A location to visit on the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Soft target time, "HH:MM". Kept raw so unreadable values survive a
    /// round trip to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
    /// 1-based itinerary position; 0 until the stop has been sequenced.
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_current: bool,
}

impl Stop {
    /// Create a normal-priority stop with no address or time window.
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: StopId::new(id),
            lat,
            lng,
            address: None,
            priority: Priority::Normal,
            time_window: None,
            order: 0,
            is_completed: false,
            is_current: false,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_time_window(mut self, window: impl Into<String>) -> Self {
        self.time_window = Some(window.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// Minute of the day of the time window, or
    /// [`NO_WINDOW_MINUTES`](super::NO_WINDOW_MINUTES) when absent or unreadable.
    pub fn window_minutes(&self) -> u32 {
        TimeWindow::minutes_or_none(self.time_window.as_deref())
    }
}

/// Rewrite `order` so the stops are numbered 1..=n in slice order.
pub fn renumber(stops: &mut [Stop]) {
    for (i, stop) in stops.iter_mut().enumerate() {
        stop.order = i as u32 + 1;
    }
}
