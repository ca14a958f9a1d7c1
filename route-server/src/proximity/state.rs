//! Per-session proximity state.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::StopId;

/// Armed flags per stop plus the time of the last alert.
///
/// A stop is armed once an arrival has been reported for it, and stays
/// armed until the vehicle moves clear of the hysteresis band. Entries are
/// created lazily the first time a stop is evaluated.
#[derive(Debug, Clone, Default)]
pub struct ProximityState {
    armed: HashMap<StopId, bool>,
    last_alert: Option<DateTime<Utc>>,
}

impl ProximityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self, id: &StopId) -> bool {
        self.armed.get(id).copied().unwrap_or(false)
    }

    pub fn arm(&mut self, id: &StopId) {
        self.armed.insert(id.clone(), true);
    }

    pub fn clear(&mut self, id: &StopId) {
        self.armed.insert(id.clone(), false);
    }

    /// Drop the entry for a stop that was completed or removed.
    pub fn forget(&mut self, id: &StopId) {
        self.armed.remove(id);
    }

    /// Keep only entries for stops in `active`.
    pub fn retain_active(&mut self, active: &HashSet<&StopId>) {
        self.armed.retain(|id, _| active.contains(id));
    }

    pub fn last_alert(&self) -> Option<DateTime<Utc>> {
        self.last_alert
    }

    pub fn record_alert(&mut self, at: DateTime<Utc>) {
        self.last_alert = Some(at);
    }

    /// Number of stops with an entry.
    pub fn tracked(&self) -> usize {
        self.armed.len()
    }
}
