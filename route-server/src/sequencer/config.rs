//! Sequencer configuration.

use std::time::Duration;

/// Tuning parameters for stop sequencing.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Largest stop count sent to the directions provider.
    /// Bigger requests go straight to the local heuristic.
    pub waypoint_limit: usize,

    /// How long a planning request waits for the provider (seconds).
    pub provider_deadline_secs: u64,

    /// Score per degree of straight-line distance.
    pub distance_weight: f64,

    /// Score subtracted for `HIGH` priority stops.
    pub high_priority_bonus: f64,

    /// Time windows earlier than this minute of the day earn a bonus.
    pub window_cutoff_mins: u32,

    /// Bonus per minute a time window falls before the cutoff.
    pub window_weight: f64,
}

impl SequencerConfig {
    /// Returns the provider deadline as a Duration.
    pub fn provider_deadline(&self) -> Duration {
        Duration::from_secs(self.provider_deadline_secs)
    }

    /// Set the provider deadline.
    pub fn with_provider_deadline(mut self, secs: u64) -> Self {
        self.provider_deadline_secs = secs;
        self
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            waypoint_limit: 25,
            provider_deadline_secs: 10,
            distance_weight: 1000.0,
            high_priority_bonus: 2000.0,
            window_cutoff_mins: 1200, // 20:00
            window_weight: 0.5,
        }
    }
}
