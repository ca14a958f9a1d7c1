//! Local greedy sequencing heuristic.
//!
//! Used whenever the directions provider is unavailable. From the current
//! position it repeatedly visits the stop with the lowest score, where the
//! score is straight-line distance adjusted by priority and time-window
//! bonuses.

use tracing::debug;

use crate::domain::{Coordinate, Priority, Stop, euclidean_degrees};

use super::config::SequencerConfig;
use super::request::{Engine, OptimizationRequest, SequenceError};
use super::StopSequencer;

/// Greedy nearest-next sequencer.
#[derive(Debug, Clone, Default)]
pub struct GreedySequencer {
    config: SequencerConfig,
}

impl GreedySequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self { config }
    }

    /// Selection score for moving from `from` to `stop`; lower is better.
    pub fn score(&self, from: Coordinate, stop: &Stop) -> f64 {
        let mut score = euclidean_degrees(from, stop.position()) * self.config.distance_weight;

        if stop.priority == Priority::High {
            score -= self.config.high_priority_bonus;
        }

        let minutes = stop.window_minutes();
        if minutes < self.config.window_cutoff_mins {
            score -= f64::from(self.config.window_cutoff_mins - minutes) * self.config.window_weight;
        }

        score
    }

    /// Order `stops` starting from `origin`.
    ///
    /// With `return_to_start` and more than two stops, the stop nearest the
    /// origin is held back and visited last whatever its priority. The tier
    /// ordering applies to the remaining stops.
    pub fn order(&self, stops: &[Stop], origin: Coordinate, return_to_start: bool) -> Vec<Stop> {
        let mut remaining = stops.to_vec();

        let reserved = if return_to_start && remaining.len() > 2 {
            nearest_index(&remaining, origin).map(|i| remaining.remove(i))
        } else {
            None
        };

        let mut ordered = Vec::with_capacity(stops.len());
        let mut current = origin;

        while let Some(index) = self.next_index(&remaining, current) {
            let stop = remaining.remove(index);
            current = stop.position();
            ordered.push(stop);
        }

        if let Some(stop) = reserved {
            debug!(stop = %stop.id, "appending reserved return stop");
            ordered.push(stop);
        }

        ordered
    }

    /// Index of the best next stop within the lowest open priority tier.
    ///
    /// Ties keep the earliest stop in `remaining`.
    fn next_index(&self, remaining: &[Stop], current: Coordinate) -> Option<usize> {
        let tier = remaining.iter().map(|s| s.priority.tier()).min()?;

        let mut best: Option<(usize, f64)> = None;
        for (i, stop) in remaining.iter().enumerate() {
            if stop.priority.tier() != tier {
                continue;
            }
            let score = self.score(current, stop);
            if best.is_none_or(|(_, best_score)| score < best_score) {
                best = Some((i, score));
            }
        }

        best.map(|(i, _)| i)
    }
}

/// Index of the stop closest to `origin`, earliest on ties.
fn nearest_index(stops: &[Stop], origin: Coordinate) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, stop) in stops.iter().enumerate() {
        let d = euclidean_degrees(origin, stop.position());
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

impl StopSequencer for GreedySequencer {
    fn engine(&self) -> Engine {
        Engine::Fallback
    }

    async fn sequence(&self, request: &OptimizationRequest) -> Result<Vec<Stop>, SequenceError> {
        Ok(self.order(&request.stops, request.origin, request.return_to_start))
    }
}
