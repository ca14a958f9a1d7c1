//! Planning requests, results and their errors.

use std::collections::HashSet;

use serde::Serialize;

use crate::directions::DirectionsError;
use crate::domain::{Coordinate, DomainError, Stop};
use crate::eta::ScheduledStop;

/// Which strategy produced an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// The remote directions provider (traffic-aware).
    Remote,
    /// The local greedy heuristic.
    Fallback,
}

impl Engine {
    /// Message shown to the user alongside the itinerary.
    pub fn message(self) -> &'static str {
        match self {
            Engine::Remote => "Route optimized with real-time traffic",
            Engine::Fallback => "Route optimized internally",
        }
    }
}

/// A request to order a set of stops.
#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub stops: Vec<Stop>,
    pub origin: Coordinate,
    pub return_to_start: bool,
    pub avoid_tolls: bool,
}

impl OptimizationRequest {
    pub fn new(stops: Vec<Stop>, origin: Coordinate) -> Self {
        Self {
            stops,
            origin,
            return_to_start: false,
            avoid_tolls: false,
        }
    }

    pub fn with_return_to_start(mut self, value: bool) -> Self {
        self.return_to_start = value;
        self
    }

    pub fn with_avoid_tolls(mut self, value: bool) -> Self {
        self.avoid_tolls = value;
        self
    }

    /// Drop completed stops and validate what is left.
    ///
    /// The stop count is checked before anything else, so a request with
    /// fewer than two open stops is rejected without further work.
    pub fn prepare(mut self) -> Result<Self, DomainError> {
        self.stops.retain(|s| !s.is_completed);

        if self.stops.len() < 2 {
            return Err(DomainError::InsufficientStops(self.stops.len()));
        }

        if !self.origin.is_valid() {
            return Err(DomainError::InvalidCoordinate("origin".to_string()));
        }

        let mut seen = HashSet::with_capacity(self.stops.len());
        for stop in &self.stops {
            if !stop.position().is_valid() {
                return Err(DomainError::InvalidCoordinate(format!("stop {}", stop.id)));
            }
            if !seen.insert(&stop.id) {
                return Err(DomainError::DuplicateStop(stop.id.clone()));
            }
        }

        Ok(self)
    }
}

/// An ordered, time-annotated itinerary.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub ordered_stops: Vec<ScheduledStop>,
    pub source_engine: Engine,
}

/// Error from a single sequencing strategy.
///
/// The planner recovers from all of these by falling back.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The directions provider failed or answered with something unusable
    #[error("directions provider failed: {0}")]
    Provider(#[from] DirectionsError),

    /// More stops than the strategy can take
    #[error("{count} stops exceeds the limit of {limit}")]
    TooManyStops { count: usize, limit: usize },
}

/// Error from planning.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The request itself is unusable
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// Sequencing failed with no strategy left to fall back on
    #[error("sequencing failed: {0}")]
    Sequence(#[from] SequenceError),
}
