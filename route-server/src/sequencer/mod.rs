//! Stop sequencing.
//!
//! This module turns an unordered set of stops into a visiting order. Two
//! strategies implement [`StopSequencer`]:
//!
//! - [`RemoteSequencer`] asks a directions provider for a traffic-aware order
//! - [`GreedySequencer`] runs a local nearest-next heuristic
//!
//! The [`Planner`] tries the remote strategy when it is configured and the
//! request is within the provider's size limit, falls back to the greedy one
//! on any failure, and attaches ETAs to the result.

mod config;
mod greedy;
mod planner;
mod remote;
mod request;


use std::future::Future;

pub use config::SequencerConfig;
pub use greedy::GreedySequencer;
pub use planner::Planner;
pub use remote::RemoteSequencer;
pub use request::{
    Engine, OptimizationRequest, OptimizationResult, PlanError, SequenceError,
};

use crate::domain::Stop;

/// A strategy for ordering stops.
pub trait StopSequencer: Send + Sync {
    /// Which engine this strategy reports in results.
    fn engine(&self) -> Engine;

    /// Produce a visiting order for the request's stops.
    fn sequence(
        &self,
        request: &OptimizationRequest,
    ) -> impl Future<Output = Result<Vec<Stop>, SequenceError>> + Send;
}
