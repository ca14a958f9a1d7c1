//! Planning entry point: sequence, then project ETAs.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::directions::DirectionsProvider;
use crate::domain::{Stop, renumber};
use crate::eta::{EtaConfig, EtaProjector};

use super::config::SequencerConfig;
use super::greedy::GreedySequencer;
use super::remote::RemoteSequencer;
use super::request::{Engine, OptimizationRequest, OptimizationResult, PlanError};
use super::StopSequencer;

/// Turns an [`OptimizationRequest`] into a time-annotated itinerary.
///
/// Holds the remote strategy only when provider credentials were
/// configured. Stateless between calls, so one planner can serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Planner<P> {
    remote: Option<RemoteSequencer<P>>,
    fallback: GreedySequencer,
    eta: EtaProjector,
    config: SequencerConfig,
}

impl<P: DirectionsProvider> Planner<P> {
    /// Create a planner. Pass `None` as `provider` to always use the local heuristic.
    pub fn new(provider: Option<P>, config: SequencerConfig, eta: EtaConfig) -> Self {
        Self {
            remote: provider.map(|p| RemoteSequencer::new(p, config.clone())),
            fallback: GreedySequencer::new(config.clone()),
            eta: EtaProjector::new(eta),
            config,
        }
    }

    /// Whether a remote provider is configured.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// The remote strategy, if configured.
    #[cfg(test)]
    pub(super) fn remote(&self) -> Option<&RemoteSequencer<P>> {
        self.remote.as_ref()
    }

    /// Plan an itinerary departing the origin at `start`.
    pub async fn plan(
        &self,
        request: OptimizationRequest,
        start: NaiveDateTime,
    ) -> Result<OptimizationResult, PlanError> {
        let request = request.prepare()?;

        let (mut stops, source_engine) = self.sequence(&request).await?;
        renumber(&mut stops);

        info!(
            stops = stops.len(),
            engine = ?source_engine,
            return_to_start = request.return_to_start,
            "planned itinerary"
        );

        let ordered_stops = self.eta.project(stops, request.origin, start);
        Ok(OptimizationResult {
            ordered_stops,
            source_engine,
        })
    }

    /// Try the remote strategy when it applies, falling back on any failure.
    async fn sequence(
        &self,
        request: &OptimizationRequest,
    ) -> Result<(Vec<Stop>, Engine), PlanError> {
        match &self.remote {
            Some(remote) if remote.accepts(request) => {
                let deadline = self.config.provider_deadline();
                match tokio::time::timeout(deadline, remote.sequence(request)).await {
                    Ok(Ok(stops)) => return Ok((stops, remote.engine())),
                    Ok(Err(e)) => {
                        warn!(error = %e, "directions provider failed, using local heuristic");
                    }
                    Err(_) => {
                        warn!(
                            deadline_secs = deadline.as_secs(),
                            "directions provider timed out, using local heuristic"
                        );
                    }
                }
            }
            Some(_) => {
                debug!(
                    stops = request.stops.len(),
                    limit = self.config.waypoint_limit,
                    "too many stops for directions provider, using local heuristic"
                );
            }
            None => {}
        }

        let stops = self.fallback.sequence(request).await?;
        Ok((stops, self.fallback.engine()))
    }
}
