//! Sequencing through a remote directions provider.
//!
//! On a round trip the vehicle starts and ends at the origin and every stop
//! is an intermediate waypoint. Otherwise the stop farthest from the origin
//! becomes the destination, anchoring the direction of travel, and the
//! provider only reorders the rest.

use tracing::debug;

use crate::directions::{DirectionsProvider, DirectionsRequest, validate_permutation};
use crate::domain::{Coordinate, Stop, euclidean_degrees};

use super::config::SequencerConfig;
use super::request::{Engine, OptimizationRequest, SequenceError};
use super::StopSequencer;

/// Sequencer backed by a [`DirectionsProvider`].
#[derive(Debug, Clone)]
pub struct RemoteSequencer<P> {
    provider: P,
    config: SequencerConfig,
}

impl<P: DirectionsProvider> RemoteSequencer<P> {
    pub fn new(provider: P, config: SequencerConfig) -> Self {
        Self { provider, config }
    }

    #[cfg(test)]
    pub(super) fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether the request is small enough to send to the provider.
    pub fn accepts(&self, request: &OptimizationRequest) -> bool {
        request.stops.len() <= self.config.waypoint_limit
    }
}

/// Split stops into intermediate waypoints and an optional destination anchor.
fn split_destination(
    stops: &[Stop],
    origin: Coordinate,
    return_to_start: bool,
) -> (Vec<Stop>, Option<Stop>) {
    if return_to_start {
        return (stops.to_vec(), None);
    }

    let mut farthest: Option<(usize, f64)> = None;
    for (i, stop) in stops.iter().enumerate() {
        let d = euclidean_degrees(origin, stop.position());
        if farthest.is_none_or(|(_, best)| d > best) {
            farthest = Some((i, d));
        }
    }

    let mut intermediates = stops.to_vec();
    let destination = farthest.map(|(i, _)| intermediates.remove(i));
    (intermediates, destination)
}

impl<P: DirectionsProvider> StopSequencer for RemoteSequencer<P> {
    fn engine(&self) -> Engine {
        Engine::Remote
    }

    async fn sequence(&self, request: &OptimizationRequest) -> Result<Vec<Stop>, SequenceError> {
        if !self.accepts(request) {
            return Err(SequenceError::TooManyStops {
                count: request.stops.len(),
                limit: self.config.waypoint_limit,
            });
        }

        let (intermediates, destination) =
            split_destination(&request.stops, request.origin, request.return_to_start);

        let directions = DirectionsRequest {
            origin: request.origin,
            destination: destination
                .as_ref()
                .map_or(request.origin, |stop| stop.position()),
            waypoints: intermediates.iter().map(Stop::position).collect(),
            avoid_tolls: request.avoid_tolls,
        };

        let route = self.provider.optimize(&directions).await?;
        validate_permutation(&route.waypoint_order, intermediates.len())?;
        debug!(
            stops = request.stops.len(),
            duration_secs = route.total_duration_secs,
            distance_m = route.total_distance_m,
            "remote sequencing succeeded"
        );

        let mut ordered: Vec<Stop> = route
            .waypoint_order
            .iter()
            .map(|&i| intermediates[i].clone())
            .collect();
        ordered.extend(destination);

        // FIRST/LAST tiers override the provider's order; sort is stable.
        ordered.sort_by_key(|stop| stop.priority.tier());

        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::{DirectionsError, OptimizedRoute};
    use crate::domain::Priority;
    use std::sync::Mutex;

    /// Provider that reverses the waypoints and records what it was sent.
    struct ReversingProvider {
        seen: Mutex<Vec<DirectionsRequest>>,
    }

    impl ReversingProvider {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> DirectionsRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl DirectionsProvider for ReversingProvider {
        async fn optimize(
            &self,
            request: &DirectionsRequest,
        ) -> Result<OptimizedRoute, DirectionsError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(OptimizedRoute {
                waypoint_order: (0..request.waypoints.len()).rev().collect(),
                total_duration_secs: 0,
                total_distance_m: 0,
            })
        }
    }

    fn ids(stops: &[Stop]) -> Vec<&str> {
        stops.iter().map(|s| s.id.as_str()).collect()
    }

    fn stops() -> Vec<Stop> {
        vec![
            Stop::new("a", 0.1, 0.0),
            Stop::new("far", 0.9, 0.0),
            Stop::new("b", 0.2, 0.0),
            Stop::new("c", 0.3, 0.0),
        ]
    }

    #[tokio::test]
    async fn farthest_stop_anchors_the_destination() {
        let seq = RemoteSequencer::new(ReversingProvider::new(), SequencerConfig::default());
        let request = OptimizationRequest::new(stops(), Coordinate::new(0.0, 0.0));

        let ordered = seq.sequence(&request).await.unwrap();
        assert_eq!(ids(&ordered), vec!["c", "b", "a", "far"]);

        let sent = seq.provider().last_request();
        assert_eq!(sent.destination, Coordinate::new(0.9, 0.0));
        assert_eq!(sent.waypoints.len(), 3);
    }

    #[tokio::test]
    async fn round_trip_sends_every_stop_as_waypoint() {
        let seq = RemoteSequencer::new(ReversingProvider::new(), SequencerConfig::default());
        let request = OptimizationRequest::new(stops(), Coordinate::new(0.0, 0.0))
            .with_return_to_start(true)
            .with_avoid_tolls(true);

        let ordered = seq.sequence(&request).await.unwrap();
        assert_eq!(ids(&ordered), vec!["c", "b", "far", "a"]);

        let sent = seq.provider().last_request();
        assert_eq!(sent.origin, sent.destination);
        assert_eq!(sent.waypoints.len(), 4);
        assert!(sent.avoid_tolls);
    }

    #[tokio::test]
    async fn priority_tiers_override_provider_order() {
        let mut input = stops();
        input[0].priority = Priority::Last;
        input[3].priority = Priority::First;
        let seq = RemoteSequencer::new(ReversingProvider::new(), SequencerConfig::default());
        let request = OptimizationRequest::new(input, Coordinate::new(0.0, 0.0));

        let ordered = seq.sequence(&request).await.unwrap();
        assert_eq!(ids(&ordered), vec!["c", "b", "far", "a"]);
    }

    #[tokio::test]
    async fn over_the_limit_is_refused() {
        let config = SequencerConfig {
            waypoint_limit: 3,
            ..SequencerConfig::default()
        };
        let seq = RemoteSequencer::new(ReversingProvider::new(), config);
        let request = OptimizationRequest::new(stops(), Coordinate::new(0.0, 0.0));

        assert!(!seq.accepts(&request));
        assert!(matches!(
            seq.sequence(&request).await,
            Err(SequenceError::TooManyStops { count: 4, limit: 3 })
        ));
        assert!(seq.provider().seen.lock().unwrap().is_empty());
    }

    /// Provider that answers with a fixed waypoint order.
    struct FixedOrderProvider(Vec<usize>);

    impl DirectionsProvider for FixedOrderProvider {
        async fn optimize(
            &self,
            _request: &DirectionsRequest,
        ) -> Result<OptimizedRoute, DirectionsError> {
            Ok(OptimizedRoute {
                waypoint_order: self.0.clone(),
                total_duration_secs: 0,
                total_distance_m: 0,
            })
        }
    }

    #[tokio::test]
    async fn order_that_is_not_a_permutation_is_rejected() {
        let request = OptimizationRequest::new(
            vec![
                Stop::new("a", 0.1, 0.0),
                Stop::new("b", 0.2, 0.0),
                Stop::new("far", 0.9, 0.0),
            ],
            Coordinate::new(0.0, 0.0),
        );

        for order in [vec![0, 0], vec![0, 2], vec![0]] {
            let seq = RemoteSequencer::new(FixedOrderProvider(order), SequencerConfig::default());
            assert!(matches!(
                seq.sequence(&request).await,
                Err(SequenceError::Provider(DirectionsError::Malformed(_)))
            ));
        }
    }

    #[test]
    fn farthest_tie_keeps_first() {
        let stops = vec![Stop::new("x", 1.0, 0.0), Stop::new("y", 0.0, 1.0)];
        let (rest, dest) = split_destination(&stops, Coordinate::new(0.0, 0.0), false);
        assert_eq!(dest.unwrap().id.as_str(), "x");
        assert_eq!(ids(&rest), vec!["y"]);
    }
}
