//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, Stop};
use crate::eta::ScheduledStop;
use crate::proximity::ArrivalEvent;
use crate::sequencer::{Engine, OptimizationRequest, OptimizationResult};
use crate::tracking::SessionId;

/// Wire format of itinerary times.
const TIME_FORMAT: &str = "%H:%M";

/// Request to optimize a route.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    /// Stops to order, in any order
    pub stops: Vec<Stop>,

    /// Where the vehicle starts
    pub origin: Coordinate,

    /// Whether the route ends back at the origin
    #[serde(default)]
    pub return_to_start: bool,

    /// Ask the directions provider to avoid toll roads
    #[serde(default)]
    pub avoid_tolls: bool,
}

impl From<OptimizeRequest> for OptimizationRequest {
    fn from(req: OptimizeRequest) -> Self {
        OptimizationRequest::new(req.stops, req.origin)
            .with_return_to_start(req.return_to_start)
            .with_avoid_tolls(req.avoid_tolls)
    }
}

/// A stop in an optimized itinerary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedStop {
    #[serde(flatten)]
    pub stop: Stop,

    /// Estimated arrival, HH:MM
    pub estimated_arrival: String,

    /// Estimated departure, HH:MM
    pub estimated_departure: String,
}

impl OptimizedStop {
    pub fn from_scheduled(scheduled: ScheduledStop) -> Self {
        Self {
            estimated_arrival: scheduled.estimated_arrival.format(TIME_FORMAT).to_string(),
            estimated_departure: scheduled.estimated_departure.format(TIME_FORMAT).to_string(),
            stop: scheduled.stop,
        }
    }
}

/// Response from route optimization.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub optimized_stops: Vec<OptimizedStop>,

    /// Human-readable note on how the route was produced
    pub message: String,

    pub source_engine: Engine,
}

impl OptimizeResponse {
    pub fn from_result(result: OptimizationResult) -> Self {
        Self {
            optimized_stops: result
                .ordered_stops
                .into_iter()
                .map(OptimizedStop::from_scheduled)
                .collect(),
            message: result.source_engine.message().to_string(),
            source_engine: result.source_engine,
        }
    }
}

/// Response when a tracking session is created.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
}

/// Replace a session's active stops.
#[derive(Debug, Deserialize)]
pub struct ReplaceStopsRequest {
    pub stops: Vec<Stop>,
}

/// Enter or leave active navigation mode.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Result of feeding one position sample.
#[derive(Debug, Serialize)]
pub struct PositionResponse {
    /// The arrival this sample triggered, if any
    pub event: Option<ArrivalEvent>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
