//! Directions API request/response shapes.
//!
//! The response types map to the Google Directions JSON API. Every field
//! the server does not strictly need is optional, since providers omit
//! fields rather than sending nulls.

use serde::Deserialize;

use crate::domain::Coordinate;

/// A request for an optimized driving route.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    /// Intermediate waypoints; the provider may reorder these.
    pub waypoints: Vec<Coordinate>,
    pub avoid_tolls: bool,
}

impl DirectionsRequest {
    /// Query parameters, excluding the API key.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("origin", self.origin.to_query()),
            ("destination", self.destination.to_query()),
            ("mode", "driving".to_string()),
            ("departure_time", "now".to_string()),
        ];

        if !self.waypoints.is_empty() {
            let mut waypoints = String::from("optimize:true");
            for waypoint in &self.waypoints {
                waypoints.push('|');
                waypoints.push_str(&waypoint.to_query());
            }
            pairs.push(("waypoints", waypoints));
        }

        if self.avoid_tolls {
            pairs.push(("avoid", "tolls".to_string()));
        }

        pairs
    }
}

/// Top-level directions response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// "OK" on success; "ZERO_RESULTS", "MAX_WAYPOINTS_EXCEEDED", etc. otherwise.
    pub status: String,

    #[serde(default)]
    pub routes: Vec<Route>,

    /// Human-readable detail accompanying a non-OK status.
    pub error_message: Option<String>,
}

/// One candidate route.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    /// Optimized order of the request's intermediate waypoints, by index.
    pub waypoint_order: Option<Vec<usize>>,

    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// A leg between two consecutive route points.
#[derive(Debug, Clone, Deserialize)]
pub struct Leg {
    pub duration: Option<ValueText>,
    pub duration_in_traffic: Option<ValueText>,
    pub distance: Option<ValueText>,
}

/// A numeric value with its display text.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueText {
    pub value: u64,
    pub text: Option<String>,
}

/// The parts of a successful response the sequencer uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedRoute {
    /// A permutation of `0..waypoints.len()`.
    pub waypoint_order: Vec<usize>,
    /// Sum of leg durations, preferring traffic-aware values.
    pub total_duration_secs: u64,
    pub total_distance_m: u64,
}
