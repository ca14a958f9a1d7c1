//! Remote directions/optimization provider.
//!
//! This module provides an HTTP client for a Google-compatible directions
//! API, used to get a traffic-aware ordering of a route's stops.
//!
//! Key characteristics of the provider:
//! - Only the intermediate waypoints are reordered; origin and destination
//!   stay fixed
//! - The optimized order comes back as `waypoint_order`, a permutation of
//!   the waypoint indices in the request
//! - A response can be HTTP 200 and still carry a failure `status`

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, DirectionsClient, DirectionsConfig, DirectionsProvider};
pub use convert::optimized_route;
pub(crate) use convert::validate_permutation;
pub use error::DirectionsError;
pub use types::{DirectionsRequest, DirectionsResponse, Leg, OptimizedRoute, Route, ValueText};
