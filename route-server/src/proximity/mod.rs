//! Arrival detection.
//!
//! Watches a vehicle's position stream against its active stops and reports
//! each arrival once, with hysteresis so a vehicle idling at the edge of a
//! geofence does not trigger repeatedly, and a global rate limit so
//! clustered stops do not produce bursts.
//!
//! State is owned per tracked vehicle: each [`ProximityDetector`] carries its
//! own [`ProximityState`], so concurrent sessions never share armed flags.

mod detector;
mod state;
mod tracker;

pub use detector::{ArrivalEvent, GeofenceConfig, PositionSample, ProximityDetector};
pub use state::ProximityState;
pub use tracker::{Tracker, TrackerClosed, TrackerHandle, TrackerInput};
