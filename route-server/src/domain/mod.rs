//! Domain types for the route server.
//!
//! Stops, coordinates, time windows and the geodesy primitives shared by
//! the sequencer, the ETA projector and the proximity detector.

mod error;
mod geo;
mod stop;
mod time_window;

pub use error::DomainError;
pub use geo::{
    Coordinate, EARTH_RADIUS_M, euclidean_degrees, haversine_meters, offset_north,
};
pub use stop::{Priority, Stop, StopId, renumber};
pub use time_window::{NO_WINDOW_MINUTES, TimeWindow, TimeWindowError};
