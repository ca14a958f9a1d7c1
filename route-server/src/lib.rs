//! Single-vehicle route server.
//!
//! Orders a set of stops into a time-annotated itinerary, asking a remote
//! directions provider for a traffic-aware order when one is configured and
//! falling back to a local heuristic otherwise, then watches the vehicle's
//! live position to report each arrival exactly once.

pub mod config;
pub mod directions;
pub mod domain;
pub mod eta;
pub mod proximity;
pub mod sequencer;
pub mod tracking;
pub mod web;
