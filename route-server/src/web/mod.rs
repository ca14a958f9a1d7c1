//! Web layer for the route server.
//!
//! Provides HTTP endpoints for optimizing itineraries and for feeding live
//! positions to tracking sessions.

mod dto;
mod routes;
mod state;

#[cfg(test)]
mod routes_tests;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
