//! Application state for the web layer.

use std::sync::Arc;

use crate::directions::DirectionsClient;
use crate::sequencer::Planner;
use crate::tracking::SessionRegistry;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Itinerary planner (remote provider optional)
    pub planner: Arc<Planner<DirectionsClient>>,

    /// Live tracking sessions
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: Planner<DirectionsClient>, sessions: SessionRegistry) -> Self {
        Self {
            planner: Arc::new(planner),
            sessions: Arc::new(sessions),
        }
    }
}
