//! Live tracking sessions.
//!
//! Each session owns its own [`ProximityDetector`] and active stop list.
//! Sessions live in a moka cache with a time-to-idle, so a vehicle that
//! stops reporting is forgotten without an explicit teardown. A per-session
//! mutex makes samples for one session run strictly one after another,
//! while different sessions proceed independently.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::Stop;
use crate::proximity::{ArrivalEvent, GeofenceConfig, PositionSample, ProximityDetector};

/// Identifier of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(SessionId)
            .map_err(|_| TrackingError::InvalidSessionId(s.to_string()))
    }
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackingError {
    /// No live session with this id (never created, removed, or expired)
    #[error("unknown tracking session: {0}")]
    UnknownSession(SessionId),

    /// The id could not be parsed
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),
}

/// Configuration for the session registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Sessions with no activity for this long are dropped.
    pub idle_timeout: Duration,

    /// Maximum number of live sessions.
    pub max_sessions: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
        }
    }
}

/// One tracked vehicle.
#[derive(Debug)]
struct Session {
    detector: ProximityDetector,
    stops: Vec<Stop>,
}

type SessionEntry = Arc<Mutex<Session>>;

/// Registry of live tracking sessions.
pub struct SessionRegistry {
    sessions: MokaCache<SessionId, SessionEntry>,
    geofence: GeofenceConfig,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Create a registry whose sessions use `geofence`.
    pub fn new(geofence: GeofenceConfig, config: &RegistryConfig) -> Self {
        let sessions = MokaCache::builder()
            .time_to_idle(config.idle_timeout)
            .max_capacity(config.max_sessions)
            .build();

        Self {
            sessions,
            geofence,
            next_id: AtomicU64::new(1),
        }
    }

    /// Start a new session in active navigation mode with no stops.
    pub async fn create(&self) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session {
            detector: ProximityDetector::new(self.geofence.clone()),
            stops: Vec::new(),
        };
        self.sessions.insert(id, Arc::new(Mutex::new(session))).await;
        info!(session = %id, "tracking session started");
        id
    }

    async fn entry(&self, id: SessionId) -> Result<SessionEntry, TrackingError> {
        self.sessions
            .get(&id)
            .await
            .ok_or(TrackingError::UnknownSession(id))
    }

    /// Whether a live session has this id.
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Replace the session's active stop list.
    pub async fn replace_stops(&self, id: SessionId, stops: Vec<Stop>) -> Result<(), TrackingError> {
        let entry = self.entry(id).await?;
        let mut session = entry.lock().await;
        debug!(session = %id, stops = stops.len(), "replacing active stops");
        session.stops = stops;
        Ok(())
    }

    /// Enter or leave active navigation mode.
    pub async fn set_active(&self, id: SessionId, active: bool) -> Result<(), TrackingError> {
        let entry = self.entry(id).await?;
        entry.lock().await.detector.set_active(active);
        Ok(())
    }

    /// Feed one position sample to the session's detector.
    pub async fn observe(
        &self,
        id: SessionId,
        sample: PositionSample,
    ) -> Result<Option<ArrivalEvent>, TrackingError> {
        let entry = self.entry(id).await?;
        let mut session = entry.lock().await;
        let Session { detector, stops } = &mut *session;
        Ok(detector.observe(&sample, stops))
    }

    /// End a session.
    pub async fn remove(&self, id: SessionId) -> Result<(), TrackingError> {
        match self.sessions.remove(&id).await {
            Some(_) => {
                info!(session = %id, "tracking session ended");
                Ok(())
            }
            None => Err(TrackingError::UnknownSession(id)),
        }
    }
}
