//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::directions::{DEFAULT_BASE_URL, DirectionsConfig};
use crate::eta::EtaConfig;
use crate::proximity::GeofenceConfig;
use crate::sequencer::SequencerConfig;
use crate::tracking::RegistryConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// An environment variable held a value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name}: {value:?} ({reason})")]
pub struct ConfigError {
    name: &'static str,
    value: String,
    reason: String,
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` when no API key is set; planning then always runs locally.
    pub directions: Option<DirectionsConfig>,
    pub sequencer: SequencerConfig,
    pub eta: EtaConfig,
    pub geofence: GeofenceConfig,
    pub registry: RegistryConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let timeout_secs: u64 = parse_or(&lookup, "DIRECTIONS_TIMEOUT_SECS", Some(10))?;
        let directions = lookup("DIRECTIONS_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                DirectionsConfig::new(key)
                    .with_base_url(
                        lookup("DIRECTIONS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                    )
                    .with_timeout(timeout_secs)
            });

        // Leave a little room past the HTTP timeout before abandoning the call.
        let sequencer =
            SequencerConfig::default().with_provider_deadline(timeout_secs.saturating_add(1));

        let radius_m: f64 = parse_or(&lookup, "GEOFENCE_RADIUS_M", Some(100.0))?;
        if !(radius_m.is_finite() && radius_m > 0.0) {
            return Err(ConfigError {
                name: "GEOFENCE_RADIUS_M",
                value: radius_m.to_string(),
                reason: "must be a positive number of meters".to_string(),
            });
        }

        let idle_secs: u64 = parse_or(&lookup, "TRACKING_IDLE_SECS", Some(30 * 60))?;

        Ok(Self {
            bind_addr,
            directions,
            sequencer,
            eta: EtaConfig::default(),
            geofence: GeofenceConfig::default().with_radius(radius_m),
            registry: RegistryConfig {
                idle_timeout: Duration::from_secs(idle_secs),
                ..RegistryConfig::default()
            },
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            name,
            value: value.clone(),
            reason: e.to_string(),
        }),
        None => default.ok_or_else(|| ConfigError {
            name,
            value: String::new(),
            reason: "missing".to_string(),
        }),
    }
}
