//! Directions HTTP client.
//!
//! Provides an async method for asking a Google-compatible directions API
//! to optimize the order of a route's waypoints.

use std::future::Future;

use tracing::debug;

use super::convert::optimized_route;
use super::error::DirectionsError;
use super::types::{DirectionsRequest, DirectionsResponse, OptimizedRoute};

/// Default base URL for the directions API.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Something that can optimize the order of intermediate waypoints.
///
/// This abstraction allows the sequencer to be tested without network access.
pub trait DirectionsProvider: Send + Sync {
    /// Ask for an optimized route through `request.waypoints`.
    fn optimize(
        &self,
        request: &DirectionsRequest,
    ) -> impl Future<Output = Result<OptimizedRoute, DirectionsError>> + Send;
}

/// Configuration for the directions client.
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to Google Maps)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectionsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Directions API client.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DirectionsClient {
    /// Create a new directions client with the given configuration.
    pub fn new(config: DirectionsConfig) -> Result<Self, DirectionsError> {
        if config.api_key.trim().is_empty() {
            return Err(DirectionsError::NotConfigured(
                "directions API key is empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Fetch and validate an optimized route.
    pub async fn get_optimized_route(
        &self,
        request: &DirectionsRequest,
    ) -> Result<OptimizedRoute, DirectionsError> {
        let url = format!("{}/directions/json", self.base_url);

        let mut query = request.query_pairs();
        query.push(("key", self.api_key.clone()));

        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(DirectionsError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| DirectionsError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        let route = optimized_route(parsed, request.waypoints.len())?;
        debug!(
            waypoints = request.waypoints.len(),
            duration_secs = route.total_duration_secs,
            distance_m = route.total_distance_m,
            "directions provider returned optimized route"
        );
        Ok(route)
    }
}

impl DirectionsProvider for DirectionsClient {
    async fn optimize(
        &self,
        request: &DirectionsRequest,
    ) -> Result<OptimizedRoute, DirectionsError> {
        self.get_optimized_route(request).await
    }
}
