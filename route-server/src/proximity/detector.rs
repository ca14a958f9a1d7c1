//! Arrival detection from a stream of vehicle positions.
//!
//! Each stop is surrounded by a geofence of `radius_m`. The first sample
//! inside the fence reports an arrival and arms the stop; it cannot report
//! again until a sample lands beyond `radius_m * clear_factor`. Across all
//! stops, alerts are at least `min_alert_interval_ms` apart, and each sample
//! produces at most one alert.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Coordinate, Stop, StopId, haversine_meters};

use super::state::ProximityState;

/// Geofence parameters.
#[derive(Debug, Clone)]
pub struct GeofenceConfig {
    /// Arrival radius around each stop (meters).
    pub radius_m: f64,

    /// Multiple of the radius the vehicle must pass to re-arm a stop.
    pub clear_factor: f64,

    /// Minimum time between any two alerts (milliseconds).
    pub min_alert_interval_ms: i64,
}

impl GeofenceConfig {
    /// Distance beyond which an armed stop is cleared.
    pub fn clear_radius_m(&self) -> f64 {
        self.radius_m * self.clear_factor
    }

    /// Returns the alert interval as a Duration.
    pub fn min_alert_interval(&self) -> Duration {
        Duration::milliseconds(self.min_alert_interval_ms)
    }

    /// Set the arrival radius.
    pub fn with_radius(mut self, meters: f64) -> Self {
        self.radius_m = meters;
        self
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            radius_m: 100.0,
            clear_factor: 1.2,
            min_alert_interval_ms: 5000,
        }
    }
}

/// One position report from the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(position: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            lat: position.lat,
            lng: position.lng,
            timestamp,
        }
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Reported when the vehicle reaches a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalEvent {
    pub stop_id: StopId,
    pub stop_order: u32,
    pub address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Geofence state machine for one tracked vehicle.
#[derive(Debug, Clone)]
pub struct ProximityDetector {
    config: GeofenceConfig,
    state: ProximityState,
    active: bool,
}

impl ProximityDetector {
    /// Create a detector in active navigation mode.
    pub fn new(config: GeofenceConfig) -> Self {
        Self {
            config,
            state: ProximityState::new(),
            active: true,
        }
    }

    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    pub fn state(&self) -> &ProximityState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pause or resume detection. State is kept while paused.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Drop state for a stop the caller has completed or removed.
    pub fn forget(&mut self, id: &StopId) {
        self.state.forget(id);
    }

    /// Feed one position sample against the current active stop list.
    ///
    /// Returns the arrival it triggers, if any. Invalid samples and samples
    /// received while inactive change nothing.
    pub fn observe(&mut self, sample: &PositionSample, stops: &[Stop]) -> Option<ArrivalEvent> {
        if !self.active {
            return None;
        }

        let position = sample.position();
        if !position.is_valid() {
            debug!(lat = sample.lat, lng = sample.lng, "dropping invalid position sample");
            return None;
        }

        let open: Vec<&Stop> = stops.iter().filter(|s| !s.is_completed).collect();
        let ids: HashSet<&StopId> = open.iter().map(|s| &s.id).collect();
        self.state.retain_active(&ids);

        let clear_radius = self.config.clear_radius_m();
        let mut event = None;

        for stop in open {
            if !stop.position().is_valid() {
                continue;
            }

            let distance = haversine_meters(position, stop.position());

            if distance > clear_radius {
                self.state.clear(&stop.id);
                continue;
            }

            if distance <= self.config.radius_m
                && event.is_none()
                && !self.state.is_armed(&stop.id)
                && self.may_alert(sample.timestamp)
            {
                self.state.arm(&stop.id);
                self.state.record_alert(sample.timestamp);
                info!(stop = %stop.id, order = stop.order, distance_m = distance, "arrived at stop");

                event = Some(ArrivalEvent {
                    stop_id: stop.id.clone(),
                    stop_order: stop.order,
                    address: stop.address.clone(),
                    timestamp: sample.timestamp,
                });
            }
        }

        event
    }

    fn may_alert(&self, now: DateTime<Utc>) -> bool {
        self.state
            .last_alert()
            .is_none_or(|last| now - last >= self.config.min_alert_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::offset_north;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn depot() -> Coordinate {
        Coordinate::new(40.7128, -74.0060)
    }

    fn stop_at(id: &str, position: Coordinate, order: u32) -> Stop {
        let mut stop = Stop::new(id, position.lat, position.lng).with_address(format!("{id} street"));
        stop.order = order;
        stop
    }

    /// Sample `meters` north of `stop` at time `secs`.
    fn near(stop: &Stop, meters: f64, secs: i64) -> PositionSample {
        PositionSample::new(offset_north(stop.position(), meters), t(secs))
    }

    #[test]
    fn enter_exit_reenter_fires_twice() {
        let stop = stop_at("a", depot(), 1);
        let stops = vec![stop.clone()];
        let mut detector = ProximityDetector::new(GeofenceConfig::default());

        let samples = [
            near(&stop, 500.0, 0),
            near(&stop, 90.0, 10),
            near(&stop, 40.0, 20),
            near(&stop, 110.0, 30), // inside the hysteresis band: still armed
            near(&stop, 60.0, 40),
            near(&stop, 150.0, 50), // clears
            near(&stop, 80.0, 60),
            near(&stop, 30.0, 70),
        ];

        let events: Vec<ArrivalEvent> = samples
            .iter()
            .filter_map(|s| detector.observe(s, &stops))
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, t(10));
        assert_eq!(events[1].timestamp, t(60));
        assert_eq!(events[0].stop_id.as_str(), "a");
        assert_eq!(events[0].stop_order, 1);
        assert_eq!(events[0].address.as_deref(), Some("a street"));
    }

    #[test]
    fn hysteresis_band_does_not_rearm() {
        let stop = stop_at("a", depot(), 1);
        let stops = vec![stop.clone()];
        let mut detector = ProximityDetector::new(GeofenceConfig::default());

        assert!(detector.observe(&near(&stop, 50.0, 0), &stops).is_some());
        // Oscillating around the radius, never past 120 m
        for (i, m) in [101.0, 99.0, 115.0, 95.0, 119.0, 10.0].iter().enumerate() {
            let secs = 10 * (i as i64 + 1);
            assert!(detector.observe(&near(&stop, *m, secs), &stops).is_none());
        }
    }

    #[test]
    fn rate_limit_spaces_clustered_stops() {
        let a = stop_at("a", depot(), 1);
        let b = stop_at("b", offset_north(depot(), 20.0), 2);
        let stops = vec![a.clone(), b.clone()];
        let mut detector = ProximityDetector::new(GeofenceConfig::default());

        let first = detector.observe(&near(&a, 5.0, 0), &stops).unwrap();
        assert_eq!(first.stop_id.as_str(), "a");

        // b is inside the fence but the last alert was 2 s ago
        assert!(detector.observe(&near(&a, 5.0, 2), &stops).is_none());
        assert!(!detector.state().is_armed(&b.id));

        let second = detector.observe(&near(&a, 5.0, 5), &stops).unwrap();
        assert_eq!(second.stop_id.as_str(), "b");
        assert!(second.timestamp - first.timestamp >= Duration::milliseconds(5000));
    }

    #[test]
    fn rate_limit_applies_across_stops_in_milliseconds() {
        let a = stop_at("a", depot(), 1);
        let b = stop_at("b", offset_north(depot(), 1_000.0), 2);
        let stops = vec![a.clone(), b.clone()];
        let mut detector = ProximityDetector::new(GeofenceConfig::default());

        let start = t(0);
        assert!(detector
            .observe(&PositionSample::new(a.position(), start), &stops)
            .is_some());

        let just_short = start + Duration::milliseconds(4_999);
        assert!(detector
            .observe(&PositionSample::new(b.position(), just_short), &stops)
            .is_none());

        let exactly = start + Duration::milliseconds(5_000);
        assert!(detector
            .observe(&PositionSample::new(b.position(), exactly), &stops)
            .is_some());
    }

    #[test]
    fn inactive_detector_is_silent_and_keeps_state() {
        let stop = stop_at("a", depot(), 1);
        let stops = vec![stop.clone()];
        let mut detector = ProximityDetector::new(GeofenceConfig::default());

        assert!(detector.observe(&near(&stop, 10.0, 0), &stops).is_some());
        detector.set_active(false);

        // Moving far away while paused does not clear the stop...
        assert!(detector.observe(&near(&stop, 1_000.0, 10), &stops).is_none());
        assert!(detector.state().is_armed(&stop.id));

        // ...so coming back after resuming does not re-fire.
        detector.set_active(true);
        assert!(detector.observe(&near(&stop, 10.0, 20), &stops).is_none());
    }

    #[test]
    fn invalid_samples_are_ignored() {
        let stop = stop_at("a", depot(), 1);
        let stops = vec![stop.clone()];
        let mut detector = ProximityDetector::new(GeofenceConfig::default());
        assert!(detector.observe(&near(&stop, 10.0, 0), &stops).is_some());

        let bad = [
            PositionSample { lat: f64::NAN, lng: 0.0, timestamp: t(10) },
            PositionSample { lat: 0.0, lng: f64::INFINITY, timestamp: t(20) },
            PositionSample { lat: 123.0, lng: 0.0, timestamp: t(30) },
        ];
        for sample in &bad {
            assert!(detector.observe(sample, &stops).is_none());
        }
        // None of them cleared the armed stop or moved the alert clock
        assert!(detector.state().is_armed(&stop.id));
        assert_eq!(detector.state().last_alert(), Some(t(0)));
    }

    #[test]
    fn completed_and_removed_stops_are_dropped() {
        let a = stop_at("a", depot(), 1);
        let b = stop_at("b", offset_north(depot(), 2_000.0), 2);
        let mut detector = ProximityDetector::new(GeofenceConfig::default());

        assert!(detector.observe(&near(&a, 0.0, 0), &[a.clone(), b.clone()]).is_some());
        assert_eq!(detector.state().tracked(), 2);

        let mut done = a.clone();
        done.is_completed = true;
        assert!(detector.observe(&near(&a, 0.0, 10), &[done, b.clone()]).is_none());
        assert_eq!(detector.state().tracked(), 1);
        assert!(!detector.state().is_armed(&a.id));

        assert!(detector.observe(&near(&a, 0.0, 20), &[b.clone()]).is_none());
        detector.forget(&b.id);
        assert_eq!(detector.state().tracked(), 0);
    }

    #[test]
    fn at_most_one_event_per_sample() {
        let a = stop_at("a", depot(), 1);
        let b = stop_at("b", depot(), 2);
        let stops = vec![a.clone(), b];
        let mut detector = ProximityDetector::new(GeofenceConfig::default());

        let event = detector.observe(&near(&a, 0.0, 0), &stops).unwrap();
        assert_eq!(event.stop_id.as_str(), "a");
        assert_eq!(detector.state().last_alert(), Some(t(0)));
    }

    #[test]
    fn custom_radius() {
        let stop = stop_at("a", depot(), 1);
        let stops = vec![stop.clone()];
        let mut detector = ProximityDetector::new(GeofenceConfig::default().with_radius(30.0));

        assert!(detector.observe(&near(&stop, 50.0, 0), &stops).is_none());
        assert!(detector.observe(&near(&stop, 25.0, 10), &stops).is_some());
        assert!((detector.config().clear_radius_m() - 36.0).abs() < 1e-9);
    }

    #[test]
    fn sample_wire_format() {
        let sample: PositionSample = serde_json::from_str(
            r#"{"lat": 1.5, "lng": 2.5, "timestamp": "2024-03-15T09:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(sample.position(), Coordinate::new(1.5, 2.5));

        let event = ArrivalEvent {
            stop_id: StopId::new("s"),
            stop_order: 3,
            address: None,
            timestamp: sample.timestamp,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["stopId"], "s");
        assert_eq!(value["stopOrder"], 3);
        assert_eq!(value["timestamp"], "2024-03-15T09:00:00Z");
    }
}
