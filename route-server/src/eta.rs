//! Arrival and departure estimates for a sequenced itinerary.
//!
//! Travel time is derived from straight-line degree distance, scaled to
//! kilometers with the equatorial 111 km/degree approximation and a flat
//! minutes-per-km pace. Every stop then holds the vehicle for a fixed
//! service time.

use chrono::{Duration, NaiveDateTime};

use crate::domain::{Coordinate, Stop, euclidean_degrees};

/// Parameters for ETA projection.
#[derive(Debug, Clone)]
pub struct EtaConfig {
    /// Kilometers per degree of straight-line distance.
    pub km_per_degree: f64,

    /// Driving pace in minutes per kilometer.
    pub minutes_per_km: f64,

    /// Time spent at each stop (minutes).
    pub service_mins: i64,
}

impl EtaConfig {
    /// Returns the service time as a Duration.
    pub fn service_time(&self) -> Duration {
        Duration::minutes(self.service_mins)
    }

    /// Estimated driving time between two points.
    pub fn travel_time(&self, from: Coordinate, to: Coordinate) -> Duration {
        let km = euclidean_degrees(from, to) * self.km_per_degree;
        let minutes = km * self.minutes_per_km;
        Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            km_per_degree: 111.0,
            minutes_per_km: 3.0,
            service_mins: 5,
        }
    }
}

/// A stop with its projected arrival and departure.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledStop {
    pub stop: Stop,
    pub estimated_arrival: NaiveDateTime,
    pub estimated_departure: NaiveDateTime,
}

/// Projects arrival/departure times along an ordered stop list.
#[derive(Debug, Clone, Default)]
pub struct EtaProjector {
    config: EtaConfig,
}

impl EtaProjector {
    pub fn new(config: EtaConfig) -> Self {
        Self { config }
    }

    /// Attach estimates to `stops`, in order, starting from `origin` at `start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use route_server::domain::{Coordinate, Stop};
    /// use route_server::eta::EtaProjector;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 3, 15)
    ///     .unwrap()
    ///     .and_hms_opt(9, 0, 0)
    ///     .unwrap();
    /// // 0.1 degrees = 11.1 km = 33.3 minutes of driving
    /// let stops = vec![Stop::new("a", 0.1, 0.0)];
    /// let scheduled = EtaProjector::default().project(stops, Coordinate::new(0.0, 0.0), start);
    ///
    /// assert_eq!(scheduled[0].estimated_arrival.format("%H:%M:%S").to_string(), "09:33:18");
    /// assert_eq!(scheduled[0].estimated_departure.format("%H:%M:%S").to_string(), "09:38:18");
    /// ```
    pub fn project(
        &self,
        stops: Vec<Stop>,
        origin: Coordinate,
        start: NaiveDateTime,
    ) -> Vec<ScheduledStop> {
        let service = self.config.service_time();
        let mut clock = start;
        let mut previous = origin;

        stops
            .into_iter()
            .map(|stop| {
                clock = advance(clock, self.config.travel_time(previous, stop.position()));
                let estimated_arrival = clock;
                clock = advance(clock, service);
                previous = stop.position();

                ScheduledStop {
                    stop,
                    estimated_arrival,
                    estimated_departure: clock,
                }
            })
            .collect()
    }
}

fn advance(clock: NaiveDateTime, by: Duration) -> NaiveDateTime {
    clock.checked_add_signed(by).unwrap_or(NaiveDateTime::MAX)
}
