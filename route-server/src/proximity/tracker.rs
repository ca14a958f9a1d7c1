//! Channel-driven tracking task.
//!
//! A [`Tracker`] owns one [`ProximityDetector`] inside a tokio task. Inputs
//! arrive over an mpsc channel and are processed one at a time in the order
//! sent; arrivals go out on a second channel. Dropping every
//! [`TrackerHandle`] ends the task.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::Stop;

use super::detector::{ArrivalEvent, PositionSample, ProximityDetector};

/// Message sent to a running tracker.
#[derive(Debug, Clone)]
pub enum TrackerInput {
    /// A new vehicle position.
    Position(PositionSample),
    /// Replace the active stop list.
    Stops(Vec<Stop>),
    /// Enter or leave active navigation mode.
    SetActive(bool),
}

/// The tracking task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("tracker has shut down")]
pub struct TrackerClosed;

/// Sending side of a tracker.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    inputs: mpsc::Sender<TrackerInput>,
}

impl TrackerHandle {
    pub async fn send(&self, input: TrackerInput) -> Result<(), TrackerClosed> {
        self.inputs.send(input).await.map_err(|_| TrackerClosed)
    }

    pub async fn position(&self, sample: PositionSample) -> Result<(), TrackerClosed> {
        self.send(TrackerInput::Position(sample)).await
    }

    pub async fn stops(&self, stops: Vec<Stop>) -> Result<(), TrackerClosed> {
        self.send(TrackerInput::Stops(stops)).await
    }

    pub async fn set_active(&self, active: bool) -> Result<(), TrackerClosed> {
        self.send(TrackerInput::SetActive(active)).await
    }
}

/// A spawned tracking task.
pub struct Tracker {
    pub handle: TrackerHandle,
    pub events: mpsc::Receiver<ArrivalEvent>,
    /// Resolves to the detector once every handle has been dropped.
    pub task: JoinHandle<ProximityDetector>,
}

impl Tracker {
    /// Spawn a tracking task with channels of capacity `buffer`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(detector: ProximityDetector, buffer: usize) -> Self {
        let (input_tx, input_rx) = mpsc::channel(buffer);
        let (event_tx, event_rx) = mpsc::channel(buffer);
        let task = tokio::spawn(run(detector, input_rx, event_tx));

        Self {
            handle: TrackerHandle { inputs: input_tx },
            events: event_rx,
            task,
        }
    }
}

async fn run(
    mut detector: ProximityDetector,
    mut inputs: mpsc::Receiver<TrackerInput>,
    events: mpsc::Sender<ArrivalEvent>,
) -> ProximityDetector {
    let mut stops: Vec<Stop> = Vec::new();

    while let Some(input) = inputs.recv().await {
        match input {
            TrackerInput::Position(sample) => {
                let Some(event) = detector.observe(&sample, &stops) else {
                    continue;
                };
                if events.send(event).await.is_err() {
                    debug!("arrival receiver dropped; stopping tracker");
                    break;
                }
            }
            TrackerInput::Stops(new_stops) => stops = new_stops,
            TrackerInput::SetActive(active) => detector.set_active(active),
        }
    }

    detector
}
