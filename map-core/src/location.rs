//! Position fixes and the platform geolocation contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Coordinate, MapError, MapResult};

/// Why the platform could not provide positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user or platform denied location access.
    #[error("permission denied")]
    PermissionDenied,

    /// No location capability on this device.
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    /// The platform did not answer in time.
    #[error("timed out")]
    Timeout,
}

/// Identifier of an active platform position watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(u32);

impl WatchId {
    /// Wrap a raw platform watch identifier.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Options passed when starting a position watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackingOptions {
    /// Request the most accurate positioning the device offers.
    pub enable_high_accuracy: bool,
}

/// Platform geolocation capability.
///
/// Fixes produced by an active watch are delivered to the widget as
/// [`MapEvent::PositionChanged`](crate::MapEvent::PositionChanged).
pub trait LocationSource {
    /// Begin continuous position updates.
    ///
    /// # Errors
    ///
    /// Returns an error if location is unavailable or denied.
    fn watch(&mut self, options: TrackingOptions) -> Result<WatchId, LocationError>;

    /// Stop a watch. Unknown ids are ignored.
    fn clear_watch(&mut self, watch: WatchId);
}

/// One geolocation observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PositionFixRecord")]
pub struct PositionFix {
    coordinate: Coordinate,
    accuracy_m: f64,
    timestamp_ms: u64,
}

#[derive(Deserialize)]
struct PositionFixRecord {
    coordinate: Coordinate,
    accuracy_m: f64,
    #[serde(default)]
    timestamp_ms: u64,
}

impl TryFrom<PositionFixRecord> for PositionFix {
    type Error = MapError;

    fn try_from(record: PositionFixRecord) -> Result<Self, Self::Error> {
        Self::new(record.coordinate, record.accuracy_m, record.timestamp_ms)
    }
}

impl PositionFix {
    /// Create a fix.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidFix`] if the coordinate is not finite or the
    /// accuracy is negative or not finite.
    pub fn new(coordinate: Coordinate, accuracy_m: f64, timestamp_ms: u64) -> MapResult<Self> {
        if !coordinate.is_finite() {
            return Err(MapError::InvalidFix(format!("non-finite coordinate {coordinate:?}")));
        }
        if !accuracy_m.is_finite() || accuracy_m < 0.0 {
            return Err(MapError::InvalidFix(format!("accuracy must be >= 0, got {accuracy_m}")));
        }
        Ok(Self {
            coordinate,
            accuracy_m,
            timestamp_ms,
        })
    }

    /// Reported position.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Accuracy radius in meters.
    #[must_use]
    pub const fn accuracy_m(&self) -> f64 {
        self.accuracy_m
    }

    /// Observation time in milliseconds.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}
