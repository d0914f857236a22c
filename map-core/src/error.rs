//! Error types for map widget operations.

use thiserror::Error;

use crate::engine::EngineError;
use crate::location::LocationError;

/// Result type for map widget operations.
pub type MapResult<T> = Result<T, MapError>;

/// Errors that can occur in map widget operations.
#[derive(Debug, Error)]
pub enum MapError {
    /// Unknown layer role, or a role used with an operation it does not support.
    #[error("Invalid layer: {0}")]
    InvalidLayer(String),

    /// The platform location capability is unavailable or was denied.
    #[error("Location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    /// Failure reported by the geometry/rendering engine.
    #[error("Geometry engine error: {0}")]
    Engine(#[from] EngineError),

    /// A position fix with a negative or non-finite accuracy or coordinate.
    #[error("Invalid position fix: {0}")]
    InvalidFix(String),

    /// Map configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The geolocation stream was stopped and cannot be restarted.
    #[error("Geolocation tracker stopped and cannot be restarted")]
    TrackerStopped,

    /// The widget has been torn down.
    #[error("Map widget has been torn down")]
    TornDown,

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
