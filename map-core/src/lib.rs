//! # Saorsa Map Core
//!
//! Interactive map state machine: marker placement, live position with an
//! accuracy envelope, and point/line/polygon drawing with length and area
//! reporting.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    MapWidget                     │
//! ├────────────────────────┬─────────────────────────┤
//! │ InteractionController  │  GeolocationTracker     │
//! │ - tool selection       │  - position watch       │
//! │ - draw sessions        │  - live + accuracy      │
//! │ - marker placement     │  - recenter policy      │
//! ├────────────────────────┼─────────────────────────┤
//! │ LayerManager           │  MeasurementReporter    │
//! │ - single / append      │  - length / area        │
//! │ - clear                │  - subscribers          │
//! ├────────────────────────┴─────────────────────────┤
//! │  GeometryEngine trait   │  LocationSource trait  │
//! └──────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layer;
pub mod location;
pub mod measure;
pub mod tracker;
pub mod widget;

#[cfg(test)]
mod test_support;

pub use config::{MapConfig, ViewOptions};
pub use controller::{ClickOutcome, DrawOutcome, DrawTool, InteractionController};
pub use engine::{
    Cursor, DrawShape, EngineError, EngineResult, GeometryEngine, HandleId, Padding,
};
pub use error::{MapError, MapResult};
pub use event::{EventOutcome, MapEvent};
pub use geometry::{Coordinate, Extent, Geometry};
pub use layer::{Feature, FeatureId, FeatureLayer, LayerManager, LayerRole};
pub use location::{LocationError, LocationSource, PositionFix, TrackingOptions, WatchId};
pub use measure::{Measurement, MeasurementCallback, MeasurementKind, MeasurementReporter};
pub use tracker::{GeolocationTracker, TrackerState};
pub use widget::MapWidget;

/// Map core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
