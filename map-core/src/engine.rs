//! Contract required from the geometry/rendering engine.
//!
//! The core never projects, measures or draws anything itself. A backend
//! (canvas, GPU, server-side) implements [`GeometryEngine`] and the widget
//! drives it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ViewOptions;
use crate::{Extent, FeatureLayer, Geometry};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported by a geometry engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine cannot handle this shape or geometry kind.
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// The interaction handle is not known to the engine.
    #[error("Unknown interaction handle: {0}")]
    UnknownHandle(HandleId),

    /// A draw session does not yet have enough vertices for its shape.
    #[error("Incomplete geometry: {0}")]
    IncompleteGeometry(String),

    /// View adjustment failed.
    #[error("View error: {0}")]
    View(String),

    /// Layer composition failed.
    #[error("Composition error: {0}")]
    Composition(String),
}

/// Opaque reference to one interactive draw session inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    /// Wrap a raw engine-issued value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "draw-{}", self.0)
    }
}

/// Shape an interactive draw session produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawShape {
    /// A single point.
    Point,
    /// An open polyline.
    LineString,
    /// A closed polygon.
    Polygon,
}

impl DrawShape {
    /// Whether `geometry` is the kind this shape produces.
    #[must_use]
    pub const fn matches(self, geometry: &Geometry) -> bool {
        matches!(
            (self, geometry),
            (Self::Point, Geometry::Point { .. })
                | (Self::LineString, Geometry::LineString { .. })
                | (Self::Polygon, Geometry::Polygon { .. })
        )
    }
}

/// Pointer indicator shown over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    /// Regular pointer.
    #[default]
    Default,
    /// Drawing indicator while a draw tool is active.
    Crosshair,
}

/// Pixel insets applied when fitting the view to a geometry.
///
/// Serialized as `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Padding {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Left inset.
    pub left: f64,
}

impl Padding {
    /// Same inset on every side.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Whether every inset is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl From<[f64; 4]> for Padding {
    fn from([top, right, bottom, left]: [f64; 4]) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl From<Padding> for [f64; 4] {
    fn from(p: Padding) -> Self {
        [p.top, p.right, p.bottom, p.left]
    }
}

/// Capabilities the widget needs from a geometry/rendering engine.
pub trait GeometryEngine {
    /// Start an interactive draw session and return its handle.
    ///
    /// The session emits exactly one finished geometry, delivered to the
    /// widget as [`MapEvent::DrawFinished`](crate::MapEvent::DrawFinished).
    ///
    /// Handles must be unique for the lifetime of the engine and never reused,
    /// even after [`release_draw`](Self::release_draw). A late completion is
    /// recognised as stale only by comparing its handle with the active one.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is not supported.
    fn begin_draw(&mut self, shape: DrawShape) -> EngineResult<HandleId>;

    /// Tear down a draw session, finished or not. Must not emit anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown.
    fn release_draw(&mut self, handle: HandleId) -> EngineResult<()>;

    /// Length of a line geometry in meters.
    ///
    /// # Errors
    ///
    /// Returns an error for geometries without a length.
    fn length(&self, geometry: &Geometry) -> EngineResult<f64>;

    /// Area of a polygon geometry in square meters.
    ///
    /// # Errors
    ///
    /// Returns an error for geometries without an area.
    fn area(&self, geometry: &Geometry) -> EngineResult<f64>;

    /// Apply initial view center, zoom and zoom limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be configured.
    fn configure_view(&mut self, view: &ViewOptions) -> EngineResult<()>;

    /// Adjust the visible view to frame `extent` with `padding`.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be adjusted.
    fn fit_view(&mut self, extent: &Extent, padding: Padding) -> EngineResult<()>;

    /// Change the pointer indicator.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Composite the given layers, bottom to top, over the basemap.
    ///
    /// # Errors
    ///
    /// Returns an error if composition fails.
    fn compose(&mut self, layers: &[&FeatureLayer]) -> EngineResult<()>;
}
