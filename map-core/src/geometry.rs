//! Geometry values exchanged with the geometry engine.
//!
//! These are plain data: the core never measures or projects them itself,
//! it only stores them in layers and hands them to the engine.

use serde::{Deserialize, Serialize};

/// A position in the map projection.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    /// Easting (projection units).
    pub x: f64,
    /// Northing (projection units).
    pub y: f64,
}

impl Coordinate {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another coordinate in projection units.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.x, c.y]
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Axis-aligned bounding box in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
}

impl Extent {
    /// Bounding box of a set of coordinates, `None` when the set is empty.
    #[must_use]
    pub fn from_coordinates<'a>(
        coordinates: impl IntoIterator<Item = &'a Coordinate>,
    ) -> Option<Self> {
        let mut iter = coordinates.into_iter();
        let first = iter.next()?;
        let mut extent = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for c in iter {
            extent.min_x = extent.min_x.min(c.x);
            extent.min_y = extent.min_y.min(c.y);
            extent.max_x = extent.max_x.max(c.x);
            extent.max_y = extent.max_y.max(c.y);
        }
        Some(extent)
    }

    /// Width in projection units.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in projection units.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Drawable geometry carried by a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    /// A single position.
    Point {
        /// The position.
        coordinate: Coordinate,
    },

    /// An open polyline.
    LineString {
        /// Vertices in drawing order.
        coordinates: Vec<Coordinate>,
    },

    /// A polygon with a single exterior ring. The ring is closed implicitly.
    Polygon {
        /// Ring vertices in drawing order, without a repeated closing vertex.
        ring: Vec<Coordinate>,
    },

    /// A circle, used for the accuracy envelope.
    Circle {
        /// Circle center.
        center: Coordinate,
        /// Radius in projection units.
        radius: f64,
    },
}

impl Geometry {
    /// Point geometry.
    #[must_use]
    pub const fn point(coordinate: Coordinate) -> Self {
        Self::Point { coordinate }
    }

    /// Line string geometry.
    #[must_use]
    pub fn line_string(coordinates: Vec<Coordinate>) -> Self {
        Self::LineString { coordinates }
    }

    /// Polygon geometry. A trailing vertex equal to the first one is dropped.
    #[must_use]
    pub fn polygon(mut ring: Vec<Coordinate>) -> Self {
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        Self::Polygon { ring }
    }

    /// Circle geometry.
    #[must_use]
    pub const fn circle(center: Coordinate, radius: f64) -> Self {
        Self::Circle { center, radius }
    }

    /// Lowercase name of the geometry type, for logs and errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::LineString { .. } => "line_string",
            Self::Polygon { .. } => "polygon",
            Self::Circle { .. } => "circle",
        }
    }

    /// Bounding box, `None` for an empty line string or polygon.
    #[must_use]
    pub fn extent(&self) -> Option<Extent> {
        match self {
            Self::Point { coordinate } => Extent::from_coordinates(std::iter::once(coordinate)),
            Self::LineString { coordinates } => Extent::from_coordinates(coordinates),
            Self::Polygon { ring } => Extent::from_coordinates(ring),
            Self::Circle { center, radius } => Some(Extent {
                min_x: center.x - radius,
                min_y: center.y - radius,
                max_x: center.x + radius,
                max_y: center.y + radius,
            }),
        }
    }
}
