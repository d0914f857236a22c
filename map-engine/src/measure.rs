//! Planar length and area in projection units.
//!
//! Web mercator distances are only true meters near the equator; these
//! formulas measure in the projection like the rendering library the widget
//! was modelled on.

use map_core::{EngineError, EngineResult, Geometry};

/// Sum of segment lengths of a line string.
///
/// # Errors
///
/// Returns an error for anything but a line string.
pub fn length(geometry: &Geometry) -> EngineResult<f64> {
    match geometry {
        Geometry::LineString { coordinates } => Ok(coordinates
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()),
        other => Err(EngineError::UnsupportedShape(format!(
            "length of a {}",
            other.type_name()
        ))),
    }
}

/// Absolute area of a polygon (shoelace) or circle.
///
/// # Errors
///
/// Returns an error for points and line strings.
pub fn area(geometry: &Geometry) -> EngineResult<f64> {
    match geometry {
        Geometry::Polygon { ring } => {
            if ring.len() < 3 {
                return Ok(0.0);
            }
            let twice: f64 = ring
                .iter()
                .zip(ring.iter().cycle().skip(1))
                .map(|(a, b)| a.x * b.y - b.x * a.y)
                .sum();
            Ok(twice.abs() / 2.0)
        }
        Geometry::Circle { radius, .. } => Ok(std::f64::consts::PI * radius * radius),
        other => Err(EngineError::UnsupportedShape(format!(
            "area of a {}",
            other.type_name()
        ))),
    }
}
