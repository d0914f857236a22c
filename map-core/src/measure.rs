//! Measurement results and the reporter that publishes them.

use serde::{Deserialize, Serialize};

use crate::{DrawShape, GeometryEngine, Geometry, MapResult};

/// What a measurement describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Line length in meters.
    Length,
    /// Polygon area in square meters.
    Area,
}

/// Length or area of a just-completed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Length or area.
    pub kind: MeasurementKind,
    /// Precise value in meters or square meters.
    pub value: f64,
    /// `value` truncated toward zero, for display.
    pub truncated_display: i64,
}

impl Measurement {
    /// Create a measurement, truncating the display value toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Truncation is the display rule
    pub fn new(kind: MeasurementKind, value: f64) -> Self {
        Self {
            kind,
            value,
            truncated_display: value.trunc() as i64,
        }
    }

    /// Length measurement.
    #[must_use]
    pub fn length(value: f64) -> Self {
        Self::new(MeasurementKind::Length, value)
    }

    /// Area measurement.
    #[must_use]
    pub fn area(value: f64) -> Self {
        Self::new(MeasurementKind::Area, value)
    }

    /// Unit name for the display value.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self.kind {
            MeasurementKind::Length => "meters",
            MeasurementKind::Area => "square meters",
        }
    }

    /// Measure a finished geometry through the engine.
    ///
    /// Lines yield a length, polygons an area, points nothing.
    ///
    /// # Errors
    ///
    /// Propagates engine measurement failures.
    pub fn compute<E>(engine: &E, shape: DrawShape, geometry: &Geometry) -> MapResult<Option<Self>>
    where
        E: GeometryEngine + ?Sized,
    {
        let measurement = match shape {
            DrawShape::Point => None,
            DrawShape::LineString => Some(Self::length(engine.length(geometry)?)),
            DrawShape::Polygon => Some(Self::area(engine.area(geometry)?)),
        };
        Ok(measurement)
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subject = match self.kind {
            MeasurementKind::Length => "Length of Line",
            MeasurementKind::Area => "Area of Polygon",
        };
        write!(f, "{subject}: {} {}", self.truncated_display, self.unit())
    }
}

/// Callback invoked for every produced measurement.
pub type MeasurementCallback = Box<dyn FnMut(&Measurement)>;

/// Publishes measurements to subscribers and remembers the latest one.
#[derive(Default)]
pub struct MeasurementReporter {
    subscribers: Vec<MeasurementCallback>,
    last: Option<Measurement>,
    reported: usize,
}

impl MeasurementReporter {
    /// Create a reporter with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for future measurements.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Measurement) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Publish a measurement to every subscriber.
    pub fn report(&mut self, measurement: Measurement) {
        tracing::info!(
            kind = ?measurement.kind,
            value = measurement.value,
            "{measurement}"
        );
        for subscriber in &mut self.subscribers {
            subscriber(&measurement);
        }
        self.last = Some(measurement);
        self.reported += 1;
    }

    /// Latest published measurement.
    #[must_use]
    pub const fn last(&self) -> Option<&Measurement> {
        self.last.as_ref()
    }

    /// Number of measurements published so far.
    #[must_use]
    pub const fn reported_count(&self) -> usize {
        self.reported
    }
}

impl std::fmt::Debug for MeasurementReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementReporter")
            .field("subscribers", &self.subscribers.len())
            .field("last", &self.last)
            .field("reported", &self.reported)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_truncates_toward_zero() {
        assert_eq!(Measurement::length(1000.9).truncated_display, 1000);
        assert_eq!(Measurement::area(0.99).truncated_display, 0);
        assert_eq!(Measurement::length(-2.7).truncated_display, -2);
    }

    #[test]
    fn test_precise_value_kept() {
        let m = Measurement::area(12.345);
        assert!((m.value - 12.345).abs() < f64::EPSILON);
        assert_eq!(m.kind, MeasurementKind::Area);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Measurement::length(1234.56).to_string(), "Length of Line: 1234 meters");
        assert_eq!(
            Measurement::area(99.9).to_string(),
            "Area of Polygon: 99 square meters"
        );
    }

    #[test]
    fn test_reporter_notifies_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reporter = MeasurementReporter::new();
        let sink = Rc::clone(&seen);
        reporter.subscribe(move |m| sink.borrow_mut().push(*m));

        reporter.report(Measurement::length(5.0));
        reporter.report(Measurement::area(7.0));

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(reporter.reported_count(), 2);
        assert_eq!(reporter.last().map(|m| m.kind), Some(MeasurementKind::Area));
    }

    #[test]
    fn test_reporter_without_subscribers() {
        let mut reporter = MeasurementReporter::new();
        assert!(reporter.last().is_none());
        reporter.report(Measurement::length(1.0));
        assert_eq!(reporter.reported_count(), 1);
    }
}
