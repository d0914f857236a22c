//! Widget configuration.

use serde::{Deserialize, Serialize};

use crate::{Coordinate, MapError, MapResult, Padding};

/// Default zoom level on mount.
pub const DEFAULT_ZOOM: f64 = 8.0;

/// Default lowest zoom level.
pub const DEFAULT_MIN_ZOOM: f64 = 8.0;

/// Default highest zoom level.
pub const DEFAULT_MAX_ZOOM: f64 = 15.0;

/// Default padding, in pixels, when framing the accuracy envelope.
pub const DEFAULT_FIT_PADDING: f64 = 20.0;

/// View-related subset of [`MapConfig`] handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Center on mount.
    pub center: Coordinate,
    /// Zoom on mount.
    pub zoom: f64,
    /// Lowest allowed zoom.
    pub min_zoom: f64,
    /// Highest allowed zoom.
    pub max_zoom: f64,
}

/// Configuration accepted when mounting a map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Center of the view on mount.
    pub initial_center: Coordinate,
    /// Zoom level on mount.
    pub initial_zoom: f64,
    /// Lowest zoom level the view may reach.
    pub min_zoom: f64,
    /// Highest zoom level the view may reach.
    pub max_zoom: f64,
    /// Recenter on every position fix (`true`) or only on the first one.
    pub continuous_recenter: bool,
    /// Ask the platform for high-accuracy positioning.
    pub high_accuracy: bool,
    /// Padding used when framing the accuracy envelope.
    pub fit_padding: Padding,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_center: Coordinate::new(0.0, 0.0),
            initial_zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            continuous_recenter: true,
            high_accuracy: true,
            fit_padding: Padding::uniform(DEFAULT_FIT_PADDING),
        }
    }
}

impl MapConfig {
    /// Parse and validate a configuration from JSON. Missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check zoom limits, center and padding.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> MapResult<()> {
        if !self.initial_center.is_finite() {
            return Err(MapError::InvalidConfig("initial_center must be finite".into()));
        }
        if ![self.initial_zoom, self.min_zoom, self.max_zoom]
            .iter()
            .all(|z| z.is_finite())
        {
            return Err(MapError::InvalidConfig("zoom levels must be finite".into()));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapError::InvalidConfig(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.initial_zoom < self.min_zoom || self.initial_zoom > self.max_zoom {
            return Err(MapError::InvalidConfig(format!(
                "initial_zoom {} outside [{}, {}]",
                self.initial_zoom, self.min_zoom, self.max_zoom
            )));
        }
        if !self.fit_padding.is_valid() {
            return Err(MapError::InvalidConfig(
                "fit_padding must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// View settings for the engine.
    #[must_use]
    pub fn view(&self) -> ViewOptions {
        ViewOptions {
            center: self.initial_center,
            zoom: self.initial_zoom,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = MapConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.continuous_recenter);
        assert_eq!(config.fit_padding, Padding::uniform(20.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MapConfig::from_json(r#"{"initial_center":[100.0,200.0],"initial_zoom":10}"#)
            .expect("valid config");
        assert_eq!(config.initial_center, Coordinate::new(100.0, 200.0));
        assert!((config.initial_zoom - 10.0).abs() < f64::EPSILON);
        assert!((config.max_zoom - DEFAULT_MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_outside_limits_rejected() {
        let result = MapConfig::from_json(r#"{"initial_zoom":3}"#);
        assert!(matches!(result, Err(MapError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let config = MapConfig {
            min_zoom: 12.0,
            max_zoom: 4.0,
            initial_zoom: 8.0,
            ..MapConfig::default()
        };
        assert!(matches!(config.validate(), Err(MapError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_padding_rejected() {
        let config = MapConfig {
            fit_padding: Padding::from([20.0, 20.0, -5.0, 20.0]),
            ..MapConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            MapConfig::from_json("{ not json"),
            Err(MapError::Serialization(_))
        ));
    }

    #[test]
    fn test_view_options() {
        let view = MapConfig::default().view();
        assert!((view.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
        assert!((view.min_zoom - DEFAULT_MIN_ZOOM).abs() < f64::EPSILON);
    }
}
