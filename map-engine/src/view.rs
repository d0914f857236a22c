//! Visible view: center, zoom limits and viewport size.

use map_core::{Coordinate, EngineError, EngineResult, Extent, Padding, ViewOptions};
use serde::Serialize;

use crate::projection::EARTH_RADIUS_M;

/// Tile edge length in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Meters per pixel at zoom 0.
pub const RESOLUTION_ZOOM_0: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M / TILE_SIZE;

/// Current view of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    /// Map coordinate at the viewport center.
    pub center: Coordinate,
    /// Zoom level, always within the limits.
    pub zoom: f64,
    /// Lowest allowed zoom.
    pub min_zoom: f64,
    /// Highest allowed zoom.
    pub max_zoom: f64,
    /// Viewport width in pixels.
    pub width_px: f64,
    /// Viewport height in pixels.
    pub height_px: f64,
}

impl ViewState {
    /// Create a view from configured options and a viewport size.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewport is empty.
    pub fn new(options: &ViewOptions, width_px: f64, height_px: f64) -> EngineResult<Self> {
        if !(width_px > 0.0 && height_px > 0.0) {
            return Err(EngineError::View(format!(
                "viewport must be non-empty, got {width_px}x{height_px}"
            )));
        }
        let mut view = Self {
            center: options.center,
            zoom: options.zoom,
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
            width_px,
            height_px,
        };
        view.set_zoom(options.zoom);
        Ok(view)
    }

    /// Replace center and limits, keeping the viewport size.
    pub fn apply(&mut self, options: &ViewOptions) {
        self.center = options.center;
        self.min_zoom = options.min_zoom;
        self.max_zoom = options.max_zoom;
        self.set_zoom(options.zoom);
    }

    /// Set the zoom, clamped to the limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Meters per pixel at the current zoom.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        RESOLUTION_ZOOM_0 / self.zoom.exp2()
    }

    /// Map extent covered by the viewport.
    #[must_use]
    pub fn visible_extent(&self) -> Extent {
        let half_w = self.width_px * self.resolution() / 2.0;
        let half_h = self.height_px * self.resolution() / 2.0;
        Extent {
            min_x: self.center.x - half_w,
            min_y: self.center.y - half_h,
            max_x: self.center.x + half_w,
            max_y: self.center.y + half_h,
        }
    }

    /// Map coordinate under a viewport pixel (origin top-left, y down).
    #[must_use]
    pub fn screen_to_map(&self, px: f64, py: f64) -> Coordinate {
        let res = self.resolution();
        Coordinate::new(
            self.center.x + (px - self.width_px / 2.0) * res,
            self.center.y - (py - self.height_px / 2.0) * res,
        )
    }

    /// Center and zoom so `extent` fills the viewport minus `padding`.
    ///
    /// The zoom is the largest that fits, clamped to the limits. A
    /// zero-sized extent zooms to the maximum.
    ///
    /// # Errors
    ///
    /// Returns an error if the padding leaves no room in the viewport.
    pub fn fit_extent(&mut self, extent: &Extent, padding: Padding) -> EngineResult<()> {
        let avail_w = self.width_px - padding.left - padding.right;
        let avail_h = self.height_px - padding.top - padding.bottom;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return Err(EngineError::View(format!(
                "padding {padding:?} leaves no room in {}x{} viewport",
                self.width_px, self.height_px
            )));
        }

        let required = (extent.width() / avail_w).max(extent.height() / avail_h);
        let zoom = if required > 0.0 {
            (RESOLUTION_ZOOM_0 / required).log2()
        } else {
            self.max_zoom
        };
        self.set_zoom(zoom);

        // Keep the extent centered inside the padded area.
        let res = self.resolution();
        let target = extent.center();
        self.center = Coordinate::new(
            target.x + (padding.right - padding.left) / 2.0 * res,
            target.y + (padding.top - padding.bottom) / 2.0 * res,
        );
        tracing::debug!("View fit to {target} at zoom {:.2}", self.zoom);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(zoom: f64) -> ViewOptions {
        ViewOptions {
            center: Coordinate::new(0.0, 0.0),
            zoom,
            min_zoom: 8.0,
            max_zoom: 15.0,
        }
    }

    fn square(half: f64) -> Extent {
        Extent {
            min_x: -half,
            min_y: -half,
            max_x: half,
            max_y: half,
        }
    }

    #[test]
    fn test_zoom_clamped_on_create() {
        let view = ViewState::new(&options(20.0), 800.0, 600.0).expect("view");
        assert!((view.zoom - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_viewport_rejected() {
        assert!(ViewState::new(&options(8.0), 0.0, 600.0).is_err());
    }

    #[test]
    fn test_resolution_halves_per_zoom() {
        let mut view = ViewState::new(&options(9.0), 800.0, 600.0).expect("view");
        let r9 = view.resolution();
        view.set_zoom(10.0);
        assert!((r9 / view.resolution() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_shows_whole_extent() {
        let mut view = ViewState::new(&options(8.0), 800.0, 600.0).expect("view");
        let extent = square(50_000.0);
        view.fit_extent(&extent, Padding::uniform(20.0)).expect("fit");

        let visible = view.visible_extent();
        assert!(visible.min_x <= extent.min_x && visible.max_x >= extent.max_x);
        assert!(visible.min_y <= extent.min_y && visible.max_y >= extent.max_y);
        assert!(view.zoom > 8.0 && view.zoom < 15.0);
    }

    #[test]
    fn test_fit_point_zooms_to_max() {
        let mut view = ViewState::new(&options(8.0), 800.0, 600.0).expect("view");
        view.fit_extent(&square(0.0), Padding::uniform(20.0)).expect("fit");
        assert!((view.zoom - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_huge_extent_clamps_to_min() {
        let mut view = ViewState::new(&options(12.0), 800.0, 600.0).expect("view");
        view.fit_extent(&square(5_000_000.0), Padding::uniform(0.0)).expect("fit");
        assert!((view.zoom - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_rejects_oversized_padding() {
        let mut view = ViewState::new(&options(8.0), 100.0, 100.0).expect("view");
        assert!(view.fit_extent(&square(10.0), Padding::uniform(60.0)).is_err());
    }

    #[test]
    fn test_screen_to_map_center() {
        let view = ViewState::new(&options(10.0), 800.0, 600.0).expect("view");
        assert_eq!(view.screen_to_map(400.0, 300.0), Coordinate::new(0.0, 0.0));
        let right = view.screen_to_map(500.0, 300.0);
        assert!((right.x - 100.0 * view.resolution()).abs() < 1e-9);
    }
}
