//! Shared fixtures for map-core integration tests.

use std::collections::HashSet;

use map_core::{
    Cursor, DrawShape, EngineError, EngineResult, Extent, FeatureLayer, Geometry, GeometryEngine,
    HandleId, LocationError, LocationSource, Padding, TrackingOptions, ViewOptions, WatchId,
};

/// Engine that tracks live handles and measures in planar units.
#[derive(Debug, Default)]
pub struct CountingEngine {
    next: u64,
    pub live: HashSet<HandleId>,
    pub max_live: usize,
    pub fits: usize,
    pub cursor: Cursor,
}

impl GeometryEngine for CountingEngine {
    fn begin_draw(&mut self, _shape: DrawShape) -> EngineResult<HandleId> {
        self.next += 1;
        let handle = HandleId::new(self.next);
        self.live.insert(handle);
        self.max_live = self.max_live.max(self.live.len());
        Ok(handle)
    }

    fn release_draw(&mut self, handle: HandleId) -> EngineResult<()> {
        if self.live.remove(&handle) {
            Ok(())
        } else {
            Err(EngineError::UnknownHandle(handle))
        }
    }

    fn length(&self, geometry: &Geometry) -> EngineResult<f64> {
        match geometry {
            Geometry::LineString { coordinates } => Ok(coordinates
                .windows(2)
                .map(|w| w[0].distance_to(&w[1]))
                .sum()),
            other => Err(EngineError::UnsupportedShape(other.type_name().into())),
        }
    }

    fn area(&self, geometry: &Geometry) -> EngineResult<f64> {
        match geometry {
            Geometry::Polygon { ring } => {
                let n = ring.len();
                let twice: f64 = (0..n)
                    .map(|i| ring[i].x * ring[(i + 1) % n].y - ring[(i + 1) % n].x * ring[i].y)
                    .sum();
                Ok(twice.abs() / 2.0)
            }
            other => Err(EngineError::UnsupportedShape(other.type_name().into())),
        }
    }

    fn configure_view(&mut self, _view: &ViewOptions) -> EngineResult<()> {
        Ok(())
    }

    fn fit_view(&mut self, _extent: &Extent, _padding: Padding) -> EngineResult<()> {
        self.fits += 1;
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn compose(&mut self, _layers: &[&FeatureLayer]) -> EngineResult<()> {
        Ok(())
    }
}

/// Location source that always grants a watch.
#[derive(Debug, Default)]
pub struct GrantingLocation {
    pub watches: Vec<WatchId>,
}

impl LocationSource for GrantingLocation {
    fn watch(&mut self, _options: TrackingOptions) -> Result<WatchId, LocationError> {
        let watch = WatchId::new(u32::try_from(self.watches.len()).unwrap_or(u32::MAX) + 1);
        self.watches.push(watch);
        Ok(watch)
    }

    fn clear_watch(&mut self, watch: WatchId) {
        self.watches.retain(|w| *w != watch);
    }
}
