//! In-memory engine and location source for unit tests.

use std::collections::HashSet;

use crate::config::ViewOptions;
use crate::{
    Cursor, DrawShape, EngineError, EngineResult, Extent, FeatureLayer, Geometry, GeometryEngine,
    HandleId, LocationError, LocationSource, Padding, TrackingOptions, WatchId,
};

/// Engine that records every call and measures with planar formulas.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    next_handle: u64,
    pub live: HashSet<HandleId>,
    pub begun: Vec<(HandleId, DrawShape)>,
    pub released: Vec<HandleId>,
    pub cursor: Cursor,
    pub fits: Vec<(Extent, Padding)>,
    pub view: Option<ViewOptions>,
    pub composed: Vec<usize>,
    pub fail_release: bool,
    pub fail_fit: bool,
}

impl GeometryEngine for RecordingEngine {
    fn begin_draw(&mut self, shape: DrawShape) -> EngineResult<HandleId> {
        self.next_handle += 1;
        let handle = HandleId::new(self.next_handle);
        self.live.insert(handle);
        self.begun.push((handle, shape));
        Ok(handle)
    }

    fn release_draw(&mut self, handle: HandleId) -> EngineResult<()> {
        self.live.remove(&handle);
        self.released.push(handle);
        if self.fail_release {
            return Err(EngineError::UnknownHandle(handle));
        }
        Ok(())
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
                    .map(|i| {
                        let (a, b) = (ring[i], ring[(i + 1) % n]);
                        a.x * b.y - b.x * a.y
                    })
                    .sum();
                Ok(twice.abs() / 2.0)
            }
            other => Err(EngineError::UnsupportedShape(other.type_name().into())),
        }
    }

    fn configure_view(&mut self, view: &ViewOptions) -> EngineResult<()> {
        self.view = Some(*view);
        Ok(())
    }

    fn fit_view(&mut self, extent: &Extent, padding: Padding) -> EngineResult<()> {
        if self.fail_fit {
            return Err(EngineError::View("no room to fit".into()));
        }
        self.fits.push((*extent, padding));
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn compose(&mut self, layers: &[&FeatureLayer]) -> EngineResult<()> {
        self.composed.push(layers.len());
        Ok(())
    }
}

/// Location source that is either available or denied.
#[derive(Debug, Default)]
pub struct StubLocation {
    pub denied: bool,
    next_watch: u32,
    pub active: Vec<WatchId>,
    pub last_options: Option<TrackingOptions>,
}

impl StubLocation {
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }
}

impl LocationSource for StubLocation {
    fn watch(&mut self, options: TrackingOptions) -> Result<WatchId, LocationError> {
        if self.denied {
            return Err(LocationError::PermissionDenied);
        }
        self.next_watch += 1;
        let watch = WatchId::new(self.next_watch);
        self.active.push(watch);
        self.last_options = Some(options);
        Ok(watch)
    }

    fn clear_watch(&mut self, watch: WatchId) {
        self.active.retain(|w| *w != watch);
    }
}
