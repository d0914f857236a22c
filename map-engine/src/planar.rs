//! Planar engine: the reference [`GeometryEngine`] backend.
//!
//! Composition does not rasterize anything; like a 2D fallback renderer it
//! walks the layers bottom to top and logs what would be drawn.

use map_core::{
    Coordinate, Cursor, DrawShape, EngineResult, Extent, Feature, FeatureLayer, Geometry,
    GeometryEngine, HandleId, MapConfig, MapEvent, Padding, ViewOptions,
};

use crate::draw::{DrawSession, DrawSessions};
use crate::measure;
use crate::view::ViewState;

/// Default viewport width in pixels.
pub const DEFAULT_WIDTH: f64 = 800.0;

/// Default viewport height in pixels.
pub const DEFAULT_HEIGHT: f64 = 600.0;

/// Planar geometry engine over a web mercator view.
#[derive(Debug)]
pub struct PlanarEngine {
    view: ViewState,
    sessions: DrawSessions,
    cursor: Cursor,
    frame_count: u64,
    last_frame_features: usize,
}

impl PlanarEngine {
    /// Create an engine with the given viewport size.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewport is empty.
    pub fn new(width_px: f64, height_px: f64) -> EngineResult<Self> {
        let view = ViewState::new(&MapConfig::default().view(), width_px, height_px)?;
        Ok(Self {
            view,
            sessions: DrawSessions::new(),
            cursor: Cursor::Default,
            frame_count: 0,
            last_frame_features: 0,
        })
    }

    /// Place a sketch vertex in a draw session.
    ///
    /// A point session finishes on its first vertex, like a single click, and
    /// the finished event is returned. Other shapes return `None` until
    /// [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or finished sessions.
    pub fn add_vertex(
        &mut self,
        handle: HandleId,
        coordinate: Coordinate,
    ) -> EngineResult<Option<MapEvent>> {
        let count = self.sessions.add_vertex(handle, coordinate)?;
        let is_point = self
            .sessions
            .get(handle)
            .is_some_and(|session| session.shape() == DrawShape::Point);
        if is_point {
            return self.finish(handle).map(Some);
        }
        tracing::trace!("Draw session {handle} has {count} vertices");
        Ok(None)
    }

    /// Place a vertex at a viewport pixel. See [`add_vertex`](Self::add_vertex).
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or finished sessions.
    pub fn add_vertex_px(
        &mut self,
        handle: HandleId,
        px: f64,
        py: f64,
    ) -> EngineResult<Option<MapEvent>> {
        let coordinate = self.view.screen_to_map(px, py);
        self.add_vertex(handle, coordinate)
    }

    /// Finish a session and return the event to dispatch to the widget.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown, already finished or has
    /// too few vertices.
    pub fn finish(&mut self, handle: HandleId) -> EngineResult<MapEvent> {
        let geometry = self.sessions.finish(handle)?;
        tracing::debug!("Draw session {handle} finished as {}", geometry.type_name());
        Ok(MapEvent::DrawFinished { handle, geometry })
    }

    /// Place vertices until the session finishes, finishing it explicitly
    /// after the last one if needed.
    ///
    /// # Errors
    ///
    /// Returns the first vertex or finish error.
    pub fn sketch(&mut self, handle: HandleId, vertices: &[Coordinate]) -> EngineResult<MapEvent> {
        for vertex in vertices {
            if let Some(event) = self.add_vertex(handle, *vertex)? {
                return Ok(event);
            }
        }
        self.finish(handle)
    }

    /// Click event for a viewport pixel.
    #[must_use]
    pub fn click_px(&self, px: f64, py: f64) -> MapEvent {
        MapEvent::Click(self.view.screen_to_map(px, py))
    }

    /// Look up a live session.
    #[must_use]
    pub fn session(&self, handle: HandleId) -> Option<&DrawSession> {
        self.sessions.get(handle)
    }

    /// Number of live draw sessions.
    #[must_use]
    pub fn live_sessions(&self) -> usize {
        self.sessions.live()
    }

    /// Current view.
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// Current pointer indicator.
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of composed frames.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Features drawn in the last composed frame.
    #[must_use]
    pub const fn last_frame_features(&self) -> usize {
        self.last_frame_features
    }

    fn render_feature(feature: &Feature) {
        let details = match &feature.geometry {
            Geometry::Point { coordinate } => format!(" at {coordinate}"),
            Geometry::LineString { coordinates } => format!(" vertices={}", coordinates.len()),
            Geometry::Polygon { ring } => format!(" ring={}", ring.len()),
            Geometry::Circle { center, radius } => format!(" center={center} radius={radius:.1}"),
        };
        tracing::trace!(
            "Render {} {} [{}]{details}",
            feature.geometry.type_name(),
            feature.id,
            feature.style
        );
    }
}

impl Default for PlanarEngine {
    fn default() -> Self {
        Self {
            view: ViewState {
                center: Coordinate::new(0.0, 0.0),
                zoom: map_core::config::DEFAULT_ZOOM,
                min_zoom: map_core::config::DEFAULT_MIN_ZOOM,
                max_zoom: map_core::config::DEFAULT_MAX_ZOOM,
                width_px: DEFAULT_WIDTH,
                height_px: DEFAULT_HEIGHT,
            },
            sessions: DrawSessions::new(),
            cursor: Cursor::Default,
            frame_count: 0,
            last_frame_features: 0,
        }
    }
}

impl GeometryEngine for PlanarEngine {
    fn begin_draw(&mut self, shape: DrawShape) -> EngineResult<HandleId> {
        let handle = self.sessions.begin(shape);
        tracing::debug!("Draw session {handle} opened for {shape:?}");
        Ok(handle)
    }

    fn release_draw(&mut self, handle: HandleId) -> EngineResult<()> {
        let session = self.sessions.release(handle)?;
        tracing::trace!(
            "Draw session {handle} released ({} vertices, finished={})",
            session.vertices().len(),
            session.is_finished()
        );
        Ok(())
    }

    fn length(&self, geometry: &Geometry) -> EngineResult<f64> {
        measure::length(geometry)
    }

    fn area(&self, geometry: &Geometry) -> EngineResult<f64> {
        measure::area(geometry)
    }

    fn configure_view(&mut self, view: &ViewOptions) -> EngineResult<()> {
        self.view.apply(view);
        tracing::debug!(
            "View configured: center {} zoom {} [{}, {}]",
            self.view.center,
            self.view.zoom,
            self.view.min_zoom,
            self.view.max_zoom
        );
        Ok(())
    }

    fn fit_view(&mut self, extent: &Extent, padding: Padding) -> EngineResult<()> {
        self.view.fit_extent(extent, padding)
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if self.cursor != cursor {
            tracing::trace!("Cursor {:?} -> {cursor:?}", self.cursor);
        }
        self.cursor = cursor;
    }

    fn compose(&mut self, layers: &[&FeatureLayer]) -> EngineResult<()> {
        tracing::trace!(
            "Compose frame {}: basemap + {} layers, view {} zoom {:.2}",
            self.frame_count + 1,
            layers.len(),
            self.view.center,
            self.view.zoom
        );

        let mut drawn = 0;
        for layer in layers {
            for feature in layer.features() {
                Self::render_feature(feature);
                drawn += 1;
            }
        }

        self.last_frame_features = drawn;
        self.frame_count += 1;
        Ok(())
    }
}
