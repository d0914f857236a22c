//! The mountable map widget.
//!
//! [`MapWidget`] owns the feature layers and wires the interaction
//! controller, geolocation tracker and measurement reporter to an engine and
//! a location source. Every method takes `&mut self`, so each event runs to
//! completion before the next one is dispatched.

use crate::{
    ClickOutcome, Coordinate, DrawTool, EventOutcome, GeolocationTracker, GeometryEngine,
    HandleId, InteractionController, LayerManager, LayerRole, LocationSource, MapConfig, MapError,
    MapEvent, MapResult, Measurement, MeasurementReporter,
};

/// Interactive map: marker placement, live position and measured drawing.
pub struct MapWidget<E, L>
where
    E: GeometryEngine,
    L: LocationSource,
{
    config: MapConfig,
    engine: E,
    location: L,
    layers: LayerManager,
    controller: InteractionController,
    tracker: GeolocationTracker,
    reporter: MeasurementReporter,
    torn_down: bool,
}

impl<E, L> MapWidget<E, L>
where
    E: GeometryEngine,
    L: LocationSource,
{
    /// Mount a widget: validate the config, register every layer and apply
    /// the initial view.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the engine rejects the
    /// view.
    pub fn new(config: MapConfig, mut engine: E, location: L) -> MapResult<Self> {
        config.validate()?;
        engine.configure_view(&config.view())?;
        let tracker = GeolocationTracker::new(config.continuous_recenter, config.fit_padding);
        tracing::info!(
            "Map widget mounted at {} zoom {} (continuous_recenter={})",
            config.initial_center,
            config.initial_zoom,
            config.continuous_recenter
        );

        Ok(Self {
            config,
            engine,
            location,
            layers: LayerManager::with_default_layers(),
            controller: InteractionController::new(),
            tracker,
            reporter: MeasurementReporter::new(),
            torn_down: false,
        })
    }

    fn ensure_mounted(&self) -> MapResult<()> {
        if self.torn_down {
            Err(MapError::TornDown)
        } else {
            Ok(())
        }
    }

    /// Start following the device position.
    ///
    /// A refused location capability is logged and returned; marker placement
    /// and drawing keep working.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::LocationUnavailable`] if the platform refuses,
    /// [`MapError::TrackerStopped`] after tracking was stopped, or
    /// [`MapError::TornDown`].
    pub fn start_tracking(&mut self) -> MapResult<()> {
        self.ensure_mounted()?;
        let result = self
            .tracker
            .start(&mut self.location, self.config.high_accuracy);
        if let Err(MapError::LocationUnavailable(reason)) = &result {
            tracing::warn!("Geolocation unavailable, continuing without live position: {reason}");
        }
        result
    }

    /// Stop following the device position. Idempotent.
    pub fn stop_tracking(&mut self) {
        self.tracker.stop(&mut self.location);
    }

    /// Select a draw tool, or [`DrawTool::None`] for marker placement.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot start the session, or
    /// [`MapError::TornDown`].
    pub fn select_tool(&mut self, tool: DrawTool) -> MapResult<()> {
        self.ensure_mounted()?;
        self.controller.select_tool(&mut self.engine, tool)
    }

    /// Handle a map click at a projected coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::TornDown`] after teardown.
    pub fn on_map_click(&mut self, coordinate: Coordinate) -> MapResult<ClickOutcome> {
        self.ensure_mounted()?;
        self.controller.on_map_click(&mut self.layers, coordinate)
    }

    /// Dispatch an engine or platform event. Events arriving after teardown
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Propagates errors from the handler for the event.
    pub fn handle_event(&mut self, event: MapEvent) -> MapResult<EventOutcome> {
        if self.torn_down {
            tracing::trace!("Dropping event after teardown: {event:?}");
            return Ok(EventOutcome::Ignored);
        }

        match event {
            MapEvent::Click(coordinate) => self.on_map_click(coordinate).map(EventOutcome::Click),
            MapEvent::DrawFinished { handle, geometry } => self
                .controller
                .on_draw_finished(
                    &mut self.engine,
                    &mut self.layers,
                    &mut self.reporter,
                    handle,
                    geometry,
                )
                .map(EventOutcome::Draw),
            MapEvent::PositionChanged(fix) => self
                .tracker
                .on_position_change(fix, &mut self.layers, &mut self.engine)
                .map(EventOutcome::Position),
        }
    }

    /// Register a callback for every produced measurement.
    pub fn on_measurement<F>(&mut self, callback: F)
    where
        F: FnMut(&Measurement) + 'static,
    {
        self.reporter.subscribe(callback);
    }

    /// Remove every feature from a layer. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::TornDown`] after teardown and
    /// [`MapError::InvalidLayer`] for an unregistered role.
    pub fn clear_layer(&mut self, role: LayerRole) -> MapResult<usize> {
        self.ensure_mounted()?;
        let removed = self.layers.clear_layer(role)?;
        tracing::debug!("Cleared {removed} features from {role} layer");
        Ok(removed)
    }

    /// Composite the layers through the engine.
    ///
    /// # Errors
    ///
    /// Returns an engine composition error, or [`MapError::TornDown`].
    pub fn render(&mut self) -> MapResult<()> {
        self.ensure_mounted()?;
        self.engine.compose(&self.layers.ordered_layers())?;
        Ok(())
    }

    /// Release the draw session and the location watch. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.controller.cancel(&mut self.engine);
        self.tracker.stop(&mut self.location);
        self.torn_down = true;
        tracing::info!("Map widget torn down");
    }

    /// Whether [`teardown`](Self::teardown) has run.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Active draw tool.
    #[must_use]
    pub fn active_tool(&self) -> DrawTool {
        self.controller.active_tool()
    }

    /// Handle of the in-progress draw session.
    #[must_use]
    pub fn active_handle(&self) -> Option<HandleId> {
        self.controller.active_handle()
    }

    /// The feature layers.
    #[must_use]
    pub const fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// The geolocation tracker.
    #[must_use]
    pub const fn tracker(&self) -> &GeolocationTracker {
        &self.tracker
    }

    /// Latest produced measurement.
    #[must_use]
    pub const fn last_measurement(&self) -> Option<&Measurement> {
        self.reporter.last()
    }

    /// The widget configuration.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine access, for feeding pointer input into draw sessions.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The location source.
    #[must_use]
    pub const fn location(&self) -> &L {
        &self.location
    }

    /// Mutable location source access, for platforms that queue fixes.
    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }
}

impl<E, L> Drop for MapWidget<E, L>
where
    E: GeometryEngine,
    L: LocationSource,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::test_support::{RecordingEngine, StubLocation};
    use crate::{Geometry, PositionFix};

    fn widget(location: StubLocation) -> MapWidget<RecordingEngine, StubLocation> {
        MapWidget::new(MapConfig::default(), RecordingEngine::default(), location).expect("mount")
    }

    #[test]
    fn test_mount_configures_view() {
        let w = widget(StubLocation::default());
        let view = w.engine().view.expect("view configured");
        assert!((view.zoom - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MapConfig {
            initial_zoom: 40.0,
            ..MapConfig::default()
        };
        let result = MapWidget::new(config, RecordingEngine::default(), StubLocation::default());
        assert!(matches!(result, Err(MapError::InvalidConfig(_))));
    }

    #[test]
    fn test_denied_location_keeps_widget_usable() {
        let mut w = widget(StubLocation::denied());
        assert!(matches!(w.start_tracking(), Err(MapError::LocationUnavailable(_))));

        w.on_map_click(Coordinate::new(1.0, 1.0)).expect("click");
        w.select_tool(DrawTool::Point).expect("select");
        let handle = w.active_handle().expect("handle");
        w.handle_event(MapEvent::DrawFinished {
            handle,
            geometry: Geometry::point(Coordinate::new(2.0, 2.0)),
        })
        .expect("finish");

        assert_eq!(w.layers().feature_count(LayerRole::Marker).expect("count"), 1);
        assert_eq!(w.layers().feature_count(LayerRole::Drawing).expect("count"), 1);
    }

    #[test]
    fn test_measurement_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut w = widget(StubLocation::default());
        let sink = Rc::clone(&seen);
        w.on_measurement(move |m| sink.borrow_mut().push(m.truncated_display));

        w.select_tool(DrawTool::LineString).expect("select");
        let handle = w.active_handle().expect("handle");
        w.handle_event(MapEvent::DrawFinished {
            handle,
            geometry: Geometry::line_string(vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 42.7),
            ]),
        })
        .expect("finish");

        assert_eq!(*seen.borrow(), vec![42]);
        assert_eq!(w.last_measurement().map(|m| m.truncated_display), Some(42));
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut w = widget(StubLocation::default());
        w.start_tracking().expect("track");
        w.select_tool(DrawTool::Polygon).expect("select");
        let handle = w.active_handle().expect("handle");

        w.teardown();
        w.teardown();
        assert!(w.engine().live.is_empty());
        assert!(w.location().active.is_empty());

        let late = w
            .handle_event(MapEvent::DrawFinished {
                handle,
                geometry: Geometry::polygon(vec![
                    Coordinate::new(0.0, 0.0),
                    Coordinate::new(1.0, 0.0),
                    Coordinate::new(1.0, 1.0),
                ]),
            })
            .expect("late event");
        assert_eq!(late, EventOutcome::Ignored);

        let fix = PositionFix::new(Coordinate::new(0.0, 0.0), 5.0, 0).expect("fix");
        assert_eq!(
            w.handle_event(MapEvent::PositionChanged(fix)).expect("late fix"),
            EventOutcome::Ignored
        );
        assert!(matches!(w.select_tool(DrawTool::Point), Err(MapError::TornDown)));
        assert_eq!(w.layers().feature_count(LayerRole::Drawing).expect("count"), 0);
    }

    #[test]
    fn test_render_composes_all_layers() {
        let mut w = widget(StubLocation::default());
        w.render().expect("render");
        assert_eq!(w.engine().composed, vec![4]);
    }

    #[test]
    fn test_clear_drawing_layer() {
        let mut w = widget(StubLocation::default());
        for _ in 0..2 {
            w.select_tool(DrawTool::Point).expect("select");
            let handle = w.active_handle().expect("handle");
            w.handle_event(MapEvent::DrawFinished {
                handle,
                geometry: Geometry::point(Coordinate::new(0.0, 0.0)),
            })
            .expect("finish");
        }
        assert_eq!(w.clear_layer(LayerRole::Drawing).expect("clear"), 2);
        assert!(w.layers().layer(LayerRole::Drawing).expect("layer").is_empty());
    }

    #[test]
    fn test_clear_layer_after_teardown_fails() {
        let mut w = widget(StubLocation::default());
        w.on_map_click(Coordinate::new(3.0, 4.0)).expect("click");
        w.teardown();

        assert!(matches!(w.clear_layer(LayerRole::Marker), Err(MapError::TornDown)));
        assert_eq!(w.layers().feature_count(LayerRole::Marker).expect("count"), 1);
    }
}
