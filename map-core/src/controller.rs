//! Interaction mode controller and draw session state machine.
//!
//! ```text
//!            select_tool(Point | LineString | Polygon)
//!   ┌──────┐ ─────────────────────────────────────────▶ ┌─────────┐
//!   │ Idle │                                            │ Drawing │
//!   └──────┘ ◀───────────────────────────────────────── └─────────┘
//!      │      draw finished (active handle) / select_tool
//!      │
//!      └── map click: place marker
//! ```
//!
//! At most one engine interaction handle is alive. Selecting any tool,
//! including the active one, tears the current handle down first.

use serde::{Deserialize, Serialize};

use crate::{
    Coordinate, Cursor, DrawShape, EngineError, FeatureId, Geometry, GeometryEngine, HandleId,
    LayerManager, LayerRole, MapResult, Measurement, MeasurementReporter,
};

/// Draw tool chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawTool {
    /// No tool: map clicks place the marker.
    #[default]
    None,
    /// Draw a point.
    Point,
    /// Draw a line and report its length.
    LineString,
    /// Draw a polygon and report its area.
    Polygon,
}

impl DrawTool {
    /// Engine shape for this tool, `None` for [`DrawTool::None`].
    #[must_use]
    pub const fn shape(self) -> Option<DrawShape> {
        match self {
            Self::None => None,
            Self::Point => Some(DrawShape::Point),
            Self::LineString => Some(DrawShape::LineString),
            Self::Polygon => Some(DrawShape::Polygon),
        }
    }
}

/// What a map click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The marker was replaced by a new feature.
    MarkerPlaced(FeatureId),
    /// A draw tool is active; the engine's session owns the click.
    ConsumedByDraw,
}

/// What a draw-finished event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOutcome {
    /// The drawing was stored and, for lines and polygons, measured.
    Completed {
        /// Feature appended to the drawing layer.
        feature: FeatureId,
        /// Measurement handed to the reporter, if any.
        measurement: Option<Measurement>,
    },
    /// The event named a handle that is no longer active and was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDraw {
    tool: DrawTool,
    shape: DrawShape,
    handle: HandleId,
}

/// Owns the active tool and its engine interaction handle.
#[derive(Debug, Default)]
pub struct InteractionController {
    active: Option<ActiveDraw>,
    sessions_started: u64,
}

impl InteractionController {
    /// Create a controller in marker-placement mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active tool.
    #[must_use]
    pub fn active_tool(&self) -> DrawTool {
        self.active.map_or(DrawTool::None, |a| a.tool)
    }

    /// Handle of the in-progress draw session.
    #[must_use]
    pub fn active_handle(&self) -> Option<HandleId> {
        self.active.map(|a| a.handle)
    }

    /// Whether a draw session is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Number of draw sessions started over the controller's lifetime.
    #[must_use]
    pub const fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    /// Switch tools.
    ///
    /// Any active session is cancelled first, even when `tool` is the active
    /// tool, so reselecting starts a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot start the new session. The
    /// controller is left idle in that case.
    pub fn select_tool<E>(&mut self, engine: &mut E, tool: DrawTool) -> MapResult<()>
    where
        E: GeometryEngine + ?Sized,
    {
        self.cancel(engine);

        let Some(shape) = tool.shape() else {
            engine.set_cursor(Cursor::Default);
            return Ok(());
        };

        let handle = match engine.begin_draw(shape) {
            Ok(handle) => handle,
            Err(e) => {
                engine.set_cursor(Cursor::Default);
                return Err(e.into());
            }
        };
        self.active = Some(ActiveDraw {
            tool,
            shape,
            handle,
        });
        self.sessions_started += 1;
        engine.set_cursor(Cursor::Crosshair);
        tracing::debug!("Draw session {handle} started for {tool:?}");
        Ok(())
    }

    /// Tear down the active session without storing or measuring anything.
    ///
    /// Release failures are logged; the controller is idle afterwards either
    /// way. Returns the handle that was torn down.
    pub fn cancel<E>(&mut self, engine: &mut E) -> Option<HandleId>
    where
        E: GeometryEngine + ?Sized,
    {
        let active = self.active.take()?;
        if let Err(e) = engine.release_draw(active.handle) {
            tracing::warn!("Failed to release draw session {}: {e}", active.handle);
        }
        tracing::debug!("Draw session {} cancelled", active.handle);
        Some(active.handle)
    }

    /// Handle a map click. Places the marker only in marker-placement mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker layer is not registered.
    pub fn on_map_click(
        &self,
        layers: &mut LayerManager,
        coordinate: Coordinate,
    ) -> MapResult<ClickOutcome> {
        if self.active.is_some() {
            return Ok(ClickOutcome::ConsumedByDraw);
        }
        let id = layers.set_single_feature(LayerRole::Marker, Geometry::point(coordinate))?;
        tracing::debug!("Marker placed at {coordinate}");
        Ok(ClickOutcome::MarkerPlaced(id))
    }

    /// Complete the active session with the engine's finished geometry.
    ///
    /// The geometry is appended to the drawing layer; lines and polygons are
    /// measured and the result published before the cursor is reset. Events
    /// for any handle other than the active one are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry does not match the active tool, if the
    /// engine fails to measure it, or if the drawing layer is missing. The
    /// controller is idle afterwards in every case.
    pub fn on_draw_finished<E>(
        &mut self,
        engine: &mut E,
        layers: &mut LayerManager,
        reporter: &mut MeasurementReporter,
        handle: HandleId,
        geometry: Geometry,
    ) -> MapResult<DrawOutcome>
    where
        E: GeometryEngine + ?Sized,
    {
        let Some(active) = self.active.filter(|a| a.handle == handle) else {
            tracing::debug!("Ignoring finish event for stale draw session {handle}");
            return Ok(DrawOutcome::Stale);
        };
        self.active = None;
        if let Err(e) = engine.release_draw(handle) {
            tracing::warn!("Failed to release finished draw session {handle}: {e}");
        }

        if !active.shape.matches(&geometry) {
            engine.set_cursor(Cursor::Default);
            return Err(EngineError::UnsupportedShape(format!(
                "{:?} session finished with a {}",
                active.tool,
                geometry.type_name()
            ))
            .into());
        }

        let measured = Measurement::compute(engine, active.shape, &geometry);
        if let Ok(Some(measurement)) = &measured {
            reporter.report(*measurement);
        }
        engine.set_cursor(Cursor::Default);

        let feature = layers.append_feature(LayerRole::Drawing, geometry)?;
        let measurement = measured?;
        tracing::debug!("Draw session {handle} completed as feature {feature}");
        Ok(DrawOutcome::Completed {
            feature,
            measurement,
        })
    }
}
