//! Events delivered to the widget by the engine and the platform.

use serde::{Deserialize, Serialize};

use crate::{ClickOutcome, Coordinate, DrawOutcome, Geometry, HandleId, PositionFix};

/// An event from the host event loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MapEvent {
    /// The user clicked the map at a projected coordinate.
    Click(Coordinate),

    /// An engine draw session emitted its finished geometry.
    DrawFinished {
        /// Session that finished.
        handle: HandleId,
        /// The completed geometry.
        geometry: Geometry,
    },

    /// The platform reported a new position.
    PositionChanged(PositionFix),
}

/// Result of dispatching a [`MapEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    /// A click was handled.
    Click(ClickOutcome),
    /// A draw-finished event was handled.
    Draw(DrawOutcome),
    /// A position fix was applied (`true`) or dropped because tracking is off.
    Position(bool),
    /// The widget was torn down; the event was dropped.
    Ignored,
}
