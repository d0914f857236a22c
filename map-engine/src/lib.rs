//! # Saorsa Map Engine
//!
//! Reference backend for [`map_core::MapWidget`]: a planar geometry engine
//! over a web mercator view, and a simulated geolocation source.
//!
//! ## Example
//!
//! ```
//! use map_core::{DrawTool, MapConfig, MapWidget};
//! use map_engine::{projection, PlanarEngine, SimulatedLocation};
//!
//! let mut widget = MapWidget::new(
//!     MapConfig::default(),
//!     PlanarEngine::default(),
//!     SimulatedLocation::available(),
//! )
//! .unwrap();
//!
//! widget.select_tool(DrawTool::LineString).unwrap();
//! let handle = widget.active_handle().unwrap();
//! let event = widget
//!     .engine_mut()
//!     .sketch(
//!         handle,
//!         &[projection::from_lon_lat(0.0, 0.0), projection::from_lon_lat(0.01, 0.0)],
//!     )
//!     .unwrap();
//! widget.handle_event(event).unwrap();
//!
//! assert_eq!(widget.last_measurement().unwrap().truncated_display, 1113);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod draw;
pub mod location;
pub mod measure;
pub mod planar;
pub mod projection;
pub mod view;

pub use draw::{DrawSession, DrawSessions};
pub use location::{Availability, SimulatedLocation};
pub use planar::PlanarEngine;
pub use view::ViewState;
