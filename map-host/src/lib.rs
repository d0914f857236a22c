//! # Saorsa Map Host
//!
//! Headless host that mounts a [`MapWidget`] over the planar engine and a
//! simulated location source, then replays a scripted interaction.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p map-host -- --config demos/config.json --script demos/survey.json
//! ```
//!
//! ## Script format
//!
//! A JSON array of steps, coordinates in map meters:
//!
//! ```json
//! [
//!   { "step": "select_tool", "tool": "line_string" },
//!   { "step": "vertex", "at": [0.0, 0.0] },
//!   { "step": "vertex", "at": [0.0, 1000.0] },
//!   { "step": "finish" }
//! ]
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::Parser;
use map_core::{
    Coordinate, DrawOutcome, DrawTool, EngineError, EventOutcome, LayerRole, MapConfig, MapError,
    MapEvent, MapResult, MapWidget, Measurement, PositionFix,
};
use map_engine::{Availability, PlanarEngine, SimulatedLocation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading inputs or replaying a script.
#[derive(Debug, Error)]
pub enum HostError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The script is not valid JSON.
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),

    /// A step needs an active draw session and there is none.
    #[error("step {index} ({step}) needs an active draw session")]
    NoActiveSession {
        /// Zero-based step index.
        index: usize,
        /// Step name.
        step: &'static str,
    },

    /// The widget rejected a step.
    #[error("step {index} failed: {source}")]
    Map {
        /// Zero-based step index.
        index: usize,
        /// Widget error.
        #[source]
        source: MapError,
    },

    /// The widget configuration is invalid.
    #[error("invalid config: {0}")]
    Config(#[source] MapError),

    /// The widget could not be mounted.
    #[error("mount failed: {0}")]
    Mount(#[source] MapError),

    /// The layer snapshot could not be serialized.
    #[error("snapshot failed: {0}")]
    Snapshot(#[source] MapError),
}

/// Host result type.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Command-line arguments for map-host.
#[derive(Debug, Clone, Parser)]
#[command(name = "map-host")]
#[command(about = "Saorsa Map headless interaction host")]
#[command(version)]
pub struct CliArgs {
    /// Widget configuration file (JSON)
    #[arg(long, env = "MAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interaction script to replay (JSON array of steps)
    #[arg(long, env = "MAP_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Recenter on every fix (true) or only the first (false)
    #[arg(long)]
    pub continuous_recenter: Option<bool>,

    /// Simulate a user who refuses location access
    #[arg(long)]
    pub deny_location: bool,

    /// Print the final layer snapshot as JSON
    #[arg(long)]
    pub snapshot: bool,

    /// Viewport width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,
}

/// Resolved host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Widget configuration.
    pub map: MapConfig,
    /// Location availability to simulate.
    pub availability: Availability,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Print the final layer snapshot.
    pub snapshot: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            availability: Availability::Available,
            width: 800,
            height: 600,
            snapshot: false,
        }
    }
}

impl HostConfig {
    /// Build the configuration from CLI arguments, loading the config file
    /// when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or is invalid.
    pub fn from_args(args: &CliArgs) -> HostResult<Self> {
        let mut map = match &args.config {
            Some(path) => MapConfig::from_json(&read_file(path)?).map_err(HostError::Config)?,
            None => MapConfig::default(),
        };
        if let Some(continuous) = args.continuous_recenter {
            map.continuous_recenter = continuous;
        }

        Ok(Self {
            map,
            availability: if args.deny_location {
                Availability::PermissionDenied
            } else {
                Availability::Available
            },
            width: args.width,
            height: args.height,
            snapshot: args.snapshot,
        })
    }
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Select a draw tool, `none` for marker placement.
    SelectTool {
        /// Tool to select.
        tool: DrawTool,
    },
    /// Click the map.
    Click {
        /// Clicked coordinate.
        at: Coordinate,
    },
    /// Place a vertex in the active draw session. The first vertex of a
    /// point session completes it.
    Vertex {
        /// Vertex coordinate.
        at: Coordinate,
    },
    /// Finish the active line or polygon session.
    Finish,
    /// Deliver a position fix from the platform.
    Fix {
        /// Reported position.
        at: Coordinate,
        /// Accuracy radius in meters.
        accuracy_m: f64,
        /// Platform timestamp.
        #[serde(default)]
        timestamp_ms: u64,
    },
    /// Stop following the device position.
    StopTracking,
    /// Remove every feature from a layer.
    ClearLayer {
        /// Layer to clear.
        layer: LayerRole,
    },
    /// Composite the layers.
    Render,
}

impl Step {
    /// Step name as written in scripts.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectTool { .. } => "select_tool",
            Self::Click { .. } => "click",
            Self::Vertex { .. } => "vertex",
            Self::Finish => "finish",
            Self::Fix { .. } => "fix",
            Self::StopTracking => "stop_tracking",
            Self::ClearLayer { .. } => "clear_layer",
            Self::Render => "render",
        }
    }
}

/// Parse a script from JSON.
///
/// # Errors
///
/// Returns an error if the JSON is not an array of steps.
pub fn parse_script(json: &str) -> HostResult<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a script file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> HostResult<Vec<Step>> {
    parse_script(&read_file(path)?)
}

fn read_file(path: &Path) -> HostResult<String> {
    std::fs::read_to_string(path).map_err(|source| HostError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// What a replay produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Steps executed.
    pub steps: usize,
    /// Measurements in the order they were reported.
    pub measurements: Vec<Measurement>,
    /// Fixes the widget applied.
    pub fixes_applied: usize,
    /// Draw completions ignored as stale.
    pub stale_draws: usize,
}

/// A mounted widget plus everything needed to drive it from a script.
pub struct Host {
    widget: MapWidget<PlanarEngine, SimulatedLocation>,
    measurements: Rc<RefCell<Vec<Measurement>>>,
    snapshot: bool,
}

impl Host {
    /// Mount the widget and start tracking.
    ///
    /// A refused location capability is not fatal; the host keeps running
    /// without a live position.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget cannot be mounted.
    pub fn new(config: HostConfig) -> HostResult<Self> {
        let engine = PlanarEngine::new(f64::from(config.width), f64::from(config.height))
            .map_err(|e| HostError::Mount(MapError::Engine(e)))?;
        let location = SimulatedLocation::new(config.availability);
        let mut widget = MapWidget::new(config.map, engine, location).map_err(HostError::Mount)?;

        let measurements = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&measurements);
        widget.on_measurement(move |m| sink.borrow_mut().push(*m));

        if let Err(e) = widget.start_tracking() {
            tracing::warn!("Running without live position: {e}");
        }

        Ok(Self {
            widget,
            measurements,
            snapshot: config.snapshot,
        })
    }

    /// The mounted widget.
    #[must_use]
    pub const fn widget(&self) -> &MapWidget<PlanarEngine, SimulatedLocation> {
        &self.widget
    }

    /// Whether the final snapshot should be printed.
    #[must_use]
    pub const fn wants_snapshot(&self) -> bool {
        self.snapshot
    }

    /// Current layers as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot_json(&self) -> HostResult<String> {
        self.widget.layers().to_json().map_err(HostError::Snapshot)
    }

    /// Replay steps in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first step that fails.
    pub fn run(&mut self, steps: &[Step]) -> HostResult<RunSummary> {
        let mut summary = RunSummary::default();
        let already_reported = self.measurements.borrow().len();

        for (index, step) in steps.iter().enumerate() {
            tracing::debug!("Step {index}: {}", step.name());
            self.run_step(index, step, &mut summary)?;
            summary.steps += 1;
        }

        summary.measurements = self.measurements.borrow()[already_reported..].to_vec();
        tracing::info!(
            "Replayed {} steps, {} measurements",
            summary.steps,
            summary.measurements.len()
        );
        Ok(summary)
    }

    fn run_step(&mut self, index: usize, step: &Step, summary: &mut RunSummary) -> HostResult<()> {
        let at_step = |source: MapError| HostError::Map { index, source };
        let engine_at_step = |e: EngineError| HostError::Map {
            index,
            source: MapError::Engine(e),
        };

        match step {
            Step::SelectTool { tool } => self.widget.select_tool(*tool).map_err(at_step)?,
            Step::Click { at } => {
                self.widget.on_map_click(*at).map_err(at_step)?;
            }
            Step::Vertex { at } => {
                let handle = self.active_handle(index, step)?;
                let finished = self
                    .widget
                    .engine_mut()
                    .add_vertex(handle, *at)
                    .map_err(engine_at_step)?;
                if let Some(event) = finished {
                    self.dispatch_draw(event, summary).map_err(at_step)?;
                }
            }
            Step::Finish => {
                let handle = self.active_handle(index, step)?;
                let event = self.widget.engine_mut().finish(handle).map_err(engine_at_step)?;
                self.dispatch_draw(event, summary).map_err(at_step)?;
            }
            Step::Fix {
                at,
                accuracy_m,
                timestamp_ms,
            } => {
                let fix = PositionFix::new(*at, *accuracy_m, *timestamp_ms).map_err(at_step)?;
                self.widget.location_mut().push_fix(fix);
                while let Some(event) = self.widget.location_mut().next_event() {
                    if self.widget.handle_event(event).map_err(at_step)?
                        == EventOutcome::Position(true)
                    {
                        summary.fixes_applied += 1;
                    }
                }
            }
            Step::StopTracking => self.widget.stop_tracking(),
            Step::ClearLayer { layer } => {
                self.widget.clear_layer(*layer).map_err(at_step)?;
            }
            Step::Render => self.widget.render().map_err(at_step)?,
        }
        Ok(())
    }

    fn dispatch_draw(&mut self, event: MapEvent, summary: &mut RunSummary) -> MapResult<()> {
        if let EventOutcome::Draw(DrawOutcome::Stale) = self.widget.handle_event(event)? {
            summary.stale_draws += 1;
        }
        Ok(())
    }

    fn active_handle(&self, index: usize, step: &Step) -> HostResult<map_core::HandleId> {
        self.widget
            .active_handle()
            .ok_or(HostError::NoActiveSession {
                index,
                step: step.name(),
            })
    }
}
