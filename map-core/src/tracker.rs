//! Geolocation tracker.
//!
//! Turns the stream of position fixes into the live-position and accuracy
//! features, and keeps the view framed on the accuracy envelope.

use crate::{
    Geometry, GeometryEngine, LayerManager, LayerRole, LocationSource, MapError, MapResult,
    Padding, PositionFix, TrackingOptions, WatchId,
};

/// Lifecycle of the position stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Not started yet (or the last start attempt failed).
    Idle,
    /// Receiving fixes through a platform watch.
    Tracking(WatchId),
    /// Stopped for good.
    Stopped,
}

/// Subscribes to device positions and mirrors them into feature layers.
#[derive(Debug)]
pub struct GeolocationTracker {
    state: TrackerState,
    continuous_recenter: bool,
    padding: Padding,
    current: Option<PositionFix>,
    fixes_processed: u64,
    view_fitted: bool,
}

impl GeolocationTracker {
    /// Create an idle tracker.
    ///
    /// With `continuous_recenter` the view is refit on every fix, otherwise
    /// only on the first one.
    #[must_use]
    pub const fn new(continuous_recenter: bool, padding: Padding) -> Self {
        Self {
            state: TrackerState::Idle,
            continuous_recenter,
            padding,
            current: None,
            fixes_processed: 0,
            view_fitted: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        self.state
    }

    /// Whether fixes are currently accepted.
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking(_))
    }

    /// Latest processed fix.
    #[must_use]
    pub const fn current_fix(&self) -> Option<&PositionFix> {
        self.current.as_ref()
    }

    /// Number of fixes applied to the layers.
    #[must_use]
    pub const fn fixes_processed(&self) -> u64 {
        self.fixes_processed
    }

    /// Begin continuous tracking. Does nothing if already tracking.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::LocationUnavailable`] if the platform refuses, and
    /// [`MapError::TrackerStopped`] after [`stop`](Self::stop). Failed starts
    /// are not retried.
    pub fn start<L>(&mut self, source: &mut L, high_accuracy: bool) -> MapResult<()>
    where
        L: LocationSource + ?Sized,
    {
        match self.state {
            TrackerState::Tracking(_) => return Ok(()),
            TrackerState::Stopped => return Err(MapError::TrackerStopped),
            TrackerState::Idle => {}
        }

        let watch = source.watch(TrackingOptions {
            enable_high_accuracy: high_accuracy,
        })?;
        self.state = TrackerState::Tracking(watch);
        tracing::info!("Geolocation tracking started ({watch}, high_accuracy={high_accuracy})");
        Ok(())
    }

    /// Stop tracking. Idempotent; no fix is applied afterwards.
    pub fn stop<L>(&mut self, source: &mut L)
    where
        L: LocationSource + ?Sized,
    {
        if let TrackerState::Tracking(watch) = self.state {
            source.clear_watch(watch);
            tracing::info!("Geolocation tracking stopped ({watch})");
        }
        self.state = TrackerState::Stopped;
    }

    /// Apply a fix: replace the live-position point and the accuracy circle,
    /// then frame the circle according to the recenter policy.
    ///
    /// Without continuous recentering the view is fit until one fit succeeds.
    ///
    /// Returns `false` when the fix was ignored because tracking is not
    /// active.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer is missing or the engine cannot adjust
    /// the view.
    pub fn on_position_change<E>(
        &mut self,
        fix: PositionFix,
        layers: &mut LayerManager,
        engine: &mut E,
    ) -> MapResult<bool>
    where
        E: GeometryEngine + ?Sized,
    {
        if !self.is_tracking() {
            tracing::trace!("Dropping position fix while not tracking");
            return Ok(false);
        }

        let position = fix.coordinate();
        let accuracy = Geometry::circle(position, fix.accuracy_m());
        let envelope = accuracy.extent();

        layers.set_single_feature(LayerRole::LivePosition, Geometry::point(position))?;
        layers.set_single_feature(LayerRole::Accuracy, accuracy)?;

        self.fixes_processed += 1;
        self.current = Some(fix);
        tracing::debug!(
            "Position fix {} at {position} (accuracy {:.1} m)",
            self.fixes_processed,
            fix.accuracy_m()
        );

        if self.continuous_recenter || !self.view_fitted {
            if let Some(extent) = envelope {
                engine.fit_view(&extent, self.padding)?;
                self.view_fitted = true;
            }
        }
        Ok(true)
    }
}
