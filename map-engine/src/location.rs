//! Simulated platform geolocation.

use std::collections::{HashSet, VecDeque};

use map_core::{LocationError, LocationSource, MapEvent, PositionFix, TrackingOptions, WatchId};
use serde::{Deserialize, Serialize};

/// What the simulated platform answers to a watch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Watches succeed.
    #[default]
    Available,
    /// The user refused location access.
    PermissionDenied,
    /// The device has no location capability.
    Unavailable,
}

/// A [`LocationSource`] fed from a queue of scripted fixes.
#[derive(Debug, Default)]
pub struct SimulatedLocation {
    availability: Availability,
    next_watch: u32,
    active: HashSet<WatchId>,
    last_options: Option<TrackingOptions>,
    pending: VecDeque<PositionFix>,
}

impl SimulatedLocation {
    /// Create a source with the given availability.
    #[must_use]
    pub fn new(availability: Availability) -> Self {
        Self {
            availability,
            ..Self::default()
        }
    }

    /// A source that grants every watch.
    #[must_use]
    pub fn available() -> Self {
        Self::new(Availability::Available)
    }

    /// A source whose user refused access.
    #[must_use]
    pub fn denied() -> Self {
        Self::new(Availability::PermissionDenied)
    }

    /// Queue a fix for delivery.
    pub fn push_fix(&mut self, fix: PositionFix) {
        self.pending.push_back(fix);
    }

    /// Next queued fix as a widget event.
    ///
    /// The fix is consumed even when no watch is active, as a platform keeps
    /// producing positions the widget no longer listens to; `None` is
    /// returned in that case.
    pub fn next_event(&mut self) -> Option<MapEvent> {
        let fix = self.pending.pop_front()?;
        if self.active.is_empty() {
            tracing::trace!("Dropping fix at {} with no active watch", fix.coordinate());
            return None;
        }
        Some(MapEvent::PositionChanged(fix))
    }

    /// Number of fixes still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether any watch is active.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        !self.active.is_empty()
    }

    /// Number of active watches.
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.active.len()
    }

    /// Options of the most recent watch request.
    #[must_use]
    pub const fn last_options(&self) -> Option<TrackingOptions> {
        self.last_options
    }
}

impl LocationSource for SimulatedLocation {
    fn watch(&mut self, options: TrackingOptions) -> Result<WatchId, LocationError> {
        self.last_options = Some(options);
        match self.availability {
            Availability::PermissionDenied => Err(LocationError::PermissionDenied),
            Availability::Unavailable => Err(LocationError::PositionUnavailable(
                "no positioning hardware".into(),
            )),
            Availability::Available => {
                self.next_watch += 1;
                let watch = WatchId::new(self.next_watch);
                self.active.insert(watch);
                tracing::debug!("Started {watch} (high_accuracy={})", options.enable_high_accuracy);
                Ok(watch)
            }
        }
    }

    fn clear_watch(&mut self, watch: WatchId) {
        if self.active.remove(&watch) {
            tracing::debug!("Cleared {watch}");
        }
    }
}
