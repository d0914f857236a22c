//! Feature layers and the manager that owns them.
//!
//! Every layer mutation in the widget goes through [`LayerManager`]:
//! [`set_single_feature`](LayerManager::set_single_feature) for the roles that
//! represent a single live entity, [`append_feature`](LayerManager::append_feature)
//! for the drawing layer, and [`clear_layer`](LayerManager::clear_layer).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Geometry, MapError, MapResult};

/// Unique identifier for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureId(Uuid);

impl FeatureId {
    /// Create a new unique feature ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FeatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual role of a layer. Also used as the style tag of its features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerRole {
    /// The device's current position.
    LivePosition,
    /// Accuracy envelope around the current position.
    Accuracy,
    /// The user's single point-of-interest marker.
    Marker,
    /// Completed drawings.
    Drawing,
}

impl LayerRole {
    /// All roles, in composition order (bottom to top above the basemap).
    pub const ALL: [Self; 4] = [Self::LivePosition, Self::Accuracy, Self::Marker, Self::Drawing];

    /// Whether the layer holds at most one current feature.
    #[must_use]
    pub const fn is_single(self) -> bool {
        !matches!(self, Self::Drawing)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LivePosition => "live-position",
            Self::Accuracy => "accuracy",
            Self::Marker => "marker",
            Self::Drawing => "drawing",
        }
    }
}

impl std::fmt::Display for LayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerRole {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| MapError::InvalidLayer(format!("unknown layer role '{s}'")))
    }
}

/// A drawable geometry placed on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Unique identifier.
    pub id: FeatureId,
    /// The geometry.
    pub geometry: Geometry,
    /// Style tag, always the role of the owning layer.
    pub style: LayerRole,
}

impl Feature {
    fn new(style: LayerRole, geometry: Geometry) -> Self {
        Self {
            id: FeatureId::new(),
            geometry,
            style,
        }
    }
}

/// An ordered collection of features for one visual role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureLayer {
    role: LayerRole,
    features: Vec<Feature>,
}

impl FeatureLayer {
    fn new(role: LayerRole) -> Self {
        Self {
            role,
            features: Vec::new(),
        }
    }

    /// The layer's role.
    #[must_use]
    pub const fn role(&self) -> LayerRole {
        self.role
    }

    /// Features in insertion order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Most recently inserted feature.
    #[must_use]
    pub fn latest(&self) -> Option<&Feature> {
        self.features.last()
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the layer has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Owner of all feature layers.
///
/// Layers must be registered before use; operations on a role that was never
/// registered fail with [`MapError::InvalidLayer`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerManager {
    /// Registered layers, in composition order.
    layers: Vec<FeatureLayer>,
}

impl LayerManager {
    /// Create a manager with no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with every role registered, in composition order.
    #[must_use]
    pub fn with_default_layers() -> Self {
        let mut manager = Self::new();
        for role in LayerRole::ALL {
            manager.register(role);
        }
        manager
    }

    /// Register a layer for `role`. Returns `false` if it already existed.
    pub fn register(&mut self, role: LayerRole) -> bool {
        if self.layers.iter().any(|l| l.role == role) {
            return false;
        }
        self.layers.push(FeatureLayer::new(role));
        true
    }

    /// Get the layer for a role.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLayer`] if the role is not registered.
    pub fn layer(&self, role: LayerRole) -> MapResult<&FeatureLayer> {
        self.layers
            .iter()
            .find(|l| l.role == role)
            .ok_or_else(|| Self::unregistered(role))
    }

    fn layer_mut(&mut self, role: LayerRole) -> MapResult<&mut FeatureLayer> {
        self.layers
            .iter_mut()
            .find(|l| l.role == role)
            .ok_or_else(|| Self::unregistered(role))
    }

    fn unregistered(role: LayerRole) -> MapError {
        MapError::InvalidLayer(format!("layer '{role}' is not registered"))
    }

    /// Replace the content of a single-feature layer with one new feature.
    ///
    /// The layer is always cleared before inserting, so no stale feature
    /// survives.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLayer`] if the role is not registered or is
    /// the accumulating drawing role.
    pub fn set_single_feature(
        &mut self,
        role: LayerRole,
        geometry: Geometry,
    ) -> MapResult<FeatureId> {
        if !role.is_single() {
            return Err(MapError::InvalidLayer(format!(
                "layer '{role}' accumulates features; use append_feature"
            )));
        }
        let layer = self.layer_mut(role)?;
        layer.features.clear();
        let feature = Feature::new(role, geometry);
        let id = feature.id;
        layer.features.push(feature);
        tracing::trace!("Replaced feature on {role} layer: {id}");
        Ok(id)
    }

    /// Append a feature to the drawing layer without touching prior content.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLayer`] if the role is not registered or
    /// holds a single feature.
    pub fn append_feature(&mut self, role: LayerRole, geometry: Geometry) -> MapResult<FeatureId> {
        if role.is_single() {
            return Err(MapError::InvalidLayer(format!(
                "layer '{role}' holds a single feature; use set_single_feature"
            )));
        }
        let layer = self.layer_mut(role)?;
        let feature = Feature::new(role, geometry);
        let id = feature.id;
        layer.features.push(feature);
        tracing::trace!("Appended feature to {role} layer: {id} ({} total)", layer.len());
        Ok(id)
    }

    /// Remove every feature from a layer. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLayer`] if the role is not registered.
    pub fn clear_layer(&mut self, role: LayerRole) -> MapResult<usize> {
        let layer = self.layer_mut(role)?;
        let removed = layer.features.len();
        layer.features.clear();
        Ok(removed)
    }

    /// Number of features on a layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLayer`] if the role is not registered.
    pub fn feature_count(&self, role: LayerRole) -> MapResult<usize> {
        self.layer(role).map(FeatureLayer::len)
    }

    /// Registered layers in composition order.
    #[must_use]
    pub fn ordered_layers(&self) -> Vec<&FeatureLayer> {
        self.layers.iter().collect()
    }

    /// Serialize all layers to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> MapResult<String> {
        serde_json::to_string(self).map_err(MapError::Serialization)
    }
}
