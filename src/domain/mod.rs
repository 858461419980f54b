//! Domain entities: the renderable map and its identity.
//!
//! Maps are constructed and pooled by the caller; the dispatch core only
//! reads them. Engagement tracking is keyed by [`MapId`] in a side table
//! owned by the dispatcher, never stored on the map itself.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a map instance. Two clones of the same map share an id and
/// therefore share an engagement slot.
pub type MapId = Uuid;

pub const DEFAULT_TILE_EXTENT: u32 = 4096;

/// A named layer of pre-extracted features. Feature payloads are opaque to
/// the dispatch core; only the renderer interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }
}

/// A renderable map: caller-owned, read-only to the dispatch core.
///
/// At most one render job may be active against a given map instance at any
/// time; the dispatcher enforces this at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    #[serde(default = "Uuid::new_v4")]
    pub id: MapId,
    pub name: String,
    /// Tile coordinate extent the renderer targets.
    #[serde(default = "default_extent")]
    pub extent: u32,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

fn default_extent() -> u32 {
    DEFAULT_TILE_EXTENT
}

impl Map {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            extent: DEFAULT_TILE_EXTENT,
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }
}
