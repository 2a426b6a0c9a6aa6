//! Engine configuration
//!
//! Loaded from JSON. Every field has a default so partial files are accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What `update_layer_with` does when the layer name is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateLayerPolicy {
    /// Fail with `LayerError::DuplicateLayer`
    #[default]
    Reject,
    /// Replace the existing value, keeping the layer's position
    Overwrite,
}

/// Configuration shared by layered procedures and consolidators
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredConfig {
    /// Policy applied when a layer is added twice to the same object
    pub duplicate_layer_policy: DuplicateLayerPolicy,
    /// Reject calls whose argument count differs from the declared arity
    pub strict_arity: bool,
}

impl LayeredConfig {
    /// Parse a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid JSON
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), ?config, "loaded layered config");
        Ok(config)
    }
}
