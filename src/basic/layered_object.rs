//! Layered objects
//!
//! An immutable bundle of a base value plus annotation layers, stored as an
//! ordered set of (layer, value) pairs keyed by layer name. Every update
//! returns a new object.

use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::layer::{identify_layer, LayerRef, BASE_LAYER_NAME};
use super::value::LayerValue;
use crate::collections::BetterSet;
use crate::config::DuplicateLayerPolicy;
use crate::error::{LayerError, Result};

/// One annotation layer with its value
pub type LayerPair = (LayerRef, LayerValue);

fn identify_pair(pair: &LayerPair) -> String {
    pair.0.name().to_string()
}

/// Base value plus annotation layers
#[derive(Debug, Clone)]
pub struct LayeredObject {
    base: Value,
    alist: BetterSet<LayerPair>,
}

impl LayeredObject {
    /// Build an object from a base value and its initial layer pairs
    ///
    /// # Errors
    /// - `MalformedPair` if a pair uses the base layer name or an empty name
    /// - `DuplicateLayer` if two pairs share a layer name
    pub fn new(base: Value, pairs: impl IntoIterator<Item = LayerPair>) -> Result<Self> {
        let mut object = Self::from_base(base);
        for (layer, value) in pairs {
            object = object.update_layer(layer, value)?;
        }
        Ok(object)
    }

    /// An object carrying no annotation layers
    pub fn from_base(base: Value) -> Self {
        Self {
            base,
            alist: BetterSet::new(identify_pair),
        }
    }

    /// Build from pairs already known to have distinct, valid names
    pub(crate) fn from_validated(base: Value, pairs: Vec<LayerPair>) -> Self {
        Self {
            base,
            alist: BetterSet::from_items(pairs, identify_pair),
        }
    }

    /// The base-layer value
    pub fn base(&self) -> &Value {
        &self.base
    }

    pub fn has_layer(&self, layer: &LayerRef) -> bool {
        self.has_layer_named(layer.name())
    }

    pub fn has_layer_named(&self, name: &str) -> bool {
        self.alist.has_key(name)
    }

    /// Value stored for `layer`
    ///
    /// # Errors
    /// Returns `LayerNotFound` if the object does not carry the layer. Use
    /// `Layer::get_value` to fall back to the layer's default instead.
    pub fn get_layer_value(&self, layer: &LayerRef) -> Result<&LayerValue> {
        self.find_layer_value(layer.name())
            .ok_or_else(|| LayerError::LayerNotFound {
                layer: layer.name().to_string(),
            })
    }

    pub fn find_layer_value(&self, name: &str) -> Option<&LayerValue> {
        self.alist.get(name).map(|(_, value)| value)
    }

    /// New object with `layer` added
    ///
    /// # Errors
    /// - `DuplicateLayer` if the object already carries a layer with that name
    /// - `MalformedPair` if the layer is named like the base layer or unnamed
    pub fn update_layer(&self, layer: LayerRef, value: LayerValue) -> Result<Self> {
        self.update_layer_with(layer, value, DuplicateLayerPolicy::Reject)
    }

    /// New object with `layer` added, resolving an existing layer of the same
    /// name according to `policy`
    pub fn update_layer_with(
        &self,
        layer: LayerRef,
        value: LayerValue,
        policy: DuplicateLayerPolicy,
    ) -> Result<Self> {
        let name = layer.name();
        if name.is_empty() || name == BASE_LAYER_NAME {
            return Err(LayerError::MalformedPair {
                reason: format!(
                    "layer {:?} cannot annotate base value {} (value: {})",
                    name, self.base, value
                ),
            });
        }

        if self.has_layer_named(name) {
            match policy {
                DuplicateLayerPolicy::Reject => {
                    return Err(LayerError::DuplicateLayer {
                        layer: name.to_string(),
                    });
                }
                DuplicateLayerPolicy::Overwrite => {
                    tracing::debug!(layer = name, "overwriting existing layer value");
                }
            }
        }

        Ok(self.with_pair(layer, value))
    }

    /// New object where `layer` holds `value`, replacing any existing value
    /// in place (last write wins)
    pub fn set_layer(&self, layer: LayerRef, value: LayerValue) -> Result<Self> {
        self.update_layer_with(layer, value, DuplicateLayerPolicy::Overwrite)
    }

    /// Unchecked insert-or-replace for layers already validated elsewhere
    pub(crate) fn with_pair(&self, layer: LayerRef, value: LayerValue) -> Self {
        Self {
            base: self.base.clone(),
            alist: self.alist.add_item((layer, value)),
        }
    }

    /// New object without `layer`; unchanged if the layer is absent
    pub fn remove_layer(&self, layer: &LayerRef) -> Self {
        Self {
            base: self.base.clone(),
            alist: self.alist.remove(layer.name()),
        }
    }

    /// All layers except the base layer, in insertion order
    pub fn annotation_layers(&self) -> BetterSet<LayerRef> {
        self.alist
            .map_to_new_set(|(layer, _)| layer.clone(), identify_layer)
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.alist.keys().collect()
    }

    /// (layer, value) pairs in insertion order
    pub fn layer_pairs(&self) -> impl Iterator<Item = (&LayerRef, &LayerValue)> {
        self.alist.iter().map(|(layer, value)| (layer, value))
    }

    /// One line for the base value, then one line per annotation layer
    pub fn summarize_self(&self) -> Vec<String> {
        let mut lines = vec![format!("{}: {}", BASE_LAYER_NAME, self.base)];
        for (layer, _) in self.alist.iter() {
            lines.push(format!(
                "{}: {}",
                layer.summarize_self().join(" "),
                layer.summarize_value(self).join(", ")
            ));
        }
        lines
    }

    pub fn describe_self(&self) -> String {
        self.summarize_self().join("\n")
    }
}

/// Build a layered object from a base value and (layer, value) pairs
pub fn construct_layered_datum(
    base: Value,
    pairs: impl IntoIterator<Item = LayerPair>,
) -> Result<LayeredObject> {
    LayeredObject::new(base, pairs)
}

impl fmt::Display for LayeredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe_self())
    }
}

impl PartialEq for LayeredObject {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::objects_equal(self, other)
    }
}

struct LayersView<'a>(&'a BetterSet<LayerPair>);

impl Serialize for LayersView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (layer, value) in self.0.iter() {
            map.serialize_entry(layer.name(), value)?;
        }
        map.end()
    }
}

impl Serialize for LayeredObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LayeredObject", 2)?;
        state.serialize_field("base", &self.base)?;
        state.serialize_field("layers", &LayersView(&self.alist))?;
        state.end()
    }
}
