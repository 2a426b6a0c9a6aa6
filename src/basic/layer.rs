//! Layer protocol
//!
//! A layer describes one kind of annotation: its name, its default value, how
//! its values merge under a given operation, how two objects compare on it, and
//! how its values are summarized. Annotation layers implement [`Layer`]; the
//! base layer is the distinguished [`BaseLayer`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::layered_object::LayeredObject;
use super::merge::MergeHandler;
use super::value::{Annotated, LayerValue};

/// Name reserved for the base layer
pub const BASE_LAYER_NAME: &str = "base";

/// Shared handle to an annotation layer
pub type LayerRef = Arc<dyn Layer>;

/// One kind of annotation carried alongside a base value
///
/// Implementors supply the name, default value and merge procedure; presence
/// and value lookup are provided in terms of the owning `LayeredObject`.
pub trait Layer: fmt::Debug + Send + Sync {
    /// Stable identity of the layer
    fn name(&self) -> &str;

    /// Value used when an argument does not carry this layer
    fn default_value(&self) -> LayerValue;

    /// Merge procedure for operation `op_name` of the given arity, if any.
    /// Returning `None` drops the layer from that operation's result.
    fn procedure(&self, op_name: &str, arity: usize) -> Option<MergeHandler>;

    /// True if the value carries this layer
    fn has_value(&self, datum: &dyn Annotated) -> bool {
        datum
            .as_layered()
            .is_some_and(|object| object.has_layer_named(self.name()))
    }

    /// This layer's value on `datum`, or the default when absent
    fn get_value(&self, datum: &dyn Annotated) -> LayerValue {
        datum
            .as_layered()
            .and_then(|object| object.find_layer_value(self.name()))
            .cloned()
            .unwrap_or_else(|| self.default_value())
    }

    /// Layer-specific equality of two objects
    fn is_equal(&self, a: &LayeredObject, b: &LayeredObject) -> bool {
        self.get_value(a) == self.get_value(b)
    }

    fn summarize_self(&self) -> Vec<String> {
        vec![self.name().to_string()]
    }

    fn summarize_value(&self, object: &LayeredObject) -> Vec<String> {
        vec![self.get_value(object).to_string()]
    }
}

/// Identity function for sets of layers
pub fn identify_layer(layer: &LayerRef) -> String {
    layer.name().to_string()
}

/// The base layer: always present, its value is the base value itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseLayer;

impl BaseLayer {
    pub fn name(&self) -> &'static str {
        BASE_LAYER_NAME
    }

    pub fn has_value(&self, _datum: &dyn Annotated) -> bool {
        true
    }

    /// Base value of a layered object, or the plain value itself
    pub fn get_value<'a>(&self, datum: &'a dyn Annotated) -> &'a Value {
        datum.base_value()
    }

    pub fn summarize_self(&self) -> Vec<String> {
        vec![BASE_LAYER_NAME.to_string()]
    }

    pub fn summarize_value(&self, datum: &dyn Annotated) -> Vec<String> {
        vec![datum.base_value().to_string()]
    }
}

/// The base layer singleton
pub fn base_layer() -> BaseLayer {
    BaseLayer
}

/// Base value of any datum
pub fn get_base_value(datum: &dyn Annotated) -> &Value {
    base_layer().get_value(datum)
}
