//! Layered procedures
//!
//! A layered procedure lifts a plain n-ary function over JSON values into a
//! function over layered values. Calling it:
//! 1. applies the base function to the arguments' base values
//! 2. collects the union (by name) of the arguments' annotation layers
//! 3. resolves a merge handler per layer: a handler registered on this
//!    procedure wins, otherwise the layer's own `procedure(name, arity)`;
//!    layers without a handler are dropped
//! 4. calls each handler with the base result and every argument's layer
//!    value (or the layer default)
//! 5. returns a new layered object from the results

use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::layer::{identify_layer, LayerRef};
use super::layered_object::LayeredObject;
use super::merge::MergeHandler;
use super::value::{Annotated, Datum, LayerValue};
use crate::collections::BetterSet;
use crate::config::LayeredConfig;
use crate::error::{LayerError, Result};

/// Plain function applied to the arguments' base values
pub type BaseProcedure = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// A layer, or just its name, naming where a handler applies
#[derive(Debug, Clone)]
pub enum LayerKey {
    Name(String),
    Layer(LayerRef),
}

impl LayerKey {
    pub fn name(&self) -> &str {
        match self {
            LayerKey::Name(name) => name,
            LayerKey::Layer(layer) => layer.name(),
        }
    }
}

impl From<&str> for LayerKey {
    fn from(name: &str) -> Self {
        LayerKey::Name(name.to_string())
    }
}

impl From<String> for LayerKey {
    fn from(name: String) -> Self {
        LayerKey::Name(name)
    }
}

impl From<LayerRef> for LayerKey {
    fn from(layer: LayerRef) -> Self {
        LayerKey::Layer(layer)
    }
}

impl From<&LayerRef> for LayerKey {
    fn from(layer: &LayerRef) -> Self {
        LayerKey::Layer(layer.clone())
    }
}

#[derive(Clone)]
struct HandlerEntry {
    layer_name: String,
    handler: MergeHandler,
}

fn identify_handler(entry: &HandlerEntry) -> String {
    entry.layer_name.clone()
}

/// Name, arity, base function and per-layer handler overrides of one
/// layered procedure
pub struct LayeredProcedureMetadata {
    name: String,
    arity: usize,
    base_procedure: BaseProcedure,
    handlers: RwLock<BetterSet<HandlerEntry>>,
    config: LayeredConfig,
}

impl LayeredProcedureMetadata {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        base_procedure: BaseProcedure,
        config: LayeredConfig,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            base_procedure,
            handlers: RwLock::new(BetterSet::new(identify_handler)),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    pub fn base_procedure(&self) -> &BaseProcedure {
        &self.base_procedure
    }

    /// Register (or replace) the handler used for `layer_name`
    pub fn set_handler(&self, layer_name: &str, handler: MergeHandler) {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.insert(HandlerEntry {
            layer_name: layer_name.to_string(),
            handler,
        });
    }

    /// Registered override for `layer`, else the layer's own procedure
    pub fn get_handler(&self, layer: &LayerRef) -> Option<MergeHandler> {
        let registered = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(layer.name())
            .map(|entry| entry.handler.clone());
        registered.or_else(|| layer.procedure(&self.name, self.arity))
    }

    /// Names of layers with a registered override
    pub fn handler_names(&self) -> Vec<String> {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .collect()
    }
}

impl fmt::Debug for LayeredProcedureMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredProcedureMetadata")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("handlers", &self.handler_names())
            .field("config", &self.config)
            .finish()
    }
}

/// A plain function lifted over layered values
///
/// Clones share the same metadata, so a handler defined through any clone is
/// seen by all of them.
#[derive(Debug, Clone)]
pub struct LayeredProcedure {
    metadata: Arc<LayeredProcedureMetadata>,
}

impl LayeredProcedure {
    pub fn new<F>(name: impl Into<String>, arity: usize, base_procedure: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self::with_config(name, arity, base_procedure, LayeredConfig::default())
    }

    pub fn with_config<F>(
        name: impl Into<String>,
        arity: usize,
        base_procedure: F,
        config: LayeredConfig,
    ) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            metadata: Arc::new(LayeredProcedureMetadata::new(
                name,
                arity,
                Arc::new(base_procedure),
                config,
            )),
        }
    }

    pub fn metadata(&self) -> &LayeredProcedureMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// Override the merge handler for one layer on this procedure
    ///
    /// # Errors
    /// Returns `InvalidLayerName` if the layer name is empty
    pub fn define_handler<F>(&self, layer: impl Into<LayerKey>, handler: F) -> Result<()>
    where
        F: Fn(&Value, &[LayerValue]) -> Result<LayerValue> + Send + Sync + 'static,
    {
        let key = layer.into();
        if key.name().is_empty() {
            return Err(LayerError::InvalidLayerName {
                name: key.name().to_string(),
            });
        }
        tracing::debug!(
            procedure = self.name(),
            layer = key.name(),
            "registering layered procedure handler"
        );
        self.metadata.set_handler(key.name(), Arc::new(handler));
        Ok(())
    }

    /// Apply the procedure
    ///
    /// # Errors
    /// - `ArityMismatch` when the config demands strict arity and the
    ///   argument count differs from the declared arity
    /// - any error raised by a layer's merge handler
    pub fn call(&self, args: &[&dyn Annotated]) -> Result<LayeredObject> {
        let metadata = &self.metadata;
        if args.len() != metadata.arity {
            if metadata.config.strict_arity {
                return Err(LayerError::ArityMismatch {
                    procedure: metadata.name.clone(),
                    expected: metadata.arity,
                    actual: args.len(),
                });
            }
            tracing::debug!(
                procedure = %metadata.name,
                expected = metadata.arity,
                actual = args.len(),
                "layered procedure called with a different argument count"
            );
        }

        let base_args: Vec<Value> = args.iter().map(|arg| arg.base_value().clone()).collect();
        let base_value = (metadata.base_procedure)(&base_args);

        let layers = args
            .iter()
            .filter_map(|arg| arg.as_layered())
            .fold(BetterSet::new(identify_layer), |union, object| {
                union.merge(&object.annotation_layers())
            });

        let mut pairs = Vec::with_capacity(layers.len());
        for layer in layers.iter() {
            let Some(handler) = metadata.get_handler(layer) else {
                tracing::debug!(
                    procedure = %metadata.name,
                    layer = layer.name(),
                    "no merge handler, dropping layer"
                );
                continue;
            };
            let values: Vec<LayerValue> = args.iter().map(|arg| layer.get_value(*arg)).collect();
            let value = handler(&base_value, &values)?;
            pairs.push((layer.clone(), value));
        }

        Ok(LayeredObject::from_validated(base_value, pairs))
    }

    /// Apply the procedure to owned data
    pub fn apply(&self, args: &[Datum]) -> Result<LayeredObject> {
        let refs: Vec<&dyn Annotated> = args.iter().map(|arg| arg as &dyn Annotated).collect();
        self.call(&refs)
    }
}

/// Lift `base_procedure` into a layered procedure
pub fn make_layered_procedure<F>(name: impl Into<String>, arity: usize, base_procedure: F) -> LayeredProcedure
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    LayeredProcedure::new(name, arity, base_procedure)
}

/// Override the merge handler `procedure` uses for `layer`
pub fn define_layered_procedure_handler<F>(
    procedure: &LayeredProcedure,
    layer: impl Into<LayerKey>,
    handler: F,
) -> Result<()>
where
    F: Fn(&Value, &[LayerValue]) -> Result<LayerValue> + Send + Sync + 'static,
{
    procedure.define_handler(layer, handler)
}
