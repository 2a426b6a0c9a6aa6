//! Layered consolidators
//!
//! A consolidator reduces several layered values to one summary instead of a
//! new layered object. It runs an inner layered procedure whose base function
//! only collects its arguments, so the inner result carries the merged value of
//! every participating layer, and then folds a reducer over that result's
//! (layer, value) pairs.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::layer::LayerRef;
use super::layered_object::LayeredObject;
use super::procedure::{LayerKey, LayeredProcedure};
use super::value::{Annotated, LayerValue};
use crate::config::LayeredConfig;
use crate::error::Result;

/// Fold step over one (layer, value) pair
pub type Reducer<A> = Arc<dyn Fn(A, (&LayerRef, &LayerValue)) -> A + Send + Sync>;

/// (layer, value of that layer on `datum`, defaulted when absent)
pub fn to_layer_pair(layer: &LayerRef, datum: &dyn Annotated) -> (LayerRef, LayerValue) {
    (layer.clone(), layer.get_value(datum))
}

/// Fold `reducer` over the annotation pairs of `object` in layer order
pub fn layers_reduce<A>(
    object: &LayeredObject,
    reducer: impl Fn(A, (&LayerRef, &LayerValue)) -> A,
    initial: A,
) -> A {
    object.layer_pairs().fold(initial, reducer)
}

/// Reduces layered values to a single summary of type `A`
pub struct LayeredConsolidator<A> {
    dispatcher: LayeredProcedure,
    reducer: Reducer<A>,
    initial: A,
}

impl<A: Clone> LayeredConsolidator<A> {
    /// The inner procedure computing per-layer values
    pub fn dispatcher(&self) -> &LayeredProcedure {
        &self.dispatcher
    }

    pub fn name(&self) -> &str {
        self.dispatcher.name()
    }

    /// Register a multi-argument aggregator for one layer. The handler gets
    /// the collected base values (as a JSON array) and one value per argument.
    pub fn define_layer_dispatcher<F>(&self, layer: impl Into<LayerKey>, handler: F) -> Result<()>
    where
        F: Fn(&Value, &[LayerValue]) -> Result<LayerValue> + Send + Sync + 'static,
    {
        self.dispatcher.define_handler(layer, handler)
    }

    /// Merge the arguments' layers and reduce them to a summary
    pub fn call(&self, args: &[&dyn Annotated]) -> Result<A> {
        let assessed = self.dispatcher.call(args)?;
        let reducer = &self.reducer;
        Ok(layers_reduce(
            &assessed,
            |acc, pair| reducer(acc, pair),
            self.initial.clone(),
        ))
    }
}

impl<A: fmt::Debug> fmt::Debug for LayeredConsolidator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredConsolidator")
            .field("dispatcher", &self.dispatcher)
            .field("initial", &self.initial)
            .finish()
    }
}

fn collect_arguments(args: &[Value]) -> Value {
    Value::Array(args.to_vec())
}

/// Build a consolidator named `name`; its inner procedure is `<name>_dispatcher`
pub fn construct_layered_consolidator<A, R>(
    name: &str,
    arity: usize,
    reducer: R,
    initial: A,
) -> LayeredConsolidator<A>
where
    R: Fn(A, (&LayerRef, &LayerValue)) -> A + Send + Sync + 'static,
{
    construct_layered_consolidator_with_config(name, arity, reducer, initial, LayeredConfig::default())
}

pub fn construct_layered_consolidator_with_config<A, R>(
    name: &str,
    arity: usize,
    reducer: R,
    initial: A,
    config: LayeredConfig,
) -> LayeredConsolidator<A>
where
    R: Fn(A, (&LayerRef, &LayerValue)) -> A + Send + Sync + 'static,
{
    LayeredConsolidator {
        dispatcher: LayeredProcedure::with_config(
            format!("{}_dispatcher", name),
            arity,
            collect_arguments,
            config,
        ),
        reducer: Arc::new(reducer),
        initial,
    }
}

/// Register `handler` as the aggregator `consolidator` uses for `layer`
pub fn define_consolidator_per_layer_dispatcher<A, F>(
    consolidator: &LayeredConsolidator<A>,
    layer: impl Into<LayerKey>,
    handler: F,
) -> Result<()>
where
    A: Clone,
    F: Fn(&Value, &[LayerValue]) -> Result<LayerValue> + Send + Sync + 'static,
{
    consolidator.define_layer_dispatcher(layer, handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specified::{annotate_time, mark_error, support_by, support_layer, time_layer};
    use serde_json::json;

    #[test]
    fn test_dispatcher_name() {
        let consolidator = construct_layered_consolidator("count", 1, |acc: usize, _| acc + 1, 0);
        assert_eq!(consolidator.name(), "count_dispatcher");
    }

    #[test]
    fn test_counts_layers_in_order() {
        let names = construct_layered_consolidator(
            "names",
            2,
            |mut acc: Vec<String>, (layer, _)| {
                acc.push(layer.name().to_string());
                acc
            },
            Vec::new(),
        );
        let a = support_by(1, "a");
        let b = mark_error(2, "bad");
        assert_eq!(names.call(&[&a, &b]).unwrap(), vec!["support", "error"]);
    }

    #[test]
    fn test_initial_returned_without_layers() {
        let sum = construct_layered_consolidator("sum", 1, |acc: i64, _| acc + 1, 0);
        assert_eq!(sum.call(&[&json!(42)]).unwrap(), 0);
    }

    #[test]
    fn test_dispatcher_sees_collected_bases() {
        let bases = construct_layered_consolidator(
            "bases",
            2,
            |acc: Value, (_, value)| value.as_json().cloned().unwrap_or(acc),
            Value::Null,
        );
        define_consolidator_per_layer_dispatcher(&bases, &support_layer(), |base, _| {
            Ok(LayerValue::Json(base.clone()))
        })
        .unwrap();
        let result = bases
            .call(&[&support_by(1, "a"), &support_by(2, "b")])
            .unwrap();
        assert_eq!(result, json!([1, 2]));
    }

    #[test]
    fn test_to_layer_pair_defaults() {
        let (layer, value) = to_layer_pair(&time_layer(), &json!(1));
        assert_eq!(layer.name(), "time");
        assert_eq!(value, time_layer().default_value());

        let timed = annotate_time(1, Some(500));
        let (_, value) = to_layer_pair(&time_layer(), &timed);
        assert_eq!(value.as_time().map(|t| t.timestamp), Some(500));
    }
}
