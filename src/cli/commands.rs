//! CLI Command Implementations
//!
//! Each command returns the text to print so it can be tested without a
//! terminal.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::{Number, Value};
use tracing::info;

use super::input::{load_inputs, AnnotatedInput};
use super::CombineOp;
use crate::basic::{
    construct_layered_consolidator_with_config, Annotated, LayeredObject, LayeredProcedure,
};
use crate::config::LayeredConfig;
use crate::equality::{layered_base_equal, layered_deep_equal};

fn build_objects(
    inputs: &[AnnotatedInput],
    config: &LayeredConfig,
) -> anyhow::Result<Vec<LayeredObject>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            input
                .to_layered(config.duplicate_layer_policy)
                .with_context(|| format!("input #{} is not a valid layered value", index))
        })
        .collect()
}

fn load_objects(path: &Path, config: &LayeredConfig) -> anyhow::Result<Vec<LayeredObject>> {
    let inputs = load_inputs(path)?;
    if inputs.is_empty() {
        bail!("{} holds no values", path.display());
    }
    build_objects(&inputs, config)
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Integer fold when every argument is an `i64` and nothing overflows
fn checked_integers(args: &[Value], init: i64, op: fn(i64, i64) -> Option<i64>) -> Option<Value> {
    if !args.iter().all(Value::is_i64) {
        return None;
    }
    args.iter()
        .filter_map(Value::as_i64)
        .try_fold(init, op)
        .map(Value::from)
}

// Overflowing integer input falls back to floating point.
fn sum(args: &[Value]) -> Value {
    checked_integers(args, 0, i64::checked_add)
        .unwrap_or_else(|| number(args.iter().filter_map(Value::as_f64).sum()))
}

fn product(args: &[Value]) -> Value {
    checked_integers(args, 1, i64::checked_mul)
        .unwrap_or_else(|| number(args.iter().filter_map(Value::as_f64).product()))
}

fn concat(args: &[Value]) -> Value {
    let text: String = args
        .iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    Value::String(text)
}

fn collect(args: &[Value]) -> Value {
    Value::Array(args.to_vec())
}

/// The layered procedure behind a `combine` operation
pub fn combine_procedure(op: CombineOp, arity: usize, config: LayeredConfig) -> LayeredProcedure {
    let base: fn(&[Value]) -> Value = match op {
        CombineOp::Sum => sum,
        CombineOp::Product => product,
        CombineOp::Concat => concat,
        CombineOp::Collect => collect,
    };
    LayeredProcedure::with_config(op.procedure_name(), arity, base, config)
}

/// Combine every value in `path` with `op`
pub fn combine(
    path: &Path,
    op: CombineOp,
    json: bool,
    config: &LayeredConfig,
) -> anyhow::Result<String> {
    info!("Combining values from: {}", path.display());

    let objects = load_objects(path, config)?;
    if matches!(op, CombineOp::Sum | CombineOp::Product)
        && !objects.iter().all(|object| object.base().is_number())
    {
        bail!("{} needs numeric values", op.procedure_name());
    }

    let procedure = combine_procedure(op, objects.len(), config.clone());
    let args: Vec<&dyn Annotated> = objects
        .iter()
        .map(|object| object as &dyn Annotated)
        .collect();
    let result = procedure
        .call(&args)
        .with_context(|| format!("{} failed", procedure.name()))?;

    if json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(result.describe_self())
    }
}

/// Compare the two values in `path`
pub fn compare(path: &Path, config: &LayeredConfig) -> anyhow::Result<String> {
    info!("Comparing values from: {}", path.display());

    let objects = load_objects(path, config)?;
    let [a, b] = objects.as_slice() else {
        bail!("compare needs exactly two values, got {}", objects.len());
    };

    let base_equal = layered_base_equal(a, b);
    let deep_equal = layered_deep_equal(a, b)?;
    Ok(format!("base equal: {}\nlayered equal: {}", base_equal, deep_equal))
}

/// Merge every layer across the values in `path` and list the results
pub fn summarize(path: &Path, config: &LayeredConfig) -> anyhow::Result<String> {
    info!("Summarizing values from: {}", path.display());

    let objects = load_objects(path, config)?;
    let consolidator = construct_layered_consolidator_with_config(
        "summarize",
        objects.len(),
        |mut lines: Vec<String>, (layer, value)| {
            lines.push(format!("{}: {}", layer.name(), value));
            lines
        },
        Vec::new(),
        config.clone(),
    );
    let args: Vec<&dyn Annotated> = objects
        .iter()
        .map(|object| object as &dyn Annotated)
        .collect();
    let lines = consolidator.call(&args)?;

    if lines.is_empty() {
        return Ok("no annotation layers".to_string());
    }
    Ok(lines.join("\n"))
}
