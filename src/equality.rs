//! Structural equality over layered values
//!
//! Base values are compared with [`deep_equal`]; annotation layers must match
//! by name and every shared layer must agree under its own `is_equal`.
//! Values are JSON trees, so recursion needs no cycle guard.

use serde_json::Value;

use crate::basic::{Annotated, LayeredObject};
use crate::error::{LayerError, Result};

/// Recursive structural equality
///
/// Numbers compare numerically (`1 == 1.0`), arrays element-wise, objects
/// key-by-key with equal key counts.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, value)| y.get(key).is_some_and(|other| deep_equal(value, other)))
        }
        _ => false,
    }
}

/// Base values deep-equal, whether plain or layered
pub fn layered_base_equal(a: &dyn Annotated, b: &dyn Annotated) -> bool {
    deep_equal(a.base_value(), b.base_value())
}

/// Full structural equality of two layered objects
///
/// # Errors
/// Returns `NotLayered` if either argument is a plain value
pub fn layered_deep_equal(a: &dyn Annotated, b: &dyn Annotated) -> Result<bool> {
    let a = require_layered(a)?;
    let b = require_layered(b)?;
    Ok(objects_equal(a, b))
}

fn require_layered(datum: &dyn Annotated) -> Result<&LayeredObject> {
    datum.as_layered().ok_or_else(|| LayerError::NotLayered {
        value: datum.base_value().to_string(),
    })
}

/// Same number of annotation layers
pub fn layers_length_equal(a: &LayeredObject, b: &LayeredObject) -> bool {
    a.annotation_layers().len() == b.annotation_layers().len()
}

/// Same annotation layer names, and every layer agrees under its own
/// `is_equal` in both directions. Base values are not compared.
pub fn all_layers_value_equal(a: &LayeredObject, b: &LayeredObject) -> bool {
    let layers_a = a.annotation_layers();
    let layers_b = b.annotation_layers();
    if !layers_a.same_keys(&layers_b) {
        return false;
    }

    layers_a.every(|layer| layer.is_equal(a, b)) && layers_b.every(|layer| layer.is_equal(b, a))
}

pub(crate) fn objects_equal(a: &LayeredObject, b: &LayeredObject) -> bool {
    deep_equal(a.base(), b.base()) && layers_length_equal(a, b) && all_layers_value_equal(a, b)
}
