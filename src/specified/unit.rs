//! Unit layer
//!
//! A physical unit string carried with a numeric value. Unlike the other
//! layers the merge depends on the operation: `add` and `subtract` insist on
//! matching units, `multiply`, `divide` and `square` derive a new unit, and any
//! other operation drops the layer from its result. The empty string means
//! dimensionless.

use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::basic::{
    merge_handler, Annotated, Datum, Layer, LayerRef, LayerValue, LayeredObject, MergeHandler,
};
use crate::error::{LayerError, Result};

use super::annotate_layer;

const UNIT: &str = "unit";

/// Layer payload for `unit`
pub fn construct_unit_value(unit: impl Into<String>) -> LayerValue {
    LayerValue::Json(Value::String(unit.into()))
}

fn unit_strings(values: &[LayerValue]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|value| match value {
            LayerValue::Json(Value::String(unit)) => Ok(unit.clone()),
            other => Err(other.unexpected(UNIT)),
        })
        .collect()
}

fn same_unit(operation: &'static str) -> MergeHandler {
    merge_handler(move |_base, values| {
        let units = unit_strings(values)?;
        match units.split_first() {
            None => Ok(construct_unit_value("")),
            Some((first, rest)) if rest.iter().all(|unit| unit == first) => {
                Ok(construct_unit_value(first.clone()))
            }
            Some(_) => Err(LayerError::IncompatibleUnits {
                operation: operation.to_string(),
                units,
            }),
        }
    })
}

fn product_unit() -> MergeHandler {
    merge_handler(|_base, values| {
        let units = unit_strings(values)?;
        let factors: Vec<&str> = units
            .iter()
            .map(String::as_str)
            .filter(|unit| !unit.is_empty())
            .collect();
        Ok(construct_unit_value(factors.join("*")))
    })
}

fn quotient_unit() -> MergeHandler {
    merge_handler(|_base, values| {
        let units = unit_strings(values)?;
        let unit = match units.as_slice() {
            [numerator, denominator] if denominator.is_empty() => numerator.clone(),
            [numerator, denominator] if numerator.is_empty() => format!("1/{}", denominator),
            [numerator, denominator] => format!("{}/{}", numerator, denominator),
            _ => {
                return Err(LayerError::ArityMismatch {
                    procedure: "divide".to_string(),
                    expected: 2,
                    actual: units.len(),
                })
            }
        };
        Ok(construct_unit_value(unit))
    })
}

fn square_unit() -> MergeHandler {
    merge_handler(|_base, values| {
        let units = unit_strings(values)?;
        match units.as_slice() {
            [unit] if unit.is_empty() => Ok(construct_unit_value("")),
            [unit] => Ok(construct_unit_value(format!("{}^2", unit))),
            _ => Err(LayerError::ArityMismatch {
                procedure: "square".to_string(),
                expected: 1,
                actual: units.len(),
            }),
        }
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnitLayer;

impl Layer for UnitLayer {
    fn name(&self) -> &str {
        UNIT
    }

    fn default_value(&self) -> LayerValue {
        construct_unit_value("")
    }

    fn procedure(&self, op_name: &str, arity: usize) -> Option<MergeHandler> {
        match (op_name, arity) {
            ("add", _) => Some(same_unit("add")),
            ("subtract", _) => Some(same_unit("subtract")),
            ("multiply", _) => Some(product_unit()),
            ("divide", 2) => Some(quotient_unit()),
            ("square", 1) => Some(square_unit()),
            _ => None,
        }
    }

    fn summarize_value(&self, object: &LayeredObject) -> Vec<String> {
        match self.get_value(object) {
            LayerValue::Json(Value::String(unit)) => vec![unit],
            other => vec![other.to_string()],
        }
    }
}

static UNIT_LAYER: OnceLock<LayerRef> = OnceLock::new();

pub fn unit_layer() -> LayerRef {
    UNIT_LAYER.get_or_init(|| Arc::new(UnitLayer)).clone()
}

/// Attach `unit` to `base`, replacing any unit it already had
pub fn with_unit(base: impl Into<Datum>, unit: impl Into<String>) -> LayeredObject {
    annotate_layer(base.into(), &unit_layer(), construct_unit_value(unit), |new, _old| {
        Ok(new)
    })
}

pub fn has_unit_layer(datum: &dyn Annotated) -> bool {
    unit_layer().has_value(datum)
}

/// Unit of `datum` (`""` when it carries none)
pub fn get_unit_layer_value(datum: &dyn Annotated) -> Result<String> {
    match unit_layer().get_value(datum) {
        LayerValue::Json(Value::String(unit)) => Ok(unit),
        other => Err(other.unexpected(UNIT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(op: &str, units: &[&str]) -> Option<Result<LayerValue>> {
        let values: Vec<LayerValue> = units.iter().map(|unit| construct_unit_value(*unit)).collect();
        unit_layer()
            .procedure(op, units.len())
            .map(|handler| handler(&Value::Null, &values))
    }

    #[test]
    fn test_with_unit_replaces() {
        let object = with_unit(with_unit(3, "m"), "s");
        assert!(has_unit_layer(&object));
        assert_eq!(get_unit_layer_value(&object).unwrap(), "s");
        assert_eq!(get_unit_layer_value(&json!(3)).unwrap(), "");
    }

    #[test]
    fn test_add_requires_matching_units() {
        let merged = run("add", &["m", "m"]).unwrap().unwrap();
        assert_eq!(merged, construct_unit_value("m"));

        let err = run("add", &["m", "s"]).unwrap().unwrap_err();
        assert_eq!(err.error_code(), "INCOMPATIBLE_UNITS");
    }

    #[test]
    fn test_derived_units() {
        assert_eq!(run("multiply", &["m", "s"]).unwrap().unwrap(), construct_unit_value("m*s"));
        assert_eq!(run("multiply", &["m", ""]).unwrap().unwrap(), construct_unit_value("m"));
        assert_eq!(run("divide", &["m", "s"]).unwrap().unwrap(), construct_unit_value("m/s"));
        assert_eq!(run("divide", &["", "s"]).unwrap().unwrap(), construct_unit_value("1/s"));
        assert_eq!(run("square", &["m"]).unwrap().unwrap(), construct_unit_value("m^2"));
    }

    #[test]
    fn test_other_operations_drop_the_layer() {
        assert!(run("concat", &["m", "m"]).is_none());
        assert!(run("divide", &["m", "s", "kg"]).is_none());
    }
}
