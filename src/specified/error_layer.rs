//! Error layer
//!
//! Records (message, offending value) pairs. Merging across arguments appends
//! in argument order; marking the same object again puts the newest error
//! first.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::basic::{
    Annotated, Datum, FoldMerge, Layer, LayerRef, LayerValue, LayeredObject, MergeHandler,
};
use crate::equality::deep_equal;
use crate::error::{LayerError, Result};

use super::annotate_layer;

const ERROR: &str = "error";

/// An error message with the value it was raised against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPair {
    error: String,
    value: Value,
}

impl ErrorPair {
    pub fn new(error: impl Into<String>, value: Value) -> Self {
        Self {
            error: error.into(),
            value,
        }
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Same message, deep-equal value
    pub fn same_as(&self, other: &ErrorPair) -> bool {
        self.error == other.error && deep_equal(&self.value, &other.value)
    }

    /// `[self, other]`
    pub fn merge(&self, other: &ErrorPair) -> Vec<ErrorPair> {
        vec![self.clone(), other.clone()]
    }
}

impl fmt::Display for ErrorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (value: {})", self.error, self.value)
    }
}

pub fn make_error_pair(error: impl Into<String>, value: Value) -> ErrorPair {
    ErrorPair::new(error, value)
}

/// Concatenate two error lists; any other shape has no applicable handler
pub fn merge_error_pair(a: LayerValue, b: &LayerValue) -> Result<LayerValue> {
    match (a, b) {
        (LayerValue::Errors(mut a), LayerValue::Errors(b)) => {
            a.extend(b.iter().cloned());
            Ok(LayerValue::Errors(a))
        }
        (a, b) => Err(LayerError::no_applicable_handler("merge_error_pair", &[&a, b])),
    }
}

fn no_errors() -> LayerValue {
    LayerValue::Errors(Vec::new())
}

const ERROR_MERGE: FoldMerge = FoldMerge::new(ERROR, merge_error_pair, no_errors);

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLayer;

impl Layer for ErrorLayer {
    fn name(&self) -> &str {
        ERROR
    }

    fn default_value(&self) -> LayerValue {
        no_errors()
    }

    fn procedure(&self, _op_name: &str, _arity: usize) -> Option<MergeHandler> {
        Some(ERROR_MERGE.handler())
    }

    fn is_equal(&self, a: &LayeredObject, b: &LayeredObject) -> bool {
        match (self.get_value(a), self.get_value(b)) {
            (LayerValue::Errors(a), LayerValue::Errors(b)) => {
                a.len() == b.len() && a.iter().zip(&b).all(|(a, b)| a.same_as(b))
            }
            (a, b) => a == b,
        }
    }

    fn summarize_value(&self, object: &LayeredObject) -> Vec<String> {
        match self.get_value(object) {
            LayerValue::Errors(errors) => errors.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

static ERROR_LAYER: OnceLock<LayerRef> = OnceLock::new();

/// The error layer singleton
pub fn error_layer() -> LayerRef {
    ERROR_LAYER.get_or_init(|| Arc::new(ErrorLayer)).clone()
}

pub fn construct_error_value(base: &Value, error: impl Into<String>) -> Vec<ErrorPair> {
    vec![make_error_pair(error, base.clone())]
}

/// Record `error` against the base value of `base`
pub fn mark_error(base: impl Into<Datum>, error: impl Into<String>) -> LayeredObject {
    let base = base.into();
    let new_value = LayerValue::Errors(construct_error_value(base.base_value(), error));
    annotate_layer(base, &error_layer(), new_value, |new, old| {
        merge_error_pair(new, &old)
    })
}

pub fn has_error_layer(datum: &dyn Annotated) -> bool {
    error_layer().has_value(datum)
}

/// Errors recorded on `datum` (empty when it carries none)
pub fn get_error_layer_value(datum: &dyn Annotated) -> Result<Vec<ErrorPair>> {
    error_layer().get_value(datum).into_errors(ERROR)
}
