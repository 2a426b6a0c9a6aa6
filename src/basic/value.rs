//! Values flowing through layered computations
//!
//! `Datum` is what annotation helpers and procedures accept: either a plain
//! JSON value or a `LayeredObject`. `LayerValue` is the closed set of payloads
//! an annotation layer can hold.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::layered_object::LayeredObject;
use crate::collections::LabelSet;
use crate::error::{LayerError, Result};
use crate::specified::{ErrorPair, LogEntry, TimeStampedValue};

/// Anything with a base value: plain values are their own base
pub trait Annotated {
    /// The base-layer value
    fn base_value(&self) -> &Value;

    /// The layered view, if this value carries layers
    fn as_layered(&self) -> Option<&LayeredObject>;
}

impl Annotated for Value {
    fn base_value(&self) -> &Value {
        self
    }

    fn as_layered(&self) -> Option<&LayeredObject> {
        None
    }
}

impl Annotated for LayeredObject {
    fn base_value(&self) -> &Value {
        self.base()
    }

    fn as_layered(&self) -> Option<&LayeredObject> {
        Some(self)
    }
}

/// A plain value or a layered object
#[derive(Debug, Clone)]
pub enum Datum {
    Plain(Value),
    Layered(LayeredObject),
}

impl Datum {
    /// Lift into a layered object; plain values get no annotation layers
    pub fn into_layered(self) -> LayeredObject {
        match self {
            Datum::Plain(value) => LayeredObject::from_base(value),
            Datum::Layered(object) => object,
        }
    }

    pub fn is_layered(&self) -> bool {
        matches!(self, Datum::Layered(_))
    }
}

impl Annotated for Datum {
    fn base_value(&self) -> &Value {
        match self {
            Datum::Plain(value) => value,
            Datum::Layered(object) => object.base(),
        }
    }

    fn as_layered(&self) -> Option<&LayeredObject> {
        match self {
            Datum::Plain(_) => None,
            Datum::Layered(object) => Some(object),
        }
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        Datum::Plain(value)
    }
}

impl From<LayeredObject> for Datum {
    fn from(object: LayeredObject) -> Self {
        Datum::Layered(object)
    }
}

impl From<&LayeredObject> for Datum {
    fn from(object: &LayeredObject) -> Self {
        Datum::Layered(object.clone())
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Plain(Value::from(value))
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Plain(Value::from(value))
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Plain(Value::from(value))
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Plain(Value::from(value))
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::Plain(Value::from(value))
    }
}

/// Payload of one annotation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LayerValue {
    /// Label sets (support, id)
    Labels(LabelSet),
    /// Error records
    Errors(Vec<ErrorPair>),
    /// Timestamped value
    Time(TimeStampedValue),
    /// Log entries
    Log(Vec<LogEntry>),
    /// Free-text notes
    Notes(Vec<String>),
    /// Anything else, including results of custom handlers
    Json(Value),
}

impl LayerValue {
    /// Short name of the payload shape, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            LayerValue::Labels(_) => "labels",
            LayerValue::Errors(_) => "errors",
            LayerValue::Time(_) => "time",
            LayerValue::Log(_) => "log",
            LayerValue::Notes(_) => "notes",
            LayerValue::Json(_) => "json",
        }
    }

    pub fn as_labels(&self) -> Option<&LabelSet> {
        match self {
            LayerValue::Labels(labels) => Some(labels),
            _ => None,
        }
    }

    pub fn as_errors(&self) -> Option<&[ErrorPair]> {
        match self {
            LayerValue::Errors(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&TimeStampedValue> {
        match self {
            LayerValue::Time(time) => Some(time),
            _ => None,
        }
    }

    pub fn as_log(&self) -> Option<&[LogEntry]> {
        match self {
            LayerValue::Log(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_notes(&self) -> Option<&[String]> {
        match self {
            LayerValue::Notes(notes) => Some(notes),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            LayerValue::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Error for a payload that does not have the shape `layer` stores
    pub(crate) fn unexpected(&self, layer: &str) -> LayerError {
        LayerError::UnexpectedLayerValue {
            layer: layer.to_string(),
            found: format!("{} {}", self.kind(), self),
        }
    }

    pub(crate) fn into_labels(self, layer: &str) -> Result<LabelSet> {
        match self {
            LayerValue::Labels(labels) => Ok(labels),
            other => Err(other.unexpected(layer)),
        }
    }

    pub(crate) fn into_errors(self, layer: &str) -> Result<Vec<ErrorPair>> {
        match self {
            LayerValue::Errors(errors) => Ok(errors),
            other => Err(other.unexpected(layer)),
        }
    }

    pub(crate) fn into_time(self, layer: &str) -> Result<TimeStampedValue> {
        match self {
            LayerValue::Time(time) => Ok(time),
            other => Err(other.unexpected(layer)),
        }
    }

    pub(crate) fn into_log(self, layer: &str) -> Result<Vec<LogEntry>> {
        match self {
            LayerValue::Log(entries) => Ok(entries),
            other => Err(other.unexpected(layer)),
        }
    }

    pub(crate) fn into_notes(self, layer: &str) -> Result<Vec<String>> {
        match self {
            LayerValue::Notes(notes) => Ok(notes),
            other => Err(other.unexpected(layer)),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl fmt::Display for LayerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerValue::Labels(labels) => write!(f, "{}", labels),
            LayerValue::Errors(errors) => write_list(f, errors),
            LayerValue::Time(time) => write!(f, "{}", time),
            LayerValue::Log(entries) => write_list(f, entries),
            LayerValue::Notes(notes) => write_list(f, notes),
            LayerValue::Json(value) => write!(f, "{}", value),
        }
    }
}
