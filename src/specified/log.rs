//! Log layer
//!
//! Timestamped messages. Merging and repeated logging both append, so entries
//! read in the order they were written.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::basic::{
    Annotated, Datum, FoldMerge, Layer, LayerRef, LayerValue, LayeredObject, MergeHandler,
};
use crate::equality::deep_equal;
use crate::error::{LayerError, Result};
use crate::utility::{now_millis, timestamp_to_ordinary_time};

use super::annotate_layer;

const LOG: &str = "log";

/// One log message about a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    message: String,
    value: Value,
    timestamp: i64,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, value: Value, timestamp: i64) -> Self {
        Self {
            message: message.into(),
            value,
            timestamp,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn describe_self(&self) -> String {
        format!(
            "{}, at: {}, value: {}",
            self.message,
            timestamp_to_ordinary_time(self.timestamp),
            self.value
        )
    }

    /// Same message and timestamp, deep-equal value
    pub fn same_as(&self, other: &LogEntry) -> bool {
        self.message == other.message
            && self.timestamp == other.timestamp
            && deep_equal(&self.value, &other.value)
    }

    /// `[self, other]`
    pub fn merge(&self, other: &LogEntry) -> Vec<LogEntry> {
        vec![self.clone(), other.clone()]
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe_self())
    }
}

/// Log entry for `value` stamped with the current time
pub fn make_log_entry(value: Value, message: impl Into<String>) -> LogEntry {
    LogEntry::new(message, value, now_millis())
}

/// Concatenate two entry lists; any other shape has no applicable handler
pub fn merge_log_entry(a: LayerValue, b: &LayerValue) -> Result<LayerValue> {
    match (a, b) {
        (LayerValue::Log(mut a), LayerValue::Log(b)) => {
            a.extend(b.iter().cloned());
            Ok(LayerValue::Log(a))
        }
        (a, b) => Err(LayerError::no_applicable_handler("merge_log_entry", &[&a, b])),
    }
}

fn no_log() -> LayerValue {
    LayerValue::Log(Vec::new())
}

const LOG_MERGE: FoldMerge = FoldMerge::new(LOG, merge_log_entry, no_log);

#[derive(Debug, Clone, Copy, Default)]
pub struct LogLayer;

impl Layer for LogLayer {
    fn name(&self) -> &str {
        LOG
    }

    fn default_value(&self) -> LayerValue {
        no_log()
    }

    fn procedure(&self, _op_name: &str, _arity: usize) -> Option<MergeHandler> {
        Some(LOG_MERGE.handler())
    }

    fn is_equal(&self, a: &LayeredObject, b: &LayeredObject) -> bool {
        match (self.get_value(a), self.get_value(b)) {
            (LayerValue::Log(a), LayerValue::Log(b)) => {
                a.len() == b.len() && a.iter().zip(&b).all(|(a, b)| a.same_as(b))
            }
            (a, b) => a == b,
        }
    }

    fn summarize_value(&self, object: &LayeredObject) -> Vec<String> {
        match self.get_value(object) {
            LayerValue::Log(entries) => entries.iter().map(LogEntry::describe_self).collect(),
            other => vec![other.to_string()],
        }
    }
}

static LOG_LAYER: OnceLock<LayerRef> = OnceLock::new();

/// The log layer singleton
pub fn log_layer() -> LayerRef {
    LOG_LAYER.get_or_init(|| Arc::new(LogLayer)).clone()
}

pub fn construct_log_value(base: &Value, message: impl Into<String>) -> Vec<LogEntry> {
    vec![make_log_entry(base.clone(), message)]
}

/// Append a log message about the base value of `base`
pub fn add_log(base: impl Into<Datum>, message: impl Into<String>) -> LayeredObject {
    let base = base.into();
    let new_value = LayerValue::Log(construct_log_value(base.base_value(), message));
    annotate_layer(base, &log_layer(), new_value, |new, old| {
        merge_log_entry(old, &new)
    })
}

pub fn has_log_layer(datum: &dyn Annotated) -> bool {
    log_layer().has_value(datum)
}

/// Log entries of `datum` (empty when it carries none)
pub fn get_log_layer_value(datum: &dyn Annotated) -> Result<Vec<LogEntry>> {
    log_layer().get_value(datum).into_log(LOG)
}
