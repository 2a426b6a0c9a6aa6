//! Time layer
//!
//! Keeps the value observed at the latest timestamp. On equal timestamps a
//! non-null value beats null, then the value whose JSON text sorts greater
//! wins, so the merge does not depend on argument order.

use std::cmp::Ordering;
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

const TIME: &str = "time";

/// A value with the millisecond timestamp it was observed at
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeStampedValue {
    pub value: Value,
    pub timestamp: i64,
}

impl TimeStampedValue {
    pub fn new(value: Value, timestamp: i64) -> Self {
        Self { value, timestamp }
    }

    /// Whichever of `self` and `other` is later
    pub fn later(self, other: &TimeStampedValue) -> TimeStampedValue {
        let ordering = self
            .timestamp
            .cmp(&other.timestamp)
            .then_with(|| tie_break(&self.value, &other.value));
        match ordering {
            Ordering::Less => other.clone(),
            _ => self,
        }
    }
}

fn tie_break(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

impl fmt::Display for TimeStampedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}",
            self.value,
            timestamp_to_ordinary_time(self.timestamp)
        )
    }
}

fn merge_time_value(acc: LayerValue, next: &LayerValue) -> Result<LayerValue> {
    match (acc, next) {
        (LayerValue::Time(acc), LayerValue::Time(next)) => Ok(LayerValue::Time(acc.later(next))),
        (acc, next) => Err(LayerError::no_applicable_handler("merge_time_value", &[&acc, next])),
    }
}

fn no_time() -> LayerValue {
    LayerValue::Time(TimeStampedValue::default())
}

const TIME_MERGE: FoldMerge = FoldMerge::new(TIME, merge_time_value, no_time);

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeLayer;

impl Layer for TimeLayer {
    fn name(&self) -> &str {
        TIME
    }

    fn default_value(&self) -> LayerValue {
        no_time()
    }

    fn procedure(&self, _op_name: &str, _arity: usize) -> Option<MergeHandler> {
        Some(TIME_MERGE.handler())
    }

    fn is_equal(&self, a: &LayeredObject, b: &LayeredObject) -> bool {
        match (self.get_value(a), self.get_value(b)) {
            (LayerValue::Time(a), LayerValue::Time(b)) => {
                a.timestamp == b.timestamp && deep_equal(&a.value, &b.value)
            }
            (a, b) => a == b,
        }
    }
}

static TIME_LAYER: OnceLock<LayerRef> = OnceLock::new();

/// The time layer singleton
pub fn time_layer() -> LayerRef {
    TIME_LAYER.get_or_init(|| Arc::new(TimeLayer)).clone()
}

pub fn construct_time_value(base: &Value, timestamp: Option<i64>) -> TimeStampedValue {
    TimeStampedValue::new(base.clone(), timestamp.unwrap_or_else(now_millis))
}

/// Stamp the base value of `base` with `timestamp`, or the current time
pub fn annotate_time(base: impl Into<Datum>, timestamp: Option<i64>) -> LayeredObject {
    let base = base.into();
    let new_value = LayerValue::Time(construct_time_value(base.base_value(), timestamp));
    annotate_layer(base, &time_layer(), new_value, |new, old| {
        merge_time_value(new, &old)
    })
}

pub fn has_time_layer(datum: &dyn Annotated) -> bool {
    time_layer().has_value(datum)
}

/// Timestamped value of `datum` (`{null, 0}` when it carries none)
pub fn get_time_layer_value(datum: &dyn Annotated) -> Result<TimeStampedValue> {
    time_layer().get_value(datum).into_time(TIME)
}
