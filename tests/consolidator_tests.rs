//! Consolidator Tests
//!
//! Reducing layered values to summaries, with and without per-layer
//! dispatchers.

use serde_json::{json, Value};

use layered::basic::{construct_layered_datum, LayerValue};
use layered::specified::{
    annotate_time, construct_error_value, construct_support_value, construct_time_value,
    error_layer, mark_error, support_by, support_layer, time_layer,
};
use layered::{
    construct_layered_consolidator, define_consolidator_per_layer_dispatcher, LayerError,
    LayeredObject,
};

fn summary_object(base: i64, labels: &[&str], timestamp: i64, error: &str) -> LayeredObject {
    construct_layered_datum(
        json!(base),
        [
            (
                support_layer(),
                LayerValue::Labels(construct_support_value(labels.iter().copied())),
            ),
            (
                time_layer(),
                LayerValue::Time(construct_time_value(&json!(base), Some(timestamp))),
            ),
            (
                error_layer(),
                LayerValue::Errors(construct_error_value(&json!(base), error)),
            ),
        ],
    )
    .unwrap()
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Summary {
    support_count: usize,
    max_time: i64,
    total_errors: usize,
}

// === Basic Consolidation ===

#[test]
fn test_reducer_without_dispatchers_returns_initial() {
    let identity = construct_layered_consolidator("sum_base", 1, |acc: i64, _| acc, 0);
    assert_eq!(identity.call(&[&support_by(42, "test")]).unwrap(), 0);
}

#[test]
fn test_reducer_sees_every_layer() {
    let tracker = construct_layered_consolidator(
        "layer_tracker",
        1,
        |mut names: Vec<String>, (layer, _)| {
            names.push(layer.name().to_string());
            names
        },
        Vec::new(),
    );
    let names = tracker
        .call(&[&summary_object(100, &["base", "support"], 2000, "multi_error")])
        .unwrap();
    assert_eq!(names, vec!["support", "time", "error"]);
}

#[test]
fn test_summary_across_two_objects() {
    let summary = construct_layered_consolidator(
        "summary_multi",
        2,
        |mut acc: Summary, (layer, value)| {
            match layer.name() {
                "support" => acc.support_count += value.as_labels().map_or(0, |l| l.len()),
                "time" => {
                    let timestamp = value.as_time().map_or(0, |t| t.timestamp);
                    acc.max_time = acc.max_time.max(timestamp);
                }
                "error" => acc.total_errors += value.as_errors().map_or(0, <[_]>::len),
                _ => {}
            }
            acc
        },
        Summary::default(),
    );

    let a = summary_object(100, &["s1", "s2"], 1000, "error1");
    let b = summary_object(200, &["s3"], 2000, "error2");
    assert_eq!(
        summary.call(&[&a, &b]).unwrap(),
        Summary {
            support_count: 3,
            max_time: 2000,
            total_errors: 2,
        }
    );
}

#[test]
fn test_consolidators_are_independent() {
    let first = construct_layered_consolidator("first", 1, |acc: i64, _| acc + 1, 0);
    let second = construct_layered_consolidator("second", 1, |acc: i64, _| acc + 1, 0);
    define_consolidator_per_layer_dispatcher(&first, support_layer(), |_, _| {
        Ok(LayerValue::Json(Value::Null))
    })
    .unwrap();
    assert_eq!(first.dispatcher().metadata().handler_names(), vec!["support"]);
    assert!(second.dispatcher().metadata().handler_names().is_empty());
}

// === Per-Layer Dispatchers ===

#[test]
fn test_time_dispatcher_takes_max_timestamp() {
    let time_dispatcher = construct_layered_consolidator(
        "time_dispatcher_multi",
        2,
        |acc: i64, (layer, value)| match (layer.name(), value) {
            ("time", LayerValue::Json(max)) => max.as_i64().unwrap_or(acc),
            _ => acc,
        },
        0,
    );
    define_consolidator_per_layer_dispatcher(&time_dispatcher, time_layer(), |_, values| {
        let max = values
            .iter()
            .filter_map(|value| value.as_time().map(|t| t.timestamp))
            .max()
            .unwrap_or(0);
        Ok(LayerValue::Json(json!(max)))
    })
    .unwrap();

    let result = time_dispatcher
        .call(&[&annotate_time(10, Some(1000)), &annotate_time(20, Some(2500))])
        .unwrap();
    assert_eq!(result, 2500);
}

#[test]
fn test_error_dispatcher_counts_errors() {
    let error_dispatcher = construct_layered_consolidator(
        "error_dispatcher_multi",
        2,
        |acc: i64, (layer, value)| match (layer.name(), value) {
            ("error", LayerValue::Json(count)) => count.as_i64().unwrap_or(acc),
            _ => acc,
        },
        0,
    );
    define_consolidator_per_layer_dispatcher(&error_dispatcher, error_layer(), |_, values| {
        let count: usize = values
            .iter()
            .map(|value| value.as_errors().map_or(0, <[_]>::len))
            .sum();
        Ok(LayerValue::Json(json!(count)))
    })
    .unwrap();

    let result = error_dispatcher
        .call(&[&mark_error(mark_error(1, "a"), "b"), &mark_error(2, "c")])
        .unwrap();
    assert_eq!(result, 3);
}

#[test]
fn test_support_dispatcher_with_mixed_layers() {
    let supports = construct_layered_consolidator(
        "dispatcher_support_multi",
        2,
        |acc: Vec<String>, (layer, value)| match (layer.name(), value) {
            ("support", LayerValue::Labels(labels)) => labels.keys().collect(),
            _ => acc,
        },
        Vec::new(),
    );
    define_consolidator_per_layer_dispatcher(&supports, "support", |base, values| {
        let mut merged = layered::LabelSet::empty();
        for labels in values.iter().filter_map(LayerValue::as_labels) {
            merged = merged.merge(labels);
        }
        let count = base.as_array().map_or(0, Vec::len);
        Ok(LayerValue::Labels(merged.add_item(format!("args:{}", count))))
    })
    .unwrap();

    let result = supports
        .call(&[&support_by(10, "prem1"), &mark_error(20, "Error message")])
        .unwrap();
    assert_eq!(result, vec!["prem1", "args:2"]);
}

#[test]
fn test_dispatcher_errors_propagate() {
    let failing = construct_layered_consolidator("failing", 1, |acc: i64, _| acc, 0);
    define_consolidator_per_layer_dispatcher(&failing, support_layer(), |_, _| {
        Err(LayerError::NotLayered {
            value: "boom".to_string(),
        })
    })
    .unwrap();
    let err = failing.call(&[&support_by(1, "a")]).unwrap_err();
    assert_eq!(err.error_code(), "NOT_LAYERED");
}

#[test]
fn test_base_value_kinds() {
    let strings = construct_layered_consolidator("string_consolidator", 1, |acc: String, _| acc, String::new());
    assert_eq!(strings.call(&[&support_by("hello", "s")]).unwrap(), "");

    let nulls = construct_layered_consolidator("null_consolidator", 1, |acc: usize, _| acc + 1, 0);
    let object = construct_layered_datum(
        Value::Null,
        [(
            support_layer(),
            LayerValue::Labels(construct_support_value(["nullable"])),
        )],
    )
    .unwrap();
    assert_eq!(nulls.call(&[&object]).unwrap(), 1);
}
