//! Specified layers
//!
//! Concrete annotation layers and the helpers that attach them:
//!
//! | Layer | Payload | Merge |
//! |---|---|---|
//! | support | label set | union |
//! | error | error pairs | append in argument order |
//! | time | timestamped value | later timestamp wins |
//! | log | log entries | append in argument order |
//! | id | UUID set | union |
//! | annotation | notes | append in argument order |
//! | unit | unit string | depends on the operation |

mod annotation;
mod error_layer;
mod id;
mod log;
mod support;
mod time;
mod unit;

pub use annotation::{
    annotate, annotation_layer, get_annotation_layer_value, has_annotation_layer, AnnotationLayer,
};
pub use error_layer::{
    construct_error_value, error_layer, get_error_layer_value, has_error_layer, make_error_pair,
    mark_error, merge_error_pair, ErrorLayer, ErrorPair,
};
pub use id::{construct_id_value, get_id_layer_value, has_id_layer, id_layer, mark_id, IdLayer};
pub use log::{
    add_log, construct_log_value, get_log_layer_value, has_log_layer, log_layer, make_log_entry,
    merge_log_entry, LogEntry, LogLayer,
};
pub use support::{
    construct_support_value, get_support_layer_value, has_support_layer, support_by,
    support_by_all, support_layer, SupportLayer,
};
pub use time::{
    annotate_time, construct_time_value, get_time_layer_value, has_time_layer, time_layer,
    TimeLayer, TimeStampedValue,
};
pub use unit::{
    construct_unit_value, get_unit_layer_value, has_unit_layer, unit_layer, with_unit, UnitLayer,
};

use crate::basic::{Datum, LayerRef, LayerValue, LayeredObject};
use crate::error::{LayerError, Result};

/// Union of two label sets, left items first. Shared by the support and id
/// layers.
pub(crate) fn merge_label_sets(acc: LayerValue, next: &LayerValue) -> Result<LayerValue> {
    match (acc, next) {
        (LayerValue::Labels(acc), LayerValue::Labels(next)) => Ok(LayerValue::Labels(acc.merge(next))),
        (acc, next) => Err(LayerError::no_applicable_handler("merge_label_sets", &[&acc, next])),
    }
}

/// Order-free comparison of two label-set layer values
pub(crate) fn label_sets_equal(a: LayerValue, b: LayerValue) -> bool {
    match (a, b) {
        (LayerValue::Labels(a), LayerValue::Labels(b)) => a.same_keys(&b),
        (a, b) => a == b,
    }
}

/// Attach `new_value` on `layer` to `base`.
///
/// When `base` already carries the layer, `combine(new, old)` decides the
/// stored value; a combine failure (an old value of the wrong shape) is
/// logged and the new value replaces the old one.
pub(crate) fn annotate_layer<F>(
    base: Datum,
    layer: &LayerRef,
    new_value: LayerValue,
    combine: F,
) -> LayeredObject
where
    F: FnOnce(LayerValue, LayerValue) -> Result<LayerValue>,
{
    let object = base.into_layered();
    let value = match object.find_layer_value(layer.name()) {
        Some(old) => match combine(new_value.clone(), old.clone()) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(layer = layer.name(), error = %err, "replacing malformed layer value");
                new_value
            }
        },
        None => new_value,
    };
    object.with_pair(layer.clone(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::Layer;
    use crate::collections::LabelSet;
    use serde_json::json;

    #[test]
    fn test_merge_label_sets_keeps_left_first() {
        let merged = merge_label_sets(
            LayerValue::Labels(LabelSet::labels(["b", "a"])),
            &LayerValue::Labels(LabelSet::labels(["a", "c"])),
        )
        .unwrap();
        let labels: Vec<String> = merged.into_labels("support").unwrap().into_vec();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_merge_label_sets_rejects_other_shapes() {
        let err = merge_label_sets(
            LayerValue::Notes(vec![]),
            &LayerValue::Labels(LabelSet::empty()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LayerError::NoApplicableHandler { ref procedure, .. } if procedure == "merge_label_sets"
        ));
    }

    #[test]
    fn test_support_and_id_share_label_merge() {
        let support = support_layer().procedure("add", 2).unwrap();
        let ids = id_layer().procedure("add", 2).unwrap();
        let values = [
            LayerValue::Labels(LabelSet::labels(["x"])),
            LayerValue::Labels(LabelSet::labels(["y", "x"])),
        ];
        assert_eq!(
            support(&json!(0), &values).unwrap(),
            ids(&json!(0), &values).unwrap()
        );
    }

    #[test]
    fn test_label_sets_equal_ignores_order() {
        assert!(label_sets_equal(
            LayerValue::Labels(LabelSet::labels(["a", "b"])),
            LayerValue::Labels(LabelSet::labels(["b", "a"]))
        ));
        assert!(!label_sets_equal(
            LayerValue::Labels(LabelSet::labels(["a"])),
            LayerValue::Notes(vec![])
        ));
    }
}
