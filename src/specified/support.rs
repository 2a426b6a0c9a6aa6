//! Support layer
//!
//! Provenance labels justifying a value. Merging takes the union; equality
//! ignores label order.

use std::sync::{Arc, OnceLock};

use crate::basic::{
    Annotated, Datum, FoldMerge, Layer, LayerRef, LayerValue, LayeredObject, MergeHandler,
};
use crate::collections::LabelSet;
use crate::error::Result;

use super::{annotate_layer, label_sets_equal, merge_label_sets};

const SUPPORT: &str = "support";

fn empty_support() -> LayerValue {
    LayerValue::Labels(LabelSet::empty())
}

const SUPPORT_MERGE: FoldMerge = FoldMerge::new(SUPPORT, merge_label_sets, empty_support);

#[derive(Debug, Clone, Copy, Default)]
pub struct SupportLayer;

impl Layer for SupportLayer {
    fn name(&self) -> &str {
        SUPPORT
    }

    fn default_value(&self) -> LayerValue {
        empty_support()
    }

    fn procedure(&self, _op_name: &str, _arity: usize) -> Option<MergeHandler> {
        Some(SUPPORT_MERGE.handler())
    }

    fn is_equal(&self, a: &LayeredObject, b: &LayeredObject) -> bool {
        label_sets_equal(self.get_value(a), self.get_value(b))
    }

    fn summarize_value(&self, object: &LayeredObject) -> Vec<String> {
        match self.get_value(object) {
            LayerValue::Labels(labels) => labels.into_vec(),
            other => vec![other.to_string()],
        }
    }
}

static SUPPORT_LAYER: OnceLock<LayerRef> = OnceLock::new();

/// The support layer singleton
pub fn support_layer() -> LayerRef {
    SUPPORT_LAYER
        .get_or_init(|| Arc::new(SupportLayer))
        .clone()
}

pub fn construct_support_value(labels: impl IntoIterator<Item = impl Into<String>>) -> LabelSet {
    LabelSet::labels(labels)
}

/// Add one support label; existing labels keep their place in front
pub fn support_by(base: impl Into<Datum>, label: impl Into<String>) -> LayeredObject {
    support_by_all(base, [label.into()])
}

/// Add several support labels at once
pub fn support_by_all(
    base: impl Into<Datum>,
    labels: impl IntoIterator<Item = impl Into<String>>,
) -> LayeredObject {
    let new_value = LayerValue::Labels(construct_support_value(labels));
    annotate_layer(base.into(), &support_layer(), new_value, |new, old| {
        merge_label_sets(old, &new)
    })
}

pub fn has_support_layer(datum: &dyn Annotated) -> bool {
    support_layer().has_value(datum)
}

/// Support labels of `datum` (empty when it carries none)
pub fn get_support_layer_value(datum: &dyn Annotated) -> Result<LabelSet> {
    support_layer().get_value(datum).into_labels(SUPPORT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_support_by_plain_value() {
        let object = support_by(1, "test");
        assert!(has_support_layer(&object));
        assert_eq!(object.base(), &json!(1));
        let labels: Vec<String> = get_support_layer_value(&object).unwrap().into_vec();
        assert_eq!(labels, vec!["test"]);
    }

    #[test]
    fn test_repeated_support_keeps_old_first() {
        let object = support_by(support_by(5, "a"), "b");
        let labels: Vec<String> = get_support_layer_value(&object).unwrap().keys().collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(object.layer_names(), vec!["support"]);

        let again = support_by(object, "a");
        assert_eq!(get_support_layer_value(&again).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_support_is_empty() {
        assert!(!has_support_layer(&json!(1)));
        assert!(get_support_layer_value(&json!(1)).unwrap().is_empty());
    }

    #[test]
    fn test_merge_rejects_other_shapes() {
        let err = merge_label_sets(empty_support(), &LayerValue::Json(json!(1))).unwrap_err();
        assert_eq!(err.error_code(), "NO_APPLICABLE_HANDLER");
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = support_by_all(1, ["x", "y"]);
        let b = support_by_all(1, ["y", "x"]);
        assert!(support_layer().is_equal(&a, &b));
        assert!(!support_layer().is_equal(&a, &support_by(1, "x")));
    }
}
