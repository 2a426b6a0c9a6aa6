//! Annotation layer: free-text notes, appended in order

use std::sync::{Arc, OnceLock};

use crate::basic::{
    Annotated, Datum, FoldMerge, Layer, LayerRef, LayerValue, LayeredObject, MergeHandler,
};
use crate::error::{LayerError, Result};

use super::annotate_layer;

const ANNOTATION: &str = "annotation";

fn no_notes() -> LayerValue {
    LayerValue::Notes(Vec::new())
}

fn merge_notes(acc: LayerValue, next: &LayerValue) -> Result<LayerValue> {
    match (acc, next) {
        (LayerValue::Notes(mut acc), LayerValue::Notes(next)) => {
            acc.extend(next.iter().cloned());
            Ok(LayerValue::Notes(acc))
        }
        (acc, next) => Err(LayerError::no_applicable_handler("merge_notes", &[&acc, next])),
    }
}

const NOTES_MERGE: FoldMerge = FoldMerge::new(ANNOTATION, merge_notes, no_notes);

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationLayer;

impl Layer for AnnotationLayer {
    fn name(&self) -> &str {
        ANNOTATION
    }

    fn default_value(&self) -> LayerValue {
        no_notes()
    }

    fn procedure(&self, _op_name: &str, _arity: usize) -> Option<MergeHandler> {
        Some(NOTES_MERGE.handler())
    }

    fn summarize_value(&self, object: &LayeredObject) -> Vec<String> {
        match self.get_value(object) {
            LayerValue::Notes(notes) => notes,
            other => vec![other.to_string()],
        }
    }
}

static ANNOTATION_LAYER: OnceLock<LayerRef> = OnceLock::new();

pub fn annotation_layer() -> LayerRef {
    ANNOTATION_LAYER
        .get_or_init(|| Arc::new(AnnotationLayer))
        .clone()
}

/// Append a note to `base`
pub fn annotate(base: impl Into<Datum>, note: impl Into<String>) -> LayeredObject {
    let new_value = LayerValue::Notes(vec![note.into()]);
    annotate_layer(base.into(), &annotation_layer(), new_value, |new, old| {
        merge_notes(old, &new)
    })
}

pub fn has_annotation_layer(datum: &dyn Annotated) -> bool {
    annotation_layer().has_value(datum)
}

pub fn get_annotation_layer_value(datum: &dyn Annotated) -> Result<Vec<String>> {
    annotation_layer().get_value(datum).into_notes(ANNOTATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_annotate_appends_notes() {
        let object = annotate(annotate(json!("x"), "first"), "second");
        assert!(has_annotation_layer(&object));
        assert_eq!(
            get_annotation_layer_value(&object).unwrap(),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_summary_lists_notes() {
        let object = annotate(1, "checked by hand");
        assert_eq!(
            object.summarize_self(),
            vec!["base: 1", "annotation: checked by hand"]
        );
    }
}
