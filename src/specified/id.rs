//! Id layer
//!
//! Fresh UUIDv4 tokens identifying where a value came from. Merging takes the
//! union.

use std::sync::{Arc, OnceLock};

use uuid::Uuid;

use crate::basic::{
    Annotated, Datum, FoldMerge, Layer, LayerRef, LayerValue, LayeredObject, MergeHandler,
};
use crate::collections::LabelSet;
use crate::error::Result;

use super::{annotate_layer, label_sets_equal, merge_label_sets};

const ID: &str = "id";

fn no_ids() -> LayerValue {
    LayerValue::Labels(LabelSet::empty())
}

const ID_MERGE: FoldMerge = FoldMerge::new(ID, merge_label_sets, no_ids);

#[derive(Debug, Clone, Copy, Default)]
pub struct IdLayer;

impl Layer for IdLayer {
    fn name(&self) -> &str {
        ID
    }

    fn default_value(&self) -> LayerValue {
        no_ids()
    }

    fn procedure(&self, _op_name: &str, _arity: usize) -> Option<MergeHandler> {
        Some(ID_MERGE.handler())
    }

    fn is_equal(&self, a: &LayeredObject, b: &LayeredObject) -> bool {
        label_sets_equal(self.get_value(a), self.get_value(b))
    }
}

static ID_LAYER: OnceLock<LayerRef> = OnceLock::new();

/// The id layer singleton
pub fn id_layer() -> LayerRef {
    ID_LAYER.get_or_init(|| Arc::new(IdLayer)).clone()
}

/// A set holding one fresh UUIDv4
pub fn construct_id_value() -> LabelSet {
    LabelSet::labels([Uuid::new_v4().to_string()])
}

/// Give `base` a fresh id; earlier ids are kept after it
pub fn mark_id(base: impl Into<Datum>) -> LayeredObject {
    let new_value = LayerValue::Labels(construct_id_value());
    annotate_layer(base.into(), &id_layer(), new_value, |new, old| {
        merge_label_sets(new, &old)
    })
}

pub fn has_id_layer(datum: &dyn Annotated) -> bool {
    id_layer().has_value(datum)
}

/// Ids of `datum` (empty when it carries none)
pub fn get_id_layer_value(datum: &dyn Annotated) -> Result<LabelSet> {
    id_layer().get_value(datum).into_labels(ID)
}
