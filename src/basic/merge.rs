//! Merge rules for annotation layers
//!
//! A merge handler receives the freshly computed base value and one layer
//! value per argument. Most layers merge by folding an associative operation
//! over the argument values starting from an identity element; `FoldMerge`
//! captures that pair.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::value::LayerValue;
use crate::error::Result;

/// Computes a layer's value in a procedure result
pub type MergeHandler = Arc<dyn Fn(&Value, &[LayerValue]) -> Result<LayerValue> + Send + Sync>;

/// Associative combination of an accumulator with the next argument's value
pub type MergeOp = fn(LayerValue, &LayerValue) -> Result<LayerValue>;

/// `(associative op, identity element)` pair applied as a left fold
#[derive(Clone, Copy)]
pub struct FoldMerge {
    name: &'static str,
    op: MergeOp,
    identity: fn() -> LayerValue,
}

impl FoldMerge {
    pub const fn new(name: &'static str, op: MergeOp, identity: fn() -> LayerValue) -> Self {
        Self { name, op, identity }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn identity(&self) -> LayerValue {
        (self.identity)()
    }

    /// Fold `values` in argument order
    pub fn fold(&self, values: &[LayerValue]) -> Result<LayerValue> {
        values
            .iter()
            .try_fold(self.identity(), |acc, value| (self.op)(acc, value))
    }

    /// Merge handler ignoring the base value
    pub fn handler(self) -> MergeHandler {
        Arc::new(move |_base: &Value, values: &[LayerValue]| self.fold(values))
    }
}

impl fmt::Debug for FoldMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoldMerge").field("name", &self.name).finish()
    }
}

/// Handler that folds `op` over the argument values starting at `identity`
pub fn default_merge_procedure(
    name: &'static str,
    op: MergeOp,
    identity: fn() -> LayerValue,
) -> MergeHandler {
    FoldMerge::new(name, op, identity).handler()
}

/// Wrap a closure as a merge handler
pub fn merge_handler<F>(f: F) -> MergeHandler
where
    F: Fn(&Value, &[LayerValue]) -> Result<LayerValue> + Send + Sync + 'static,
{
    Arc::new(f)
}
