//! Layer protocol, layered objects and the dispatch engine
//!
//! - `layer`: the [`Layer`] trait and the base layer
//! - `value`: [`Datum`] and [`LayerValue`]
//! - `layered_object`: the immutable [`LayeredObject`]
//! - `merge`: fold-based merge rules
//! - `procedure`: [`LayeredProcedure`] dispatch
//! - `combinators`: [`LayeredConsolidator`]

mod combinators;
mod layer;
mod layered_object;
mod merge;
mod procedure;
mod value;

pub use combinators::{
    construct_layered_consolidator, construct_layered_consolidator_with_config,
    define_consolidator_per_layer_dispatcher, layers_reduce, to_layer_pair, LayeredConsolidator,
    Reducer,
};
pub use layer::{
    base_layer, get_base_value, identify_layer, BaseLayer, Layer, LayerRef, BASE_LAYER_NAME,
};
pub use layered_object::{construct_layered_datum, LayerPair, LayeredObject};
pub use merge::{default_merge_procedure, merge_handler, FoldMerge, MergeHandler, MergeOp};
pub use procedure::{
    define_layered_procedure_handler, make_layered_procedure, BaseProcedure, LayerKey,
    LayeredProcedure, LayeredProcedureMetadata,
};
pub use value::{Annotated, Datum, LayerValue};
