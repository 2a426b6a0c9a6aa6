//! Layered - values that carry their own annotations
//!
//! A computation result (the *base value*) travels together with annotation
//! layers: provenance labels, recorded errors, timestamps, log entries, ids,
//! free-text notes and units. Lifting an ordinary function into a
//! [`LayeredProcedure`] makes it combine the base values with the original
//! function and merge every annotation layer with that layer's own rule.
//!
//! # Architecture
//!
//! - `basic`: the [`Layer`] protocol, [`LayeredObject`], procedure dispatch and
//!   consolidators
//! - `specified`: the concrete layers (support, error, time, log, id,
//!   annotation, unit) and their helpers
//! - `equality`: deep and layer-aware equality
//! - `collections`: the identity-keyed ordered set backing layer lists
//! - `cli`: the `layered` command-line front end

pub mod basic;
pub mod cli;
pub mod collections;
pub mod config;
pub mod equality;
pub mod error;
pub mod specified;
pub mod utility;

pub use basic::{
    construct_layered_consolidator, construct_layered_datum,
    define_consolidator_per_layer_dispatcher, define_layered_procedure_handler,
    make_layered_procedure, Annotated, Datum, Layer, LayerRef, LayerValue, LayeredConsolidator,
    LayeredObject, LayeredProcedure,
};
pub use collections::{BetterSet, LabelSet};
pub use config::{DuplicateLayerPolicy, LayeredConfig};
pub use equality::{deep_equal, layered_deep_equal};
pub use error::{LayerError, Result};
