//! Collections used for layer storage and set-valued layer payloads

mod better_set;

pub use better_set::{identify_string, BetterSet, IdentifyBy, LabelSet};
