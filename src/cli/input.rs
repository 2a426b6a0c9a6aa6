//! Input records for the CLI
//!
//! Each record names a base value and the annotations to attach to it:
//!
//! ```json
//! [{"value": 3, "support": ["sensor-a"], "time": 1700000000000, "unit": "m"}]
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::basic::{LayerPair, LayerValue, LayeredObject};
use crate::config::DuplicateLayerPolicy;
use crate::error::Result;
use crate::specified::{
    annotation_layer, construct_id_value, construct_support_value, construct_time_value,
    construct_unit_value, error_layer, id_layer, log_layer, make_error_pair, make_log_entry,
    support_layer, time_layer, unit_layer,
};

/// One annotated value as written in an input file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatedInput {
    pub value: Value,
    pub support: Vec<String>,
    pub errors: Vec<String>,
    pub time: Option<i64>,
    pub log: Vec<String>,
    pub id: bool,
    pub notes: Vec<String>,
    pub unit: Option<String>,
}

impl AnnotatedInput {
    fn layer_pairs(&self) -> Vec<LayerPair> {
        let mut pairs = Vec::new();
        if !self.support.is_empty() {
            let labels = construct_support_value(self.support.iter().cloned());
            pairs.push((support_layer(), LayerValue::Labels(labels)));
        }
        if !self.errors.is_empty() {
            let errors = self
                .errors
                .iter()
                .map(|message| make_error_pair(message.as_str(), self.value.clone()))
                .collect();
            pairs.push((error_layer(), LayerValue::Errors(errors)));
        }
        if let Some(timestamp) = self.time {
            let time = construct_time_value(&self.value, Some(timestamp));
            pairs.push((time_layer(), LayerValue::Time(time)));
        }
        if !self.log.is_empty() {
            let entries = self
                .log
                .iter()
                .map(|message| make_log_entry(self.value.clone(), message.as_str()))
                .collect();
            pairs.push((log_layer(), LayerValue::Log(entries)));
        }
        if self.id {
            pairs.push((id_layer(), LayerValue::Labels(construct_id_value())));
        }
        if !self.notes.is_empty() {
            pairs.push((annotation_layer(), LayerValue::Notes(self.notes.clone())));
        }
        if let Some(unit) = &self.unit {
            pairs.push((unit_layer(), construct_unit_value(unit.as_str())));
        }
        pairs
    }

    /// Build the layered object this record describes
    pub fn to_layered(&self, policy: DuplicateLayerPolicy) -> Result<LayeredObject> {
        self.layer_pairs()
            .into_iter()
            .try_fold(LayeredObject::from_base(self.value.clone()), |object, (layer, value)| {
                object.update_layer_with(layer, value, policy)
            })
    }
}

/// Read an input file
pub fn load_inputs(path: &Path) -> anyhow::Result<Vec<AnnotatedInput>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    let inputs: Vec<AnnotatedInput> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of annotated values", path.display()))?;
    tracing::debug!(path = %path.display(), count = inputs.len(), "loaded inputs");
    Ok(inputs)
}
