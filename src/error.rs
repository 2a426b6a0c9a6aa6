//! Error handling for layered values
//!
//! Every failure is surfaced immediately; nothing in the engine retries.

use thiserror::Error;

/// Result type alias for layered operations
pub type Result<T> = std::result::Result<T, LayerError>;

/// Main error type for layered operations
#[derive(Error, Debug)]
pub enum LayerError {
    // Construction Errors
    #[error("Malformed layer pair: {reason}")]
    MalformedPair { reason: String },

    #[error("Layer not found: {layer}")]
    LayerNotFound { layer: String },

    #[error("Layer already present: {layer}")]
    DuplicateLayer { layer: String },

    #[error("Invalid layer name: {name:?}")]
    InvalidLayerName { name: String },

    #[error("Layer {layer} holds an unexpected value: {found}")]
    UnexpectedLayerValue { layer: String, found: String },

    // Dispatch Errors
    #[error("No applicable handler for {procedure}: {args}")]
    NoApplicableHandler { procedure: String, args: String },

    #[error("{procedure} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        procedure: String,
        expected: usize,
        actual: usize,
    },

    #[error("Incompatible units for {operation}: {units:?}")]
    IncompatibleUnits {
        operation: String,
        units: Vec<String>,
    },

    // Equality Errors
    #[error("Both arguments must be layered objects, got: {value}")]
    NotLayered { value: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LayerError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LayerError::MalformedPair { .. } => "MALFORMED_PAIR",
            LayerError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            LayerError::DuplicateLayer { .. } => "DUPLICATE_LAYER",
            LayerError::InvalidLayerName { .. } => "INVALID_LAYER_NAME",
            LayerError::UnexpectedLayerValue { .. } => "UNEXPECTED_LAYER_VALUE",
            LayerError::NoApplicableHandler { .. } => "NO_APPLICABLE_HANDLER",
            LayerError::ArityMismatch { .. } => "ARITY_MISMATCH",
            LayerError::IncompatibleUnits { .. } => "INCOMPATIBLE_UNITS",
            LayerError::NotLayered { .. } => "NOT_LAYERED",
            LayerError::Io(_) => "IO_ERROR",
            LayerError::Json(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns true if the error comes from how the caller wired layers and
    /// procedures together rather than from the values flowing through them.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            LayerError::MalformedPair { .. }
                | LayerError::DuplicateLayer { .. }
                | LayerError::InvalidLayerName { .. }
                | LayerError::ArityMismatch { .. }
        )
    }

    pub(crate) fn no_applicable_handler(procedure: &str, args: &[&dyn std::fmt::Display]) -> Self {
        let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        LayerError::NoApplicableHandler {
            procedure: procedure.to_string(),
            args: rendered.join(", "),
        }
    }
}
