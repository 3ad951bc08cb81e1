//! Engine errors and the diagnostic channel.
//!
//! Programming mistakes (unknown class, unknown parameter, missing doodle)
//! come back as [`EngineError`]. Problems found while loading saved data or
//! while a class computes its geometry are not fatal; they are reported as
//! [`Diagnostic`]s to a sink installed on the drawing and the operation
//! carries on without the offending item.

use crate::doodle::DoodleId;
use crate::transform::TransformError;
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown doodle class: {0}")]
    UnknownClass(String),
    #[error("{class_name} has no parameter named {parameter}")]
    UnknownParameter { class_name: String, parameter: String },
    #[error("Doodle not found: {0}")]
    DoodleNotFound(DoodleId),
    #[error("Drawing not found: {0}")]
    DrawingNotFound(String),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// A recoverable problem, reported with the class and operation it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub class_name: String,
    pub operation: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(class_name: impl Into<String>, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.class_name, self.operation, self.message)
    }
}

/// Receiver for diagnostics.
pub type DiagnosticSink = Box<dyn FnMut(&Diagnostic)>;

/// Sink used when none is installed: forwards to the `log` facade.
pub fn log_diagnostic(diagnostic: &Diagnostic) {
    log::warn!("{diagnostic}");
}
