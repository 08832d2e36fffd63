//! Error types for pdfscene library.

use thiserror::Error;

/// Result type alias for pdfscene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building a page scene.
///
/// Most content problems are recovered inside the interpreter and never
/// reach the caller; these variants surface from input decoding and output
/// rendering.
#[derive(Error, Debug)]
pub enum Error {
    /// An operator carried too few or unusable operands.
    #[error("Malformed operator {opcode}: {reason}")]
    MalformedOperator {
        /// Numeric operator code as delivered by the tokenizer
        opcode: u32,
        /// What was wrong with the operands
        reason: String,
    },

    /// The operator code is not part of the known operator table.
    #[error("Unknown operator code: {0}")]
    UnknownOperator(u32),

    /// Options or inputs outside their valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON input or output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Shorthand for a malformed-operator error.
    pub fn malformed(opcode: u32, reason: impl Into<String>) -> Self {
        Error::MalformedOperator {
            opcode,
            reason: reason.into(),
        }
    }
}
