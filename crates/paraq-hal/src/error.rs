//! Error types for the HAL crate.

use thiserror::Error;

/// Errors reported by a machine collaborator.
///
/// The device core never retries or reclassifies these; they reach the
/// caller as they were produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Machine is not available.
    #[error("Machine not available: {0}")]
    MachineUnavailable(String),

    /// The compiler rejected the program.
    #[error("Compilation failed: {0}")]
    CompilationFailed(String),

    /// The runtime failed while executing.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Program is malformed for this machine.
    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    /// A collaborator call exceeded its configured timeout.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// Which call timed out (`"compile"` or `"execution"`).
        operation: String,
        /// Configured limit in seconds.
        seconds: f64,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Program memory error.
    #[error("Program memory error: {0}")]
    Memory(#[from] paraq_ir::IrError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
