//! Error types for the IR crate.

use thiserror::Error;

use crate::parameter::ParamId;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A trainable parameter id was never allocated by this circuit.
    #[error("Parameter {0} is not part of this circuit")]
    UnknownParameter(ParamId),

    /// A memory region was written or referenced before being declared.
    #[error("Memory region '{0}' is not declared")]
    UndeclaredRegion(String),

    /// A memory write did not match the declared region size.
    #[error("Memory region '{region}' has {declared} slots, got {got} values")]
    RegionSizeMismatch {
        /// Region name.
        region: String,
        /// Declared number of slots.
        declared: usize,
        /// Number of values written.
        got: usize,
    },

    /// A region with the same name was declared twice.
    #[error("Memory region '{0}' is already declared")]
    DuplicateRegion(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
