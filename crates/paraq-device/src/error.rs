//! Error types for the device core.

use paraq_hal::HalError;
use paraq_ir::{IrError, WireLabel};
use paraq_sim::SimError;
use thiserror::Error;

/// Errors raised while configuring a device or evaluating a circuit.
///
/// Any error aborts the current evaluation. Compiled artifacts cached by
/// earlier evaluations are kept.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeviceError {
    /// Invalid device configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation has no entry in the supported-operation table.
    #[error("Operation '{0}' is not supported on this device")]
    UnsupportedOperation(String),

    /// A state preparation appeared after other operations.
    #[error(
        "Operation {name} cannot be used after other operations have already been applied on a {device} device"
    )]
    StatePreparationOrder {
        /// Operation name.
        name: String,
        /// Device short name.
        device: String,
    },

    /// Operator shape does not match the number of target wires.
    #[error(
        "Please specify a {expected} x {expected} matrix for {num_wires} wires, got {rows} x {cols}"
    )]
    DimensionMismatch {
        /// Required side length.
        expected: usize,
        /// Number of target wires.
        num_wires: usize,
        /// Rows of the supplied matrix.
        rows: usize,
        /// Columns of the supplied matrix.
        cols: usize,
    },

    /// A wire label is not part of the device wiring.
    #[error("Wire {0} is not a device wire")]
    UnknownWire(WireLabel),

    /// An operation is malformed (wrong wire or parameter count, bad argument).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Compiler or runtime failure.
    #[error(transparent)]
    Machine(#[from] HalError),

    /// Program construction failed.
    #[error("Program error: {0}")]
    Program(#[from] IrError),

    /// Other state-vector precondition failures.
    #[error("Simulation error: {0}")]
    Sim(SimError),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<SimError> for DeviceError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::DimensionMismatch {
                expected,
                num_targets,
                rows,
                cols,
            } => DeviceError::DimensionMismatch {
                expected,
                num_wires: num_targets,
                rows,
                cols,
            },
            other => DeviceError::Sim(other),
        }
    }
}

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;
