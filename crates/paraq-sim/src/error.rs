//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced by the state-vector kernels.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Operator shape does not match the number of target qubits.
    #[error(
        "Please specify a {expected} x {expected} matrix for {num_targets} wires, got {rows} x {cols}"
    )]
    DimensionMismatch {
        /// Required side length, 2^k.
        expected: usize,
        /// Number of target qubits k.
        num_targets: usize,
        /// Rows of the supplied matrix.
        rows: usize,
        /// Columns of the supplied matrix.
        cols: usize,
    },

    /// State length is not the expected power of two.
    #[error("State vector has length {got}, expected {expected}")]
    InvalidStateLength {
        /// Expected length (a power of two), or 0 when any power of two would do.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// A target qubit index is out of range.
    #[error("Target qubit {qubit} out of range for a {num_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending index.
        qubit: usize,
        /// Number of qubits in the state.
        num_qubits: usize,
    },

    /// A target qubit appears twice.
    #[error("Target qubit {0} appears more than once")]
    DuplicateTarget(usize),

    /// Gate name has no known matrix.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Gate received the wrong number of parameters.
    #[error("Gate '{gate}' takes {expected} parameters, got {got}")]
    ParameterCount {
        /// Gate name.
        gate: String,
        /// Expected parameter count.
        expected: usize,
        /// Supplied parameter count.
        got: usize,
    },

    /// Gate applied to the wrong number of qubits.
    #[error("Gate '{gate}' acts on {expected} qubits, got {got}")]
    QubitCount {
        /// Gate name.
        gate: String,
        /// Expected qubit count.
        expected: usize,
        /// Supplied qubit count.
        got: usize,
    },

    /// State has no probability mass to sample from.
    #[error("Cannot sample from a state with zero norm")]
    ZeroNorm,

    /// Internal reshape failed.
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Result type for state-vector operations.
pub type SimResult<T> = Result<T, SimError>;
