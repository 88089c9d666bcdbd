//! Paraq Circuit Description and Program Representation
//!
//! This crate provides the data structures shared by every layer of Paraq:
//! the abstract circuit handed to a device, and the Quil-like executable
//! program the device builds from it.
//!
//! # Core Components
//!
//! - **Wires**: [`WireLabel`] for user-facing logical wire names
//! - **Parameters**: [`Parameter`] and [`ParamId`] for literal and trainable
//!   gate parameters
//! - **Operations**: [`Operation`] and [`Circuit`], the circuit-description layer
//! - **Programs**: [`Program`], [`Instruction`] and [`MemoryRef`], the
//!   executable form consumed by machines
//!
//! # Example: A Variational Circuit
//!
//! ```rust
//! use paraq_ir::{Circuit, Operation, Parameter};
//!
//! let mut circuit = Circuit::new();
//! let theta = circuit.trainable(0.25);
//!
//! circuit.push(Operation::new("Hadamard", vec![], [0]));
//! circuit.push(Operation::new("RX", vec![theta], [1]));
//! circuit.push(Operation::new("CNOT", vec![], [0, 1]));
//!
//! // The structural hash ignores trainable values.
//! let before = circuit.structural_hash();
//! circuit.set_parameter(paraq_ir::ParamId(0), 1.5).unwrap();
//! assert_eq!(before, circuit.structural_hash());
//! # let _ = Parameter::Value(0.0);
//! ```

pub mod circuit;
pub mod error;
pub mod operation;
pub mod parameter;
pub mod program;
pub mod wire;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use operation::{Operation, STATE_PREPARATIONS};
pub use parameter::{ParamId, Parameter};
pub use program::{GateArg, Instruction, MemoryMap, MemoryRef, MemoryType, Program};
pub use wire::WireLabel;
