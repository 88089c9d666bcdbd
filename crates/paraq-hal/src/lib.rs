//! Paraq Machine Abstraction Layer
//!
//! This crate defines the collaborator interfaces a Paraq device talks to:
//! the compiler/runtime of a quantum machine and the provider that hands one
//! out. It contains no execution logic of its own.
//!
//! # Overview
//!
//! - A [`QuantumMachine`] trait with an expensive `compile` and a `run` that
//!   takes parameter memory separately, so compiled artifacts can be reused
//!   across value bindings
//! - A [`MachineProvider`] capability trait, one implementation per backend
//!   family
//! - [`CompiledArtifact`] and [`ExecutionResult`] as the opaque values passed
//!   back
//!
//! # Implementing a Custom Machine
//!
//! ```ignore
//! use paraq_hal::{CompiledArtifact, Executable, ExecutionResult, HalResult, QuantumMachine};
//! use paraq_ir::{MemoryMap, Program};
//! use async_trait::async_trait;
//!
//! struct MyMachine {
//!     qubits: Vec<u32>,
//! }
//!
//! #[async_trait]
//! impl QuantumMachine for MyMachine {
//!     fn name(&self) -> &str { "my_machine" }
//!
//!     fn qubits(&self) -> &[u32] { &self.qubits }
//!
//!     async fn compile(&self, program: &Program) -> HalResult<CompiledArtifact> {
//!         Ok(CompiledArtifact::new(program.clone(), self.name()))
//!     }
//!
//!     async fn run(
//!         &self,
//!         executable: Executable<'_>,
//!         memory: &MemoryMap,
//!     ) -> HalResult<ExecutionResult> {
//!         // Submit to hardware
//!         # todo!()
//!     }
//! }
//! ```

pub mod artifact;
pub mod error;
pub mod machine;
pub mod result;

pub use artifact::CompiledArtifact;
pub use error::{HalError, HalResult};
pub use machine::{Executable, MachineConfig, MachineProvider, QuantumMachine};
pub use result::{ExecutionResult, RegisterData};
