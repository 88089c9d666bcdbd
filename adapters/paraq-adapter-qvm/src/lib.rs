//! Paraq Local Quantum Virtual Machine
//!
//! A state-vector QVM implementing [`paraq_hal::QuantumMachine`], so the
//! device core can be exercised without a remote compiler or runtime.
//!
//! # Flavours
//!
//! - **Compiling** (`Nq-qvm`, `9q-square-qvm`, custom topologies): `compile`
//!   validates against the native gate set and routes two-qubit gates over
//!   the coupling graph; `run` only accepts compiled artifacts.
//! - **Pure simulation** (`Nq-pyqvm`, `9q-square-pyqvm`): `run` accepts raw
//!   programs and compilation is unnecessary.
//!
//! Parameter memory is read at run time, so one compiled artifact serves
//! every parameter binding.
//!
//! # Example
//!
//! ```ignore
//! use paraq_adapter_qvm::QvmProvider;
//! use paraq_hal::{Executable, MachineConfig, MachineProvider};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let qvm = QvmProvider.get_machine(&MachineConfig::new("2q-qvm"))?;
//!     let artifact = qvm.compile(&program).await?;
//!     let result = qvm.run(Executable::Compiled(&artifact), program.memory()).await?;
//!     println!("{:?}", result.register("ro"));
//!     Ok(())
//! }
//! ```

mod machine;
mod provider;
mod target;

pub use machine::{DEFAULT_TIMEOUT_SECS, QvmMachine};
pub use provider::QvmProvider;
pub use target::{MAX_QUBITS, QvmTarget};
