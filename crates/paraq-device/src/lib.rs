//! Paraq Device
//!
//! Turns circuits into Quil programs, compiles them on a quantum machine,
//! caches the compiled artifacts per circuit structure and runs them with
//! fresh parameter values.
//!
//! # Overview
//!
//! - [`WiringMap`]: logical wire labels onto physical qubits
//! - [`build_program`]: operations to a program with a reset prologue and a
//!   full readout, trainable parameters read from memory when parametric
//! - [`ParameterBindingTable`]: symbol to memory region and current value
//! - [`CompilationCache`]: each circuit hash compiled at most once
//! - [`run_program`] and [`extract_samples`]: bind, compile or fetch, run
//! - [`QuantumComputerDevice`]: the device tying it together, plus a
//!   [`mat_vec_product`](QuantumComputerDevice::mat_vec_product) over its
//!   wires
//!
//! # Example
//!
//! ```no_run
//! use paraq_device::{DeviceConfig, DeviceKind, QuantumComputerDevice};
//! use paraq_ir::{Circuit, Operation, ParamId};
//!
//! # async fn demo() -> paraq_device::DeviceResult<()> {
//! let kind = DeviceKind::qvm("2q-qvm")?;
//! let mut device = QuantumComputerDevice::new(&kind, &DeviceConfig::new("2q-qvm"))?;
//!
//! let mut circuit = Circuit::new();
//! let theta = circuit.trainable(0.5);
//! circuit.push(Operation::new("RX", vec![theta], [0]));
//! circuit.push(Operation::new("CNOT", vec![], [0, 1]));
//!
//! let samples = device.execute(&circuit).await?;
//! println!("{:?}", samples.counts());
//!
//! // Same structure, new value: served from the compilation cache.
//! circuit.set_parameter(ParamId(0), 1.2)?;
//! device.execute(&circuit).await?;
//! assert_eq!(device.cache_stats().hits, 1);
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod builder;
pub mod cache;
pub mod config;
pub mod device;
pub mod error;
pub mod execution;
pub mod operations;
pub mod wiring;

pub use binding::ParameterBindingTable;
pub use builder::{BuildOptions, READOUT_REGION, build_program};
pub use cache::{CacheStats, CompilationCache};
pub use config::{DeviceConfig, WireSpec};
pub use device::{DeviceKind, QuantumComputerDevice};
pub use error::{DeviceError, DeviceResult};
pub use execution::{Samples, extract_samples, run_program};
pub use operations::{OperationSpec, lookup, supported_operations};
pub use wiring::WiringMap;
