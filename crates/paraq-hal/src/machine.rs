//! Machine trait and configuration.
//!
//! A [`QuantumMachine`] is the compiler/runtime collaborator of a device:
//!
//! ```text
//!   qubits() ──→ compile() ──→ run(Compiled)        (compiling machines)
//!   qubits() ──────────────→ run(Raw)               (pure simulators)
//!    (sync)       (async)        (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `qubits()` | sync | yes | `&[u32]` |
//! | `is_pure_simulation()` | sync | provided | `bool` |
//! | `compile()` | async | yes | `HalResult<CompiledArtifact>` |
//! | `run()` | async | yes | `HalResult<ExecutionResult>` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use paraq_ir::{MemoryMap, Program};

use crate::artifact::CompiledArtifact;
use crate::error::HalResult;
use crate::result::ExecutionResult;

/// Configuration handed to a [`MachineProvider`].
///
/// Timeouts are passed through to the collaborator untouched; the device
/// core never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Name of the machine.
    pub name: String,
    /// Seconds to wait for the compiler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_timeout: Option<f64>,
    /// Seconds to wait for the runtime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_timeout: Option<f64>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MachineConfig {
    /// Create a new machine configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compiler_timeout: None,
            execution_timeout: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the compiler timeout in seconds.
    pub fn with_compiler_timeout(mut self, seconds: f64) -> Self {
        self.compiler_timeout = Some(seconds);
        self
    }

    /// Set the execution timeout in seconds.
    pub fn with_execution_timeout(mut self, seconds: f64) -> Self {
        self.execution_timeout = Some(seconds);
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Compiler timeout as a duration, falling back to `default_secs`.
    pub fn compiler_timeout_or(&self, default_secs: f64) -> Duration {
        Duration::from_secs_f64(self.compiler_timeout.unwrap_or(default_secs))
    }

    /// Execution timeout as a duration, falling back to `default_secs`.
    pub fn execution_timeout_or(&self, default_secs: f64) -> Duration {
        Duration::from_secs_f64(self.execution_timeout.unwrap_or(default_secs))
    }
}

/// What a machine is asked to run.
#[derive(Debug, Clone, Copy)]
pub enum Executable<'a> {
    /// An uncompiled program (pure simulators only).
    Raw(&'a Program),
    /// The output of [`QuantumMachine::compile`].
    Compiled(&'a CompiledArtifact),
}

impl Executable<'_> {
    /// Number of shots requested by the underlying program.
    pub fn num_shots(&self) -> u32 {
        match self {
            Executable::Raw(program) => program.num_shots(),
            Executable::Compiled(artifact) => artifact.program().num_shots(),
        }
    }

    /// The program to execute.
    pub fn program(&self) -> &Program {
        match self {
            Executable::Raw(program) => program,
            Executable::Compiled(artifact) => artifact.program(),
        }
    }
}

/// Compiler and runtime collaborator of a device.
///
/// # Contract
///
/// - `qubits()` MUST be synchronous, infallible and stable for the lifetime
///   of the machine.
/// - `compile()` MAY be slow (seconds). It MUST NOT depend on the values in
///   parameter memory; those are supplied to `run()`.
/// - `run()` MUST read every memory reference of the program from `memory`.
/// - Pure simulators report `is_pure_simulation() == true` and MUST accept
///   `Executable::Raw`.
#[async_trait]
pub trait QuantumMachine: Send + Sync {
    /// Get the name of this machine.
    fn name(&self) -> &str;

    /// Physical qubit indices, ascending.
    fn qubits(&self) -> &[u32];

    /// Whether this machine runs raw programs natively, making compilation
    /// pure overhead.
    fn is_pure_simulation(&self) -> bool {
        false
    }

    /// Compile a program into an executable artifact.
    async fn compile(&self, program: &Program) -> HalResult<CompiledArtifact>;

    /// Execute a raw or compiled program with the given parameter memory.
    async fn run(&self, executable: Executable<'_>, memory: &MemoryMap)
    -> HalResult<ExecutionResult>;
}

/// Capability interface for acquiring a machine.
///
/// Implemented once per backend family; the device chooses the family
/// through its own tagged variant and never subclasses.
pub trait MachineProvider: Send + Sync {
    /// Short name of the backend family.
    fn family(&self) -> &str;

    /// Build or connect to a machine.
    fn get_machine(&self, config: &MachineConfig) -> HalResult<Arc<dyn QuantumMachine>>;
}
