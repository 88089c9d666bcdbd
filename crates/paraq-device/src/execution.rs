//! Execution and sample extraction.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use paraq_hal::{CompiledArtifact, Executable, ExecutionResult, QuantumMachine};
use paraq_ir::Program;

use crate::binding::ParameterBindingTable;
use crate::builder::READOUT_REGION;
use crate::cache::CompilationCache;
use crate::error::DeviceResult;

/// Measurement samples: one row of bits per shot, one column per wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Samples {
    rows: Vec<Vec<u8>>,
}

impl Samples {
    /// Wrap raw rows.
    pub fn new(rows: Vec<Vec<u8>>) -> Self {
        Self { rows }
    }

    /// Number of shots.
    pub fn num_shots(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows, one per shot.
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Take the rows.
    pub fn into_rows(self) -> Vec<Vec<u8>> {
        self.rows
    }

    /// Histogram of bitstrings, first wire leftmost.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            let key: String = row.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect();
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
}

/// Samples from the readout register.
///
/// A result without a readout register yields empty samples, not an error.
pub fn extract_samples(result: &ExecutionResult) -> Samples {
    result
        .register(READOUT_REGION)
        .map(|rows| Samples::new(rows.clone()))
        .unwrap_or_default()
}

/// Bind parameters, compile or fetch, and run `program`.
///
/// - `bindings` is `Some` when parametric compilation is on; its values are
///   written into the program's memory first.
/// - Pure-simulation machines run the raw program and never compile.
/// - Without a `circuit_hash` the program is compiled on every call.
/// - Otherwise the cache compiles at most once per hash.
///
/// Every artifact used is recorded in `latest_compiled`.
#[instrument(skip_all, fields(machine = machine.name(), hash = ?circuit_hash))]
pub async fn run_program(
    program: &mut Program,
    circuit_hash: Option<u64>,
    machine: &dyn QuantumMachine,
    cache: &CompilationCache,
    bindings: Option<&ParameterBindingTable>,
    latest_compiled: &mut Option<Arc<CompiledArtifact>>,
) -> DeviceResult<ExecutionResult> {
    if let Some(bindings) = bindings {
        bindings.write_into(program)?;
    }

    if machine.is_pure_simulation() {
        debug!("Running raw program on pure simulator");
        return Ok(machine
            .run(Executable::Raw(program), program.memory())
            .await?);
    }

    let artifact = match circuit_hash {
        None => {
            debug!("No circuit hash, compiling");
            Arc::new(machine.compile(program).await?)
        }
        Some(hash) => cache.get_or_compile(hash, machine, program).await?,
    };
    *latest_compiled = Some(Arc::clone(&artifact));

    Ok(machine
        .run(Executable::Compiled(&artifact), program.memory())
        .await?)
}
