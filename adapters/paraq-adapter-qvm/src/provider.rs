//! Machine provider for the QVM family.

use std::sync::Arc;

use tracing::debug;

use paraq_hal::{HalResult, MachineConfig, MachineProvider, QuantumMachine};

use crate::machine::QvmMachine;

/// Hands out [`QvmMachine`]s by name or topology.
#[derive(Debug, Default, Clone, Copy)]
pub struct QvmProvider;

impl MachineProvider for QvmProvider {
    fn family(&self) -> &str {
        "qvm"
    }

    fn get_machine(&self, config: &MachineConfig) -> HalResult<Arc<dyn QuantumMachine>> {
        let machine = QvmMachine::from_config(config.clone())?;
        debug!(
            "Created QVM '{}' with {} qubits",
            machine.target().name(),
            machine.target().qubits().len()
        );
        Ok(Arc::new(machine))
    }
}
