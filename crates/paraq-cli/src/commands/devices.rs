//! Devices command implementation.

use anyhow::Result;
use console::style;

use paraq_adapter_qvm::{MAX_QUBITS, QvmProvider};
use paraq_device::supported_operations;
use paraq_hal::{MachineConfig, MachineProvider};

const KNOWN_DEVICES: &[&str] = &[
    "2q-qvm",
    "4q-qvm",
    "9q-square-qvm",
    "4q-pyqvm",
    "9q-square-pyqvm",
];

/// Execute the devices command.
pub fn execute() -> Result<()> {
    let provider = QvmProvider;
    println!(
        "{} Available devices ({} family):\n",
        style("Paraq").cyan().bold(),
        provider.family()
    );

    for name in KNOWN_DEVICES {
        let machine = provider.get_machine(&MachineConfig::new(*name))?;
        println!(
            "  {} {} {}",
            style("●").green(),
            style(name).bold(),
            if machine.is_pure_simulation() {
                "(pure simulation, never compiles)"
            } else {
                "(compiling)"
            }
        );
        println!("    Qubits: {:?}", machine.qubits());
    }

    println!("\n  Any '<N>q-qvm' or '<N>q-pyqvm' with 1 <= N <= {MAX_QUBITS} is accepted;");
    println!("  set machine option 'edges' for a custom coupling graph.");

    let ops: Vec<String> = supported_operations().into_iter().collect();
    println!("\n{} Supported operations:", style("Paraq").cyan().bold());
    println!("  {}", ops.join(", "));

    Ok(())
}
