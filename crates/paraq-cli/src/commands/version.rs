//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - parametric compilation and execution for quantum devices",
        style("Paraq").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  paraq-ir           Circuits and Quil programs");
    println!("  paraq-hal          Machine abstraction layer");
    println!("  paraq-sim          Tensor contraction and state-vector engine");
    println!("  paraq-device       Wiring, program building and compilation cache");
    println!("  paraq-adapter-qvm  Local quantum virtual machine");
    println!("  paraq-cli          Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
