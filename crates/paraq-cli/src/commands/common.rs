//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use paraq_device::{DeviceConfig, DeviceKind, Samples};
use paraq_ir::Circuit;

/// Load a circuit from a JSON file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_lowercase().as_str() {
        "json" | "" => {
            serde_json::from_str(&source).map_err(|e| anyhow::anyhow!("Parse error: {e}"))
        }
        other => anyhow::bail!("Unsupported circuit format: '.{other}' (expected .json)"),
    }
}

/// Pick the device kind for a configuration.
///
/// An `edges` list in the machine options selects a custom QVM topology;
/// otherwise the device name is parsed as a QVM name.
pub fn device_kind(config: &DeviceConfig) -> Result<DeviceKind> {
    match config.machine_options.get("edges") {
        Some(edges) => {
            let edges: Vec<(u32, u32)> = serde_json::from_value(edges.clone())
                .context("machine option 'edges' must be a list of qubit pairs")?;
            Ok(DeviceKind::qvm_topology(config.device.clone(), edges)?)
        }
        None => Ok(DeviceKind::qvm(&config.device)?),
    }
}

/// Print samples as a histogram table.
pub fn print_samples(samples: &Samples) {
    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        samples.num_shots()
    );

    if samples.is_empty() {
        println!("  (no readout)");
        return;
    }

    let mut sorted: Vec<(String, usize)> = samples.counts().into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let total = samples.num_shots() as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = *count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
}
