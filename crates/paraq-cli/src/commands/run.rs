//! Run command implementation.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use paraq_device::{DeviceConfig, QuantumComputerDevice, Samples};

use super::common::{device_kind, load_circuit, print_samples};

/// Options for the run command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub device: Option<String>,
    pub shots: Option<u32>,
    pub repeat: u32,
    pub config: Option<PathBuf>,
    pub active_reset: bool,
    pub parametric: bool,
    pub show_program: bool,
    pub format: String,
}

/// Execute the run command.
pub async fn execute(input: &str, options: &RunOptions) -> Result<()> {
    let mut config = DeviceConfig::load(options.config.as_deref())?;
    if let Some(device) = &options.device {
        config.device = device.clone();
    }
    if let Some(shots) = options.shots {
        config.shots = shots;
    }
    config.active_reset |= options.active_reset;
    config.parametric_compilation &= options.parametric;
    config.validate()?;

    if options.repeat == 0 {
        anyhow::bail!("--repeat must be at least 1");
    }
    let json = match options.format.as_str() {
        "table" => false,
        "json" => true,
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    };

    let circuit = load_circuit(input)?;
    let kind = device_kind(&config)?;
    let mut device = QuantumComputerDevice::new(&kind, &config)?;

    if !json {
        println!(
            "{} Running {} on {} ({} shots x {})",
            style("→").cyan().bold(),
            style(input).green(),
            style(device.machine_name()).yellow(),
            config.shots,
            options.repeat
        );
        println!(
            "  Loaded: {} operations, {} rotations, {} wires",
            circuit.operations.len(),
            circuit.rotations.len(),
            device.num_wires()
        );
    }

    let progress = if json || options.repeat == 1 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(u64::from(options.repeat))
    };
    progress.set_style(ProgressStyle::default_bar().template("{bar:40.cyan} {pos}/{len} {msg}")?);

    let mut samples = Samples::default();
    for i in 0..options.repeat {
        progress.set_message(format!("evaluation {}", i + 1));
        samples = device.execute(&circuit).await?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    let stats = device.cache_stats();
    info!(
        "Cache: {} hits, {} misses, {} entries",
        stats.hits, stats.misses, stats.entries
    );

    if json {
        let report = serde_json::json!({
            "device": device.machine_name(),
            "shots": samples.num_shots(),
            "counts": samples.counts(),
            "circuit_hash": device.circuit_hash(),
            "cache": {
                "hits": stats.hits,
                "misses": stats.misses,
                "entries": stats.entries,
            },
            "compiled_program": device.compiled_program(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_samples(&samples);
    println!(
        "\n  Compilation cache: {} hits, {} misses, {} entries",
        style(stats.hits).yellow(),
        style(stats.misses).yellow(),
        stats.entries
    );
    if let Some(hash) = device.circuit_hash() {
        println!("  Circuit hash: {}", style(format!("{hash:016x}")).dim());
    }

    if options.show_program {
        match device.compiled_program() {
            Some(text) => println!("\n{}\n{text}", style("Compiled program:").bold()),
            None => {
                if let Some(program) = device.program() {
                    println!("\n{}\n{program}", style("Program (not compiled):").bold());
                }
            }
        }
    }

    Ok(())
}
