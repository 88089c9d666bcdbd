//! Paraq Command-Line Interface
//!
//! Runs JSON circuits on a Paraq device and reports samples together with
//! the compilation cache behaviour across repeated evaluations.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::run::RunOptions;
use commands::{devices, run, version};

/// Paraq - parametric compilation and execution for quantum devices
#[derive(Parser)]
#[command(name = "paraq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a circuit on a device
    Run {
        /// Input file (JSON circuit)
        #[arg(short, long)]
        input: String,

        /// Device name (e.g. 4q-qvm, 9q-square-pyqvm)
        #[arg(short, long)]
        device: Option<String>,

        /// Number of shots
        #[arg(short, long)]
        shots: Option<u32>,

        /// Evaluate the circuit this many times
        #[arg(short, long, default_value = "1")]
        repeat: u32,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Prepend an active reset to every program
        #[arg(long)]
        active_reset: bool,

        /// Disable parametric compilation
        #[arg(long)]
        no_parametric: bool,

        /// Print the compiled program
        #[arg(long)]
        show_program: bool,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// List available devices and supported operations
    Devices,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            input,
            device,
            shots,
            repeat,
            config,
            active_reset,
            no_parametric,
            show_program,
            format,
        } => {
            let options = RunOptions {
                device,
                shots,
                repeat,
                config,
                active_reset,
                parametric: !no_parametric,
                show_program,
                format,
            };
            run::execute(&input, &options).await
        }

        Commands::Devices => devices::execute(),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
