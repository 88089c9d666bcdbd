//! CLI command parsing and utility tests.
//!
//! The CLI is a binary crate, so parsing is checked on mirrored clap structs
//! and the helpers are checked through the library crates they wrap.

// ============================================================================
// Circuit and configuration loading
// ============================================================================

mod loading {
    use std::fs;

    use paraq_device::{DeviceConfig, DeviceKind, QuantumComputerDevice};
    use paraq_ir::{Circuit, Parameter};

    const BELL: &str = r#"{
        "operations": [
            {"name": "Hadamard", "wires": [0]},
            {"name": "CNOT", "wires": [0, 1]}
        ]
    }"#;

    const PARAMETRIC: &str = r#"{
        "operations": [
            {"name": "RX", "parameters": [{"trainable": {"id": 0, "value": 0.5}}], "wires": [0]},
            {"name": "RY", "parameters": [{"trainable": {"id": 3, "value": 1.0}}], "wires": [1]}
        ],
        "rotations": [
            {"name": "Hadamard", "wires": [1]}
        ]
    }"#;

    #[test]
    fn test_parse_bell_circuit() {
        let circuit: Circuit = serde_json::from_str(BELL).unwrap();
        assert_eq!(circuit.operations.len(), 2);
        assert!(circuit.rotations.is_empty());
        assert!(circuit.hash.is_none());
    }

    #[test]
    fn test_parse_trainable_parameters() {
        let mut circuit: Circuit = serde_json::from_str(PARAMETRIC).unwrap();
        assert!(circuit.operations[0].parameters[0].is_trainable());
        assert_eq!(circuit.rotations.len(), 1);

        // Slot allocation resumes after the highest id in the file.
        let next = circuit.trainable(0.0);
        assert!(matches!(next, Parameter::Trainable { id, .. } if id.0 == 4));
    }

    #[test]
    fn test_parse_invalid_circuit() {
        assert!(serde_json::from_str::<Circuit>(r#"{"operations": 3}"#).is_err());
    }

    #[test]
    fn test_load_circuit_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.json");
        fs::write(&path, BELL).unwrap();

        let source = fs::read_to_string(&path).unwrap();
        let circuit: Circuit = serde_json::from_str(&source).unwrap();
        assert_eq!(circuit.operations[1].name, "CNOT");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paraq.yaml");
        fs::write(
            &path,
            "device: 2q-qvm\nshots: 64\nwires: [a, b]\nmachine_options:\n  seed: 7\n",
        )
        .unwrap();

        let config = DeviceConfig::from_file(&path).unwrap();
        assert_eq!(config.device, "2q-qvm");
        assert_eq!(config.shots, 64);
        assert_eq!(config.machine_options.get("seed"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn test_custom_topology_from_options() {
        let config = DeviceConfig::new("line-qvm")
            .with_machine_option("edges", serde_json::json!([[0, 1], [1, 2]]));
        let edges: Vec<(u32, u32)> =
            serde_json::from_value(config.machine_options["edges"].clone()).unwrap();
        let kind = DeviceKind::qvm_topology(config.device.clone(), edges).unwrap();
        let device = QuantumComputerDevice::new(&kind, &config).unwrap();
        assert_eq!(device.num_wires(), 3);
    }

    #[tokio::test]
    async fn test_repeated_runs_hit_the_cache() {
        let circuit: Circuit = serde_json::from_str(PARAMETRIC).unwrap();
        let config = DeviceConfig::new("2q-qvm").with_shots(16);
        let kind = DeviceKind::qvm(&config.device).unwrap();
        let mut device = QuantumComputerDevice::new(&kind, &config).unwrap();

        for _ in 0..3 {
            let samples = device.execute(&circuit).await.unwrap();
            assert_eq!(samples.num_shots(), 16);
        }
        let stats = device.cache_stats();
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }
}

// ============================================================================
// Clap argument parsing (on mirrored structs)
// ============================================================================

mod clap_parsing {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};

    #[derive(Parser)]
    #[command(name = "paraq")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Run {
            #[arg(short, long)]
            input: String,
            #[arg(short, long)]
            device: Option<String>,
            #[arg(short, long)]
            shots: Option<u32>,
            #[arg(short, long, default_value = "1")]
            repeat: u32,
            #[arg(short, long)]
            config: Option<PathBuf>,
            #[arg(long)]
            active_reset: bool,
            #[arg(long)]
            no_parametric: bool,
            #[arg(long)]
            show_program: bool,
            #[arg(short, long, default_value = "table")]
            format: String,
        },
        Devices,
        Version,
    }

    #[test]
    fn test_parse_run_minimal() {
        let cli = TestCli::try_parse_from(["paraq", "run", "-i", "bell.json"]).unwrap();
        match cli.command {
            TestCommands::Run {
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
                assert_eq!(input, "bell.json");
                assert!(device.is_none());
                assert!(shots.is_none());
                assert_eq!(repeat, 1);
                assert!(config.is_none());
                assert!(!active_reset);
                assert!(!no_parametric);
                assert!(!show_program);
                assert_eq!(format, "table");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_parse_run_with_all_args() {
        let cli = TestCli::try_parse_from([
            "paraq",
            "-vv",
            "run",
            "-i",
            "vqe.json",
            "-d",
            "9q-square-qvm",
            "-s",
            "500",
            "-r",
            "10",
            "-c",
            "paraq.yaml",
            "--active-reset",
            "--no-parametric",
            "--show-program",
            "-f",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            TestCommands::Run {
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
                assert_eq!(input, "vqe.json");
                assert_eq!(device.as_deref(), Some("9q-square-qvm"));
                assert_eq!(shots, Some(500));
                assert_eq!(repeat, 10);
                assert_eq!(config, Some(PathBuf::from("paraq.yaml")));
                assert!(active_reset);
                assert!(no_parametric);
                assert!(show_program);
                assert_eq!(format, "json");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_parse_run_missing_input() {
        assert!(TestCli::try_parse_from(["paraq", "run"]).is_err());
    }

    #[test]
    fn test_parse_run_invalid_shots() {
        assert!(TestCli::try_parse_from(["paraq", "run", "-i", "c.json", "-s", "-5"]).is_err());
    }

    #[test]
    fn test_parse_devices_and_version() {
        let cli = TestCli::try_parse_from(["paraq", "devices"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Devices));
        let cli = TestCli::try_parse_from(["paraq", "version"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(TestCli::try_parse_from(["paraq", "submit"]).is_err());
    }
}
