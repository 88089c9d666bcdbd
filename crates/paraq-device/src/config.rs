//! Device configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with PARAQ_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use paraq_hal::MachineConfig;
use paraq_ir::WireLabel;

use crate::error::{DeviceError, DeviceResult};

/// Wire specification as given by the user.
///
/// A scalar count is accepted by the parser so that it can be rejected
/// with a clear message: devices have a fixed qubit count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireSpec {
    /// A bare number of wires.
    Count(i64),
    /// Explicit labels, one per machine qubit.
    Labels(Vec<WireLabel>),
}

/// Complete device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Machine name (e.g. `4q-qvm`, `9q-square-pyqvm`).
    #[serde(default = "default_device")]
    pub device: String,

    /// Wire labels; consecutive integers when absent.
    #[serde(default)]
    pub wires: Option<WireSpec>,

    /// Shots per execution.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Prepend an active `RESET` to every program.
    #[serde(default)]
    pub active_reset: bool,

    /// Cache compiled programs by circuit structure and bind parameters at
    /// run time.
    #[serde(default = "default_true")]
    pub parametric_compilation: bool,

    /// Seconds to wait for the compiler.
    #[serde(default = "default_timeout")]
    pub compiler_timeout: f64,

    /// Seconds to wait for the runtime.
    #[serde(default = "default_timeout")]
    pub execution_timeout: f64,

    /// Machine-specific options, passed through untouched.
    #[serde(default)]
    pub machine_options: serde_json::Map<String, serde_json::Value>,
}

fn default_device() -> String {
    "4q-qvm".to_string()
}

fn default_shots() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> f64 {
    10.0
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            device: default_device(),
            wires: None,
            shots: default_shots(),
            active_reset: false,
            parametric_compilation: default_true(),
            compiler_timeout: default_timeout(),
            execution_timeout: default_timeout(),
            machine_options: serde_json::Map::new(),
        }
    }
}

impl DeviceConfig {
    /// Create a configuration for the named machine with defaults.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    /// Set the shot count.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the wire labels.
    pub fn with_wires(mut self, wires: impl IntoIterator<Item = impl Into<WireLabel>>) -> Self {
        self.wires = Some(WireSpec::Labels(wires.into_iter().map(Into::into).collect()));
        self
    }

    /// Enable or disable active reset.
    pub fn with_active_reset(mut self, active_reset: bool) -> Self {
        self.active_reset = active_reset;
        self
    }

    /// Enable or disable parametric compilation.
    pub fn with_parametric_compilation(mut self, enabled: bool) -> Self {
        self.parametric_compilation = enabled;
        self
    }

    /// Add a machine option.
    pub fn with_machine_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.machine_options.insert(key.into(), value);
        self
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> DeviceResult<Self> {
        let contents =
            std::fs::read_to_string(path.as_ref()).map_err(|e| DeviceError::Io(e.to_string()))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate YAML configuration.
    pub fn from_yaml_str(contents: &str) -> DeviceResult<Self> {
        let config: DeviceConfig =
            serde_yaml_ng::from_str(contents).map_err(|e| DeviceError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> DeviceResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => DeviceConfig::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// Only variables that are set and parse override the current values.
    pub fn merge_env(mut self) -> Self {
        if let Ok(v) = std::env::var("PARAQ_DEVICE") {
            self.device = v;
        }
        if let Ok(v) = std::env::var("PARAQ_SHOTS") {
            if let Ok(val) = v.parse() {
                self.shots = val;
            }
        }
        if let Ok(v) = std::env::var("PARAQ_ACTIVE_RESET") {
            if let Some(val) = parse_flag(&v) {
                self.active_reset = val;
            }
        }
        if let Ok(v) = std::env::var("PARAQ_PARAMETRIC_COMPILATION") {
            if let Some(val) = parse_flag(&v) {
                self.parametric_compilation = val;
            }
        }
        if let Ok(v) = std::env::var("PARAQ_COMPILER_TIMEOUT") {
            if let Ok(val) = v.parse() {
                self.compiler_timeout = val;
            }
        }
        if let Ok(v) = std::env::var("PARAQ_EXECUTION_TIMEOUT") {
            if let Ok(val) = v.parse() {
                self.execution_timeout = val;
            }
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> DeviceResult<()> {
        if self.shots == 0 {
            return Err(DeviceError::Configuration(
                "Number of shots must be a positive integer".to_string(),
            ));
        }

        for (name, value) in [
            ("compiler_timeout", self.compiler_timeout),
            ("execution_timeout", self.execution_timeout),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DeviceError::Configuration(format!(
                    "{name} must be a positive number of seconds, got {value}"
                )));
            }
        }

        match &self.wires {
            Some(WireSpec::Count(_)) => {
                return Err(DeviceError::Configuration(
                    "Device has a fixed number of qubits. The wires argument can only be used \
                     to specify an iterable of wire labels."
                        .to_string(),
                ));
            }
            Some(WireSpec::Labels(labels)) => {
                let mut seen = BTreeSet::new();
                if let Some(dup) = labels.iter().find(|l| !seen.insert(*l)) {
                    return Err(DeviceError::Configuration(format!(
                        "Wire label {dup} appears more than once"
                    )));
                }
            }
            None => {}
        }

        Ok(())
    }

    /// Machine configuration for the named machine.
    pub fn machine_config(&self, name: impl Into<String>) -> MachineConfig {
        let mut config = MachineConfig::new(name)
            .with_compiler_timeout(self.compiler_timeout)
            .with_execution_timeout(self.execution_timeout);
        config.extra = self.machine_options.clone();
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.device, "4q-qvm");
        assert_eq!(config.shots, 1000);
        assert!(config.parametric_compilation);
        assert!(!config.active_reset);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let config = DeviceConfig::from_yaml_str("device: 2q-pyqvm\nshots: 64\n").unwrap();
        assert_eq!(config.device, "2q-pyqvm");
        assert_eq!(config.shots, 64);
        assert!(config.parametric_compilation);
        assert_eq!(config.compiler_timeout, 10.0);
    }

    #[test]
    fn test_yaml_mixed_wire_labels() {
        let config = DeviceConfig::from_yaml_str("wires: [0, ancilla, 2]\n").unwrap();
        assert_eq!(
            config.wires,
            Some(WireSpec::Labels(vec![
                WireLabel::Index(0),
                WireLabel::Name("ancilla".into()),
                WireLabel::Index(2),
            ]))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            DeviceConfig::default().with_shots(0).validate(),
            Err(DeviceError::Configuration(_))
        ));

        let mut config = DeviceConfig::default();
        config.execution_timeout = -1.0;
        assert!(config.validate().is_err());

        assert!(matches!(
            DeviceConfig::from_yaml_str("wires: 4\n"),
            Err(DeviceError::Configuration(_))
        ));

        let dup = DeviceConfig::default().with_wires(["a", "b", "a"]);
        assert!(matches!(dup.validate(), Err(DeviceError::Configuration(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            DeviceConfig::from_yaml_str("shots: [1, 2"),
            Err(DeviceError::Parse(_))
        ));
        assert!(matches!(
            DeviceConfig::from_file("/nonexistent/paraq.yaml"),
            Err(DeviceError::Io(_))
        ));
    }

    #[test]
    fn test_machine_config_carries_timeouts_and_options() {
        let config = DeviceConfig::default()
            .with_machine_option("seed", serde_json::json!(5));
        let machine = config.machine_config("2q-qvm");
        assert_eq!(machine.name, "2q-qvm");
        assert_eq!(machine.compiler_timeout, Some(10.0));
        assert_eq!(machine.extra.get("seed"), Some(&serde_json::json!(5)));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
