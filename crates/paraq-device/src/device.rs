//! The quantum-computer device.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::{debug, info, instrument};

use paraq_adapter_qvm::{QvmMachine, QvmTarget};
use paraq_hal::{CompiledArtifact, MachineConfig, MachineProvider, QuantumMachine};
use paraq_ir::{Circuit, Program, WireLabel};

use crate::binding::ParameterBindingTable;
use crate::builder::{BuildOptions, build_program};
use crate::cache::{CacheStats, CompilationCache};
use crate::config::{DeviceConfig, WireSpec};
use crate::error::{DeviceError, DeviceResult};
use crate::execution::{Samples, extract_samples, run_program};
use crate::operations::supported_operations;
use crate::wiring::WiringMap;

/// Where a device gets its machine from.
#[derive(Clone)]
pub enum DeviceKind {
    /// A local QVM.
    Qvm(QvmTarget),
    /// Any other backend family.
    Provider {
        /// Backend family.
        provider: Arc<dyn MachineProvider>,
        /// Machine name handed to the provider.
        name: String,
    },
}

impl DeviceKind {
    /// A named QVM such as `4q-qvm` or `9q-square-pyqvm`.
    pub fn qvm(name: &str) -> DeviceResult<Self> {
        Ok(DeviceKind::Qvm(QvmTarget::parse(name)?))
    }

    /// A compiling QVM over a custom coupling graph.
    pub fn qvm_topology(
        name: impl Into<String>,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> DeviceResult<Self> {
        Ok(DeviceKind::Qvm(QvmTarget::from_edges(name, edges)?))
    }

    /// A machine obtained from `provider`.
    pub fn provider(provider: Arc<dyn MachineProvider>, name: impl Into<String>) -> Self {
        DeviceKind::Provider {
            provider,
            name: name.into(),
        }
    }

    /// Name of the machine to acquire.
    pub fn name(&self) -> &str {
        match self {
            DeviceKind::Qvm(target) => target.name(),
            DeviceKind::Provider { name, .. } => name,
        }
    }

    /// Short name used in messages, e.g. `paraq.qvm`.
    pub fn short_name(&self) -> &'static str {
        match self {
            DeviceKind::Qvm(_) => "paraq.qvm",
            DeviceKind::Provider { .. } => "paraq.qpu",
        }
    }

    fn get_machine(&self, config: &MachineConfig) -> DeviceResult<Arc<dyn QuantumMachine>> {
        match self {
            DeviceKind::Qvm(target) => Ok(Arc::new(QvmMachine::new(target.clone(), config.clone()))),
            DeviceKind::Provider { provider, .. } => Ok(provider.get_machine(config)?),
        }
    }
}

impl fmt::Debug for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Qvm(target) => f.debug_tuple("Qvm").field(target).finish(),
            DeviceKind::Provider { provider, name } => f
                .debug_struct("Provider")
                .field("family", &provider.family())
                .field("name", name)
                .finish(),
        }
    }
}

/// A device that builds, compiles, caches and runs circuits on one machine.
///
/// Owns the wiring map, the parameter binding table and the compilation
/// cache. The cache and the latest compiled artifact survive
/// [`reset`](Self::reset); everything else is per evaluation.
pub struct QuantumComputerDevice {
    machine: Arc<dyn QuantumMachine>,
    short_name: &'static str,
    wiring: WiringMap,
    shots: u32,
    active_reset: bool,
    parametric_compilation: bool,
    bindings: ParameterBindingTable,
    cache: CompilationCache,
    program: Option<Program>,
    circuit_hash: Option<u64>,
    latest_compiled: Option<Arc<CompiledArtifact>>,
}

impl QuantumComputerDevice {
    /// Acquire the machine for `kind` and set up the device.
    ///
    /// QVM devices always run without active reset.
    pub fn new(kind: &DeviceKind, config: &DeviceConfig) -> DeviceResult<Self> {
        config.validate()?;
        let machine = kind.get_machine(&config.machine_config(kind.name()))?;
        let mut config = config.clone();
        if matches!(kind, DeviceKind::Qvm(_)) && config.active_reset {
            debug!("Active reset is not available on a QVM, disabling");
            config.active_reset = false;
        }
        let mut device = Self::with_machine(machine, &config)?;
        device.short_name = kind.short_name();
        Ok(device)
    }

    /// Set up a device around an already acquired machine.
    pub fn with_machine(
        machine: Arc<dyn QuantumMachine>,
        config: &DeviceConfig,
    ) -> DeviceResult<Self> {
        config.validate()?;
        // Scalar wire counts were rejected by `validate`.
        let labels = match &config.wires {
            Some(WireSpec::Labels(labels)) => Some(labels.clone()),
            _ => None,
        };
        let wiring = WiringMap::new(labels, machine.qubits())?;

        info!(
            "Device ready on '{}' with {} wires (parametric compilation: {})",
            machine.name(),
            wiring.len(),
            config.parametric_compilation
        );

        Ok(Self {
            machine,
            short_name: "paraq.qpu",
            wiring,
            shots: config.shots,
            active_reset: config.active_reset,
            parametric_compilation: config.parametric_compilation,
            bindings: ParameterBindingTable::new(),
            cache: CompilationCache::new(),
            program: None,
            circuit_hash: None,
            latest_compiled: None,
        })
    }

    /// Evaluate `circuit` and return its samples.
    ///
    /// The device keeps its cache on error. A circuit that fails to build
    /// leaves the previous program, hash and binding table in place.
    #[instrument(skip_all, fields(machine = self.machine.name()))]
    pub async fn execute(&mut self, circuit: &Circuit) -> DeviceResult<Samples> {
        // Pure simulators never compile, so symbolic parameters buy nothing.
        let parametric = self.parametric_compilation && !self.machine.is_pure_simulation();
        let options = BuildOptions {
            active_reset: self.active_reset,
            parametric,
            shots: self.shots,
            device: self.short_name,
        };
        let mut bindings = ParameterBindingTable::new();
        let mut program = build_program(
            &circuit.operations,
            &circuit.rotations,
            &self.wiring,
            &options,
            &mut bindings,
        )?;

        self.reset();
        self.bindings = bindings;
        if self.parametric_compilation {
            self.circuit_hash = Some(circuit.hash());
        }

        let result = run_program(
            &mut program,
            self.circuit_hash,
            self.machine.as_ref(),
            &self.cache,
            self.parametric_compilation.then_some(&self.bindings),
            &mut self.latest_compiled,
        )
        .await;
        self.program = Some(program);

        let samples = extract_samples(&result?);
        debug!("Collected {} samples", samples.num_shots());
        Ok(samples)
    }

    /// Clear per-evaluation state. Compiled artifacts are kept.
    pub fn reset(&mut self) {
        self.program = None;
        self.circuit_hash = None;
        self.bindings.clear();
    }

    /// Apply `matrix` to the wires `wires` of a device-sized state vector.
    pub fn mat_vec_product(
        &self,
        matrix: &Array2<Complex64>,
        state: &Array1<Complex64>,
        wires: &[WireLabel],
    ) -> DeviceResult<Array1<Complex64>> {
        let axes = wires
            .iter()
            .map(|w| {
                self.wiring
                    .position(w)
                    .ok_or_else(|| DeviceError::UnknownWire(w.clone()))
            })
            .collect::<DeviceResult<Vec<usize>>>()?;
        Ok(paraq_sim::mat_vec_product(
            matrix,
            state,
            &axes,
            self.num_wires(),
        )?)
    }

    /// Quil text of the latest compiled program, if any.
    pub fn compiled_program(&self) -> Option<String> {
        self.latest_compiled.as_ref().map(ToString::to_string)
    }

    /// Hash of the last evaluated circuit; `None` unless parametric
    /// compilation is enabled.
    pub fn circuit_hash(&self) -> Option<u64> {
        if self.parametric_compilation {
            self.circuit_hash
        } else {
            None
        }
    }

    /// Names of the supported operations.
    pub fn operations(&self) -> BTreeSet<String> {
        supported_operations()
    }

    /// The last built program.
    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    /// The wiring map.
    pub fn wiring(&self) -> &WiringMap {
        &self.wiring
    }

    /// Number of wires.
    pub fn num_wires(&self) -> usize {
        self.wiring.len()
    }

    /// Shots per evaluation.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Current symbolic parameter bindings.
    pub fn bindings(&self) -> &ParameterBindingTable {
        &self.bindings
    }

    /// Compilation cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Name of the underlying machine.
    pub fn machine_name(&self) -> &str {
        self.machine.name()
    }

    /// Short name of the device family.
    pub fn short_name(&self) -> &str {
        self.short_name
    }
}

impl fmt::Debug for QuantumComputerDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantumComputerDevice")
            .field("machine", &self.machine.name())
            .field("wiring", &self.wiring)
            .field("shots", &self.shots)
            .field("active_reset", &self.active_reset)
            .field("parametric_compilation", &self.parametric_compilation)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paraq_ir::Operation;

    #[test]
    fn test_qvm_device_setup() {
        let kind = DeviceKind::qvm("3q-qvm").unwrap();
        let config = DeviceConfig::new("3q-qvm").with_active_reset(true);
        let device = QuantumComputerDevice::new(&kind, &config).unwrap();
        assert_eq!(device.num_wires(), 3);
        assert_eq!(device.machine_name(), "3q-qvm");
        assert_eq!(device.short_name(), "paraq.qvm");
        assert!(!device.active_reset);
        assert!(device.compiled_program().is_none());
        assert!(device.operations().contains("Toffoli"));
    }

    #[test]
    fn test_wire_count_mismatch() {
        let kind = DeviceKind::qvm("2q-qvm").unwrap();
        let config = DeviceConfig::default().with_wires(["a", "b", "c"]);
        assert!(matches!(
            QuantumComputerDevice::new(&kind, &config),
            Err(DeviceError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_qvm_name() {
        assert!(matches!(
            DeviceKind::qvm("Aspen-9"),
            Err(DeviceError::Machine(_))
        ));
    }

    #[test]
    fn test_mat_vec_product_uses_wire_positions() {
        let kind = DeviceKind::qvm("2q-qvm").unwrap();
        let config = DeviceConfig::default().with_wires(["a", "b"]);
        let device = QuantumComputerDevice::new(&kind, &config).unwrap();

        let x = paraq_sim::gate_matrix("X", &[]).unwrap();
        let mut state = Array1::zeros(4);
        state[0] = Complex64::new(1.0, 0.0);

        let out = device.mat_vec_product(&x, &state, &["a".into()]).unwrap();
        assert_eq!(out[2], Complex64::new(1.0, 0.0));
        let out = device.mat_vec_product(&x, &state, &["b".into()]).unwrap();
        assert_eq!(out[1], Complex64::new(1.0, 0.0));

        let cnot = paraq_sim::gate_matrix("CNOT", &[]).unwrap();
        assert!(matches!(
            device.mat_vec_product(&cnot, &state, &["a".into()]),
            Err(DeviceError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            device.mat_vec_product(&x, &Array1::zeros(8), &["a".into()]),
            Err(DeviceError::Sim(_))
        ));
        assert!(matches!(
            device.mat_vec_product(&x, &state, &["z".into()]),
            Err(DeviceError::UnknownWire(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_bell_on_qvm() {
        let kind = DeviceKind::qvm("2q-qvm").unwrap();
        let config = DeviceConfig::new("2q-qvm")
            .with_shots(100)
            .with_machine_option("seed", serde_json::json!(1));
        let mut device = QuantumComputerDevice::new(&kind, &config).unwrap();

        let mut circuit = Circuit::new();
        circuit.push(Operation::new("Hadamard", vec![], [0]));
        circuit.push(Operation::new("CNOT", vec![], [0, 1]));
        let samples = device.execute(&circuit).await.unwrap();

        assert_eq!(samples.num_shots(), 100);
        assert!(samples.rows().iter().all(|r| r[0] == r[1]));
        assert!(device.compiled_program().unwrap().contains("CNOT 0 1"));
        assert_eq!(device.circuit_hash(), Some(circuit.hash()));
    }
}
