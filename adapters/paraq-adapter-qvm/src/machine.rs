//! QVM machine implementation.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use paraq_hal::{
    CompiledArtifact, Executable, ExecutionResult, HalError, HalResult, MachineConfig,
    QuantumMachine, RegisterData,
};
use paraq_ir::{GateArg, Instruction, MemoryMap, MemoryType, Program};
use paraq_sim::{Statevector, gate_arity};

use crate::target::QvmTarget;

/// Seconds to wait for the compiler or runtime when the configuration gives
/// no timeout.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// A local quantum virtual machine.
///
/// Compiling targets validate programs against the native gate set and route
/// two-qubit gates over the coupling graph with SWAP chains. Pure-simulation
/// targets run raw programs directly.
pub struct QvmMachine {
    core: Arc<QvmCore>,
    config: MachineConfig,
    compile_delay: Duration,
}

/// Target and sampler state, shared with blocking worker threads.
struct QvmCore {
    target: QvmTarget,
    rng: Mutex<StdRng>,
}

impl QvmMachine {
    /// Create a machine for `target`.
    ///
    /// Recognised `extra` keys: `seed` (u64, reproducible sampling) and
    /// `compile_delay_ms` (u64, simulated compiler latency).
    pub fn new(target: QvmTarget, config: MachineConfig) -> Self {
        let rng = match config.extra.get("seed").and_then(serde_json::Value::as_u64) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let compile_delay = config
            .extra
            .get("compile_delay_ms")
            .and_then(serde_json::Value::as_u64)
            .map_or(Duration::ZERO, Duration::from_millis);
        Self {
            core: Arc::new(QvmCore {
                target,
                rng: Mutex::new(rng),
            }),
            config,
            compile_delay,
        }
    }

    /// Create a machine from a configuration whose name is a QVM name, or
    /// which carries an `edges` list for a custom topology.
    pub fn from_config(config: MachineConfig) -> HalResult<Self> {
        let target = match config.extra.get("edges") {
            Some(edges) => {
                let edges: Vec<(u32, u32)> = serde_json::from_value(edges.clone())?;
                QvmTarget::from_edges(config.name.clone(), edges)?
            }
            None => QvmTarget::parse(&config.name)?,
        };
        Ok(Self::new(target, config))
    }

    /// The target this machine simulates.
    pub fn target(&self) -> &QvmTarget {
        &self.core.target
    }
}

impl QvmCore {
    fn compile_sync(&self, program: &Program) -> HalResult<Program> {
        self.validate(program)?;

        let mut routed = Program::new();
        routed.wrap_in_numshots_loop(program.num_shots());
        for inst in program.instructions() {
            match inst {
                Instruction::Gate {
                    name,
                    params,
                    qubits,
                } => self.route_gate(name, params, qubits, &mut routed)?,
                other => {
                    routed.inst(other.clone());
                }
            }
        }
        for (region, values) in program.memory() {
            routed.write_memory(region.clone(), values.clone())?;
        }
        Ok(routed)
    }

    fn route_gate(
        &self,
        name: &str,
        params: &[GateArg],
        qubits: &[u32],
        out: &mut Program,
    ) -> HalResult<()> {
        let gate = |qs: Vec<u32>| Instruction::gate(name, params.to_vec(), qs);
        match qubits {
            [a, b] if !self.target.are_coupled(*a, *b) => {
                let path = self.target.shortest_path(*a, *b).ok_or_else(|| {
                    HalError::CompilationFailed(format!(
                        "qubits {a} and {b} are not connected on {}",
                        self.target.name()
                    ))
                })?;
                // Move `a` next to `b`, apply, move it back.
                let hops = &path[..path.len() - 1];
                let swaps: Vec<Instruction> = hops
                    .windows(2)
                    .map(|w| Instruction::simple("SWAP", [w[0], w[1]]))
                    .collect();
                let landing = hops[hops.len() - 1];
                out.extend(swaps.iter().cloned());
                out.inst(gate(vec![landing, *b]));
                out.extend(swaps.into_iter().rev());
            }
            [a, b, c] if !self.target.is_fully_connected() => {
                let links = [(a, b), (b, c), (a, c)]
                    .iter()
                    .filter(|(x, y)| self.target.are_coupled(**x, **y))
                    .count();
                if links < 2 {
                    return Err(HalError::CompilationFailed(format!(
                        "{name} on {a}, {b}, {c} needs a connected qubit triple"
                    )));
                }
                out.inst(gate(qubits.to_vec()));
            }
            _ => {
                out.inst(gate(qubits.to_vec()));
            }
        }
        Ok(())
    }

    /// Check a program against the native gate set, the qubit set and the
    /// declared memory.
    fn validate(&self, program: &Program) -> HalResult<()> {
        let regions: FxHashMap<&str, (MemoryType, usize)> = program
            .declarations()
            .map(|(name, ty, size)| (name, (ty, size)))
            .collect();
        let check_ref = |region: &str, offset: usize, ty: MemoryType| -> HalResult<()> {
            match regions.get(region) {
                Some((declared, size)) if *declared == ty && offset < *size => Ok(()),
                Some(_) => Err(HalError::InvalidProgram(format!(
                    "{region}[{offset}] is not a valid {ty} slot"
                ))),
                None => Err(HalError::InvalidProgram(format!(
                    "memory region '{region}' is not declared"
                ))),
            }
        };

        for inst in program.instructions() {
            match inst {
                Instruction::Gate {
                    name,
                    params,
                    qubits,
                } => {
                    let (num_qubits, num_params) = gate_arity(name).ok_or_else(|| {
                        HalError::CompilationFailed(format!("gate '{name}' is not native"))
                    })?;
                    if qubits.len() != num_qubits || params.len() != num_params {
                        return Err(HalError::InvalidProgram(format!(
                            "'{inst}' does not match the signature of {name}"
                        )));
                    }
                    for (i, q) in qubits.iter().enumerate() {
                        self.check_qubit(*q)?;
                        if qubits[..i].contains(q) {
                            return Err(HalError::InvalidProgram(format!(
                                "'{inst}' uses qubit {q} twice"
                            )));
                        }
                    }
                    for param in params {
                        if let GateArg::Memory(r) = param {
                            check_ref(&r.region, r.offset, MemoryType::Real)?;
                        }
                    }
                }
                Instruction::Measure { qubit, target } => {
                    self.check_qubit(*qubit)?;
                    check_ref(&target.region, target.offset, MemoryType::Bit)?;
                }
                Instruction::Pragma { .. } | Instruction::Reset | Instruction::Declare { .. } => {}
            }
        }
        Ok(())
    }

    fn check_qubit(&self, qubit: u32) -> HalResult<()> {
        if self.target.index_of(qubit).is_none() {
            return Err(HalError::InvalidProgram(format!(
                "qubit {qubit} does not exist on {}",
                self.target.name()
            )));
        }
        Ok(())
    }

    /// Run a validated program, reading parameters from `memory` first and
    /// from the program's own memory second. Gives up once `limit` has
    /// elapsed.
    fn simulate(
        &self,
        program: &Program,
        memory: &MemoryMap,
        limit: Duration,
    ) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let check_deadline = || {
            if start.elapsed() > limit {
                return Err(HalError::Timeout {
                    operation: "execution".into(),
                    seconds: limit.as_secs_f64(),
                });
            }
            Ok(())
        };
        let steps = self.lower(program, memory)?;
        let shots = program.num_shots() as usize;
        let num_qubits = self.target.qubits().len();
        debug!(
            "Starting simulation: {} qubits, {} shots, {} steps",
            num_qubits,
            shots,
            steps.len()
        );

        let mut registers: FxHashMap<String, RegisterData> = program
            .declarations()
            .filter(|(_, ty, _)| *ty == MemoryType::Bit)
            .map(|(name, _, size)| (name.to_string(), vec![vec![0u8; size]; shots]))
            .collect();

        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let sim_err = |e: paraq_sim::SimError| HalError::ExecutionFailed(e.to_string());

        let first_measure = steps.iter().position(|s| matches!(s, Step::Measure { .. }));
        let terminal = first_measure
            .is_none_or(|i| steps[i..].iter().all(|s| matches!(s, Step::Measure { .. })));

        if terminal {
            // One evolution, then sample every shot from the final state.
            let mut sv = Statevector::new(num_qubits);
            for step in &steps {
                check_deadline()?;
                step.evolve(&mut sv, &mut *rng).map_err(sim_err)?;
            }
            let outcomes = sv.sample(shots, &mut *rng).map_err(sim_err)?;
            for (shot, outcome) in outcomes.into_iter().enumerate() {
                for step in &steps {
                    if let Step::Measure {
                        qubit,
                        region,
                        offset,
                    } = step
                    {
                        if let Some(rows) = registers.get_mut(region) {
                            rows[shot][*offset] = sv.bit(outcome, *qubit);
                        }
                    }
                }
            }
        } else {
            for shot in 0..shots {
                let mut sv = Statevector::new(num_qubits);
                for step in &steps {
                    check_deadline()?;
                    match step {
                        Step::Measure {
                            qubit,
                            region,
                            offset,
                        } => {
                            let bit = sv.measure(*qubit, &mut *rng).map_err(sim_err)?;
                            if let Some(rows) = registers.get_mut(region) {
                                rows[shot][*offset] = bit;
                            }
                        }
                        _ => step.evolve(&mut sv, &mut *rng).map_err(sim_err)?,
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        let mut result = ExecutionResult::new().with_execution_time(elapsed.as_millis() as u64);
        result.readout_data.extend(registers);
        Ok(result)
    }

    /// Resolve arguments and qubit positions once per run.
    fn lower(&self, program: &Program, memory: &MemoryMap) -> HalResult<Vec<Step>> {
        let position = |q: u32| {
            self.target.index_of(q).ok_or_else(|| {
                HalError::InvalidProgram(format!(
                    "qubit {q} does not exist on {}",
                    self.target.name()
                ))
            })
        };

        let mut steps = Vec::new();
        for inst in program.instructions() {
            match inst {
                Instruction::Gate {
                    name,
                    params,
                    qubits,
                } => {
                    let values = params
                        .iter()
                        .map(|arg| {
                            arg.resolve(memory)
                                .or_else(|| arg.resolve(program.memory()))
                                .ok_or_else(|| {
                                    HalError::InvalidProgram(format!(
                                        "no value written for {arg}"
                                    ))
                                })
                        })
                        .collect::<HalResult<Vec<f64>>>()?;
                    let qubits = qubits
                        .iter()
                        .map(|q| position(*q))
                        .collect::<HalResult<Vec<usize>>>()?;
                    steps.push(Step::Gate {
                        name: name.clone(),
                        params: values,
                        qubits,
                    });
                }
                Instruction::Reset => steps.push(Step::Reset),
                Instruction::Measure { qubit, target } => steps.push(Step::Measure {
                    qubit: position(*qubit)?,
                    region: target.region.clone(),
                    offset: target.offset,
                }),
                Instruction::Pragma { .. } | Instruction::Declare { .. } => {}
            }
        }
        Ok(steps)
    }
}

/// One resolved simulation step.
enum Step {
    Gate {
        name: String,
        params: Vec<f64>,
        qubits: Vec<usize>,
    },
    Reset,
    Measure {
        qubit: usize,
        region: String,
        offset: usize,
    },
}

impl Step {
    fn evolve<R: Rng + ?Sized>(
        &self,
        sv: &mut Statevector,
        rng: &mut R,
    ) -> paraq_sim::SimResult<()> {
        match self {
            Step::Gate {
                name,
                params,
                qubits,
            } => sv.apply_gate(name, params, qubits),
            Step::Reset => {
                for qubit in 0..sv.num_qubits() {
                    sv.reset(qubit, &mut *rng)?;
                }
                Ok(())
            }
            Step::Measure { .. } => Ok(()),
        }
    }
}

#[async_trait]
impl QuantumMachine for QvmMachine {
    fn name(&self) -> &str {
        self.core.target.name()
    }

    fn qubits(&self) -> &[u32] {
        self.core.target.qubits()
    }

    fn is_pure_simulation(&self) -> bool {
        self.core.target.is_pure_simulation()
    }

    #[instrument(skip(self, program), fields(machine = %self.name()))]
    async fn compile(&self, program: &Program) -> HalResult<CompiledArtifact> {
        let limit = self.config.compiler_timeout_or(DEFAULT_TIMEOUT_SECS);
        let core = Arc::clone(&self.core);
        let source = program.clone();
        let work = async move {
            if !self.compile_delay.is_zero() {
                tokio::time::sleep(self.compile_delay).await;
            }
            tokio::task::spawn_blocking(move || core.compile_sync(&source))
                .await
                .map_err(|e| {
                    HalError::CompilationFailed(format!("compilation task failed: {e}"))
                })?
        };
        let compiled = tokio::time::timeout(limit, work)
            .await
            .map_err(|_| HalError::Timeout {
                operation: "compile".into(),
                seconds: limit.as_secs_f64(),
            })??;
        debug!(
            "Compiled {} gates into {}",
            program.gate_count(),
            compiled.gate_count()
        );
        Ok(CompiledArtifact::new(compiled, self.name()))
    }

    #[instrument(skip(self, executable, memory), fields(machine = %self.name()))]
    async fn run(
        &self,
        executable: Executable<'_>,
        memory: &MemoryMap,
    ) -> HalResult<ExecutionResult> {
        let program = match executable {
            Executable::Raw(program) if self.is_pure_simulation() => {
                self.core.validate(program)?;
                program.clone()
            }
            Executable::Raw(_) => {
                return Err(HalError::InvalidProgram(format!(
                    "{} only runs compiled programs",
                    self.name()
                )));
            }
            Executable::Compiled(artifact) => {
                if artifact.target() != self.name() {
                    return Err(HalError::InvalidProgram(format!(
                        "artifact was compiled for {}, not {}",
                        artifact.target(),
                        self.name()
                    )));
                }
                artifact.program().clone()
            }
        };

        let limit = self.config.execution_timeout_or(DEFAULT_TIMEOUT_SECS);
        let core = Arc::clone(&self.core);
        let memory = memory.clone();
        let handle = tokio::task::spawn_blocking(move || core.simulate(&program, &memory, limit));
        tokio::time::timeout(limit, handle)
            .await
            .map_err(|_| HalError::Timeout {
                operation: "execution".into(),
                seconds: limit.as_secs_f64(),
            })?
            .map_err(|e| HalError::ExecutionFailed(format!("simulation task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paraq_ir::MemoryRef;

    fn machine(name: &str) -> QvmMachine {
        let config = MachineConfig::new(name).with_extra("seed", serde_json::json!(11));
        QvmMachine::from_config(config).unwrap()
    }

    fn measured(program: &mut Program, qubits: &[u32]) {
        let ro = program
            .declare("ro", MemoryType::Bit, qubits.len())
            .unwrap();
        for (i, q) in qubits.iter().enumerate() {
            program.inst(Instruction::measure(*q, MemoryRef::new(ro.region.clone(), i)));
        }
    }

    #[tokio::test]
    async fn test_bell_state() {
        let qvm = machine("2q-qvm");
        let mut program = Program::new();
        program.inst(Instruction::simple("H", [0]));
        program.inst(Instruction::simple("CNOT", [0, 1]));
        measured(&mut program, &[0, 1]);
        program.wrap_in_numshots_loop(200);

        let artifact = qvm.compile(&program).await.unwrap();
        let result = qvm
            .run(Executable::Compiled(&artifact), &MemoryMap::new())
            .await
            .unwrap();
        let rows = result.register("ro").unwrap();
        assert_eq!(rows.len(), 200);
        assert!(rows.iter().all(|r| r[0] == r[1]));
    }

    #[tokio::test]
    async fn test_parametric_memory_read_at_run_time() {
        let qvm = machine("1q-qvm");
        let mut program = Program::new();
        let theta = program.declare("theta0", MemoryType::Real, 1).unwrap();
        program.inst(Instruction::gate("RX", vec![GateArg::Memory(theta)], [0]));
        measured(&mut program, &[0]);
        program.wrap_in_numshots_loop(50);

        let artifact = qvm.compile(&program).await.unwrap();
        let mut memory = MemoryMap::new();

        memory.insert("theta0".into(), vec![0.0]);
        let zeros = qvm.run(Executable::Compiled(&artifact), &memory).await.unwrap();
        assert!(zeros.register("ro").unwrap().iter().all(|r| r[0] == 0));

        memory.insert("theta0".into(), vec![std::f64::consts::PI]);
        let ones = qvm.run(Executable::Compiled(&artifact), &memory).await.unwrap();
        assert!(ones.register("ro").unwrap().iter().all(|r| r[0] == 1));
    }

    #[tokio::test]
    async fn test_missing_memory_value() {
        let qvm = machine("1q-pyqvm");
        let mut program = Program::new();
        let theta = program.declare("theta0", MemoryType::Real, 1).unwrap();
        program.inst(Instruction::gate("RZ", vec![GateArg::Memory(theta)], [0]));
        let err = qvm
            .run(Executable::Raw(&program), &MemoryMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidProgram(_)));
    }

    #[tokio::test]
    async fn test_compile_rejects_non_native_and_bad_qubits() {
        let qvm = machine("2q-qvm");
        let mut program = Program::new();
        program.inst(Instruction::simple("FOO", [0]));
        assert!(matches!(
            qvm.compile(&program).await,
            Err(HalError::CompilationFailed(_))
        ));

        let mut program = Program::new();
        program.inst(Instruction::simple("X", [5]));
        assert!(matches!(
            qvm.compile(&program).await,
            Err(HalError::InvalidProgram(_))
        ));
    }

    #[tokio::test]
    async fn test_square_routes_distant_cnot() {
        let qvm = machine("9q-square-qvm");
        let mut program = Program::new();
        program.inst(Instruction::simple("X", [0]));
        program.inst(Instruction::simple("CNOT", [0, 8]));
        measured(&mut program, &[0, 8]);
        program.wrap_in_numshots_loop(10);

        let artifact = qvm.compile(&program).await.unwrap();
        assert!(artifact.program().gate_count() > 2);
        for inst in artifact.program().instructions() {
            if let Instruction::Gate { qubits, .. } = inst {
                if let [a, b] = qubits.as_slice() {
                    assert!(qvm.target().are_coupled(*a, *b));
                }
            }
        }

        let result = qvm
            .run(Executable::Compiled(&artifact), &MemoryMap::new())
            .await
            .unwrap();
        assert!(result.register("ro").unwrap().iter().all(|r| r == &vec![1, 1]));
    }

    #[tokio::test]
    async fn test_compiling_machine_rejects_raw_programs() {
        let qvm = machine("2q-qvm");
        let err = qvm
            .run(Executable::Raw(&Program::new()), &MemoryMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidProgram(_)));
    }

    #[tokio::test]
    async fn test_mid_circuit_measurement() {
        let qvm = machine("1q-pyqvm");
        let mut program = Program::new();
        let ro = program.declare("ro", MemoryType::Bit, 2).unwrap();
        program.inst(Instruction::simple("X", [0]));
        program.inst(Instruction::measure(0, ro.clone()));
        program.inst(Instruction::simple("X", [0]));
        program.inst(Instruction::measure(0, MemoryRef::new("ro", 1)));
        program.wrap_in_numshots_loop(5);

        let result = qvm
            .run(Executable::Raw(&program), &MemoryMap::new())
            .await
            .unwrap();
        assert!(result.register("ro").unwrap().iter().all(|r| r == &vec![1, 0]));
    }

    #[tokio::test]
    async fn test_reset_returns_every_qubit_to_zero() {
        let qvm = machine("2q-pyqvm");
        let mut program = Program::new();
        let ro = program.declare("ro", MemoryType::Bit, 3).unwrap();
        program.inst(Instruction::simple("X", [0]));
        program.inst(Instruction::simple("H", [1]));
        program.inst(Instruction::measure(0, ro.clone()));
        program.inst(Instruction::Reset);
        program.inst(Instruction::measure(0, MemoryRef::new("ro", 1)));
        program.inst(Instruction::measure(1, MemoryRef::new("ro", 2)));
        program.wrap_in_numshots_loop(20);

        let result = qvm
            .run(Executable::Raw(&program), &MemoryMap::new())
            .await
            .unwrap();
        assert!(result.register("ro").unwrap().iter().all(|r| r == &vec![1, 0, 0]));
    }

    #[tokio::test]
    async fn test_execution_timeout_on_cpu_bound_run() {
        let config = MachineConfig::new("16q-pyqvm").with_execution_timeout(0.001);
        let qvm = QvmMachine::from_config(config).unwrap();
        let mut program = Program::new();
        let ro = program.declare("ro", MemoryType::Bit, 1).unwrap();
        for _ in 0..40 {
            for q in 0..16 {
                program.inst(Instruction::simple("H", [q]));
            }
            program.inst(Instruction::simple("CNOT", [0, 15]));
        }
        // A mid-circuit measurement forces one evolution per shot.
        program.inst(Instruction::measure(0, ro));
        program.inst(Instruction::simple("X", [0]));
        program.wrap_in_numshots_loop(100);

        let started = Instant::now();
        let err = qvm
            .run(Executable::Raw(&program), &MemoryMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Timeout { ref operation, .. } if operation == "execution"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_compile_timeout() {
        let config = MachineConfig::new("2q-qvm")
            .with_compiler_timeout(0.5)
            .with_extra("compile_delay_ms", serde_json::json!(2000));
        let qvm = QvmMachine::from_config(config).unwrap();
        let err = qvm.compile(&Program::new()).await.unwrap_err();
        assert!(matches!(err, HalError::Timeout { ref operation, .. } if operation == "compile"));
    }
}
