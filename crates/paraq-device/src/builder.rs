//! Program construction.
//!
//! ```text
//!   PRAGMA INITIAL_REWIRING "PARTIAL"
//!   RESET                              (active reset only)
//!   <operations>                       (parametric or concrete)
//!   <rotations>                        (always concrete)
//!   DECLARE ro BIT[n]
//!   MEASURE q_i ro[i]                  (physical qubits ascending)
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, instrument};

use paraq_ir::{
    GateArg, Instruction, MemoryRef, MemoryType, Operation, ParamId, Parameter, Program,
};

use crate::binding::ParameterBindingTable;
use crate::error::{DeviceError, DeviceResult};
use crate::operations::{Emission, OperationSpec, emit_basis_state, lookup};
use crate::wiring::WiringMap;

/// Name of the readout region.
pub const READOUT_REGION: &str = "ro";

/// Settings that shape a built program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Prepend `RESET`.
    pub active_reset: bool,
    /// Read trainable parameters from memory.
    pub parametric: bool,
    /// Shot count.
    pub shots: u32,
    /// Device short name, used in error messages.
    pub device: &'static str,
}

impl BuildOptions {
    /// Options for a concrete program with the given shot count.
    pub fn new(shots: u32) -> Self {
        Self {
            active_reset: false,
            parametric: false,
            shots,
            device: "paraq",
        }
    }
}

/// Build the program for `operations` followed by `rotations`.
///
/// New parameter bindings are committed to `bindings` only if the whole
/// build succeeds.
#[instrument(skip_all, fields(ops = operations.len(), parametric = options.parametric))]
pub fn build_program(
    operations: &[Operation],
    rotations: &[Operation],
    wiring: &WiringMap,
    options: &BuildOptions,
    bindings: &mut ParameterBindingTable,
) -> DeviceResult<Program> {
    let mut program = Program::new();
    program.inst(Instruction::pragma("INITIAL_REWIRING", ["\"PARTIAL\""]));
    if options.active_reset {
        program.inst(Instruction::Reset);
    }

    let mut staged = Staged::default();
    for (i, op) in operations.iter().enumerate() {
        if i > 0 && op.is_state_preparation() {
            return Err(DeviceError::StatePreparationOrder {
                name: op.name.clone(),
                device: options.device.to_string(),
            });
        }
        let spec = lookup(&op.name)
            .ok_or_else(|| DeviceError::UnsupportedOperation(op.name.clone()))?;
        let qubits = wiring.map_wires(&op.wires)?;
        let stage = if options.parametric && !op.is_state_preparation() {
            Some(&mut staged)
        } else {
            None
        };
        let instructions = emit(spec, op, &qubits, stage, &mut program)?;
        program.extend(instructions);
    }

    for op in rotations {
        let spec = lookup(&op.name)
            .ok_or_else(|| DeviceError::UnsupportedOperation(op.name.clone()))?;
        let qubits = wiring.map_wires(&op.wires)?;
        let instructions = emit(spec, op, &qubits, None, &mut program)?;
        program.extend(instructions);
    }

    let qubits = wiring.physical_qubits();
    let ro = program.declare(READOUT_REGION, MemoryType::Bit, qubits.len())?;
    for (i, q) in qubits.iter().enumerate() {
        program.inst(Instruction::measure(*q, MemoryRef::new(ro.region.clone(), i)));
    }
    program.wrap_in_numshots_loop(options.shots);

    debug!(
        "Built program with {} gates and {} symbolic parameters",
        program.gate_count(),
        staged.table.len()
    );
    bindings.merge(staged.table);
    Ok(program)
}

/// Bindings created during one build.
#[derive(Default)]
struct Staged {
    table: ParameterBindingTable,
    handles: BTreeMap<ParamId, MemoryRef>,
}

fn emit(
    spec: &OperationSpec,
    op: &Operation,
    qubits: &[u32],
    mut stage: Option<&mut Staged>,
    program: &mut Program,
) -> DeviceResult<Vec<Instruction>> {
    if spec.emission == Emission::BasisState {
        return match op.parameters.as_slice() {
            [Parameter::Bits(bits)] => emit_basis_state(bits, qubits),
            _ => Err(DeviceError::InvalidOperation(
                "BasisState takes a single bit pattern".to_string(),
            )),
        };
    }
    spec.check_arity(qubits.len(), op.parameters.len())?;

    let mut args = Vec::with_capacity(op.parameters.len());
    for param in &op.parameters {
        let arg = match (param, stage.as_deref_mut()) {
            (Parameter::Trainable { id, value }, Some(staged)) => {
                let symbol = id.symbol();
                let handle = match staged.handles.entry(*id) {
                    Entry::Occupied(e) => e.get().clone(),
                    Entry::Vacant(e) => e
                        .insert(program.declare(&symbol, MemoryType::Real, 1)?)
                        .clone(),
                };
                // Latest value seen for the id wins.
                staged.table.bind(symbol, handle.clone(), *value);
                GateArg::Memory(handle)
            }
            (Parameter::Value(v) | Parameter::Trainable { value: v, .. }, _) => GateArg::Literal(*v),
            (Parameter::Bits(_), _) => {
                return Err(DeviceError::InvalidOperation(format!(
                    "{} does not take a bit pattern",
                    op.name
                )));
            }
        };
        args.push(arg);
    }
    spec.emit(args, qubits)
}
