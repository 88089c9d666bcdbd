//! Supported operations and their Quil emission.
//!
//! | Operation | Wires | Params | Emits |
//! |-----------|-------|--------|-------|
//! | `BasisState` | any | bits | `X` on every 1-bit |
//! | `Identity`, `PauliX/Y/Z`, `Hadamard`, `S`, `T` | 1 | – | `I`, `X/Y/Z`, `H`, `S`, `T` |
//! | `PhaseShift`, `RX`, `RY`, `RZ` | 1 | 1 | `PHASE`, `RX`, `RY`, `RZ` |
//! | `Rot` | 1 | 3 | `RZ(a) RY(b) RZ(c)` |
//! | `CNOT`, `CZ`, `SWAP`, `ISWAP` | 2 | – | same name |
//! | `PSWAP` | 2 | 1 | `PSWAP` |
//! | `CPHASE` | 2 | φ, q | `CPHASE00/01/10/CPHASE` |
//! | `CSWAP`, `Toffoli` | 3 | – | `CSWAP`, `CCNOT` |

use std::collections::BTreeSet;

use paraq_ir::{GateArg, Instruction};

use crate::error::{DeviceError, DeviceResult};

/// How an operation turns into instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// One gate, arguments passed through.
    Gate(&'static str),
    /// `X` on the qubits whose bit is 1.
    BasisState,
    /// `RZ RY RZ` on one qubit.
    Rot,
    /// Conditional phase selected by a literal second argument.
    ControlledPhase,
}

/// An entry of the supported-operation table.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    /// Operation name.
    pub name: &'static str,
    /// Required wire count; `None` for any.
    pub num_wires: Option<usize>,
    /// Required scalar parameter count.
    pub num_params: usize,
    /// Emission rule.
    pub emission: Emission,
}

const fn op(name: &'static str, wires: usize, params: usize, emission: Emission) -> OperationSpec {
    OperationSpec {
        name,
        num_wires: Some(wires),
        num_params: params,
        emission,
    }
}

/// The supported-operation table.
pub const SUPPORTED_OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "BasisState",
        num_wires: None,
        num_params: 1,
        emission: Emission::BasisState,
    },
    op("Identity", 1, 0, Emission::Gate("I")),
    op("PauliX", 1, 0, Emission::Gate("X")),
    op("PauliY", 1, 0, Emission::Gate("Y")),
    op("PauliZ", 1, 0, Emission::Gate("Z")),
    op("Hadamard", 1, 0, Emission::Gate("H")),
    op("S", 1, 0, Emission::Gate("S")),
    op("T", 1, 0, Emission::Gate("T")),
    op("PhaseShift", 1, 1, Emission::Gate("PHASE")),
    op("RX", 1, 1, Emission::Gate("RX")),
    op("RY", 1, 1, Emission::Gate("RY")),
    op("RZ", 1, 1, Emission::Gate("RZ")),
    op("Rot", 1, 3, Emission::Rot),
    op("CNOT", 2, 0, Emission::Gate("CNOT")),
    op("CZ", 2, 0, Emission::Gate("CZ")),
    op("SWAP", 2, 0, Emission::Gate("SWAP")),
    op("ISWAP", 2, 0, Emission::Gate("ISWAP")),
    op("PSWAP", 2, 1, Emission::Gate("PSWAP")),
    op("CPHASE", 2, 2, Emission::ControlledPhase),
    op("CSWAP", 3, 0, Emission::Gate("CSWAP")),
    op("Toffoli", 3, 0, Emission::Gate("CCNOT")),
];

/// Look up an operation by name.
pub fn lookup(name: &str) -> Option<&'static OperationSpec> {
    SUPPORTED_OPERATIONS.iter().find(|spec| spec.name == name)
}

/// Names of all supported operations.
pub fn supported_operations() -> BTreeSet<String> {
    SUPPORTED_OPERATIONS
        .iter()
        .map(|spec| spec.name.to_string())
        .collect()
}

impl OperationSpec {
    /// Check wire and parameter counts.
    pub fn check_arity(&self, num_wires: usize, num_params: usize) -> DeviceResult<()> {
        if let Some(expected) = self.num_wires {
            if num_wires != expected {
                return Err(DeviceError::InvalidOperation(format!(
                    "{} acts on {expected} wires, got {num_wires}",
                    self.name
                )));
            }
        }
        if num_params != self.num_params {
            return Err(DeviceError::InvalidOperation(format!(
                "{} takes {} parameters, got {num_params}",
                self.name, self.num_params
            )));
        }
        Ok(())
    }

    /// Instructions for a scalar-parameter operation on physical `qubits`.
    pub fn emit(&self, args: Vec<GateArg>, qubits: &[u32]) -> DeviceResult<Vec<Instruction>> {
        let instructions = match self.emission {
            Emission::Gate(gate) => vec![Instruction::gate(gate, args, qubits.iter().copied())],
            Emission::Rot => {
                let q = [qubits[0]];
                let mut args = args.into_iter();
                let (a, b, c) = match (args.next(), args.next(), args.next()) {
                    (Some(a), Some(b), Some(c)) => (a, b, c),
                    _ => {
                        return Err(DeviceError::InvalidOperation(
                            "Rot takes 3 parameters".to_string(),
                        ));
                    }
                };
                vec![
                    Instruction::gate("RZ", vec![a], q),
                    Instruction::gate("RY", vec![b], q),
                    Instruction::gate("RZ", vec![c], q),
                ]
            }
            Emission::ControlledPhase => {
                let mut args = args.into_iter();
                let (phi, selector) = match (args.next(), args.next()) {
                    (Some(phi), Some(GateArg::Literal(q))) => (phi, q),
                    (Some(_), Some(GateArg::Memory(_))) => {
                        return Err(DeviceError::InvalidOperation(
                            "CPHASE phase selector must be a literal".to_string(),
                        ));
                    }
                    _ => {
                        return Err(DeviceError::InvalidOperation(
                            "CPHASE takes 2 parameters".to_string(),
                        ));
                    }
                };
                vec![Instruction::gate(
                    controlled_phase_gate(selector)?,
                    vec![phi],
                    qubits.iter().copied(),
                )]
            }
            Emission::BasisState => {
                return Err(DeviceError::InvalidOperation(
                    "BasisState takes a bit pattern".to_string(),
                ));
            }
        };
        Ok(instructions)
    }
}

/// `X` on every qubit whose bit is set.
pub fn emit_basis_state(bits: &[u8], qubits: &[u32]) -> DeviceResult<Vec<Instruction>> {
    if bits.len() != qubits.len() {
        return Err(DeviceError::InvalidOperation(format!(
            "BasisState has {} bits for {} wires",
            bits.len(),
            qubits.len()
        )));
    }
    bits.iter()
        .zip(qubits)
        .filter_map(|(bit, q)| match bit {
            0 => None,
            1 => Some(Ok(Instruction::simple("X", [*q]))),
            other => Some(Err(DeviceError::InvalidOperation(format!(
                "BasisState bit must be 0 or 1, got {other}"
            )))),
        })
        .collect()
}

fn controlled_phase_gate(selector: f64) -> DeviceResult<&'static str> {
    let gate = match selector {
        q if q == 0.0 => "CPHASE00",
        q if q == 1.0 => "CPHASE01",
        q if q == 2.0 => "CPHASE10",
        q if q == 3.0 => "CPHASE",
        other => {
            return Err(DeviceError::InvalidOperation(format!(
                "CPHASE selector must be 0, 1, 2 or 3, got {other}"
            )));
        }
    };
    Ok(gate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paraq_sim::gate_arity;

    #[test]
    fn test_every_emitted_gate_is_native() {
        for spec in SUPPORTED_OPERATIONS {
            if let Emission::Gate(gate) = spec.emission {
                let (qubits, params) = gate_arity(gate).unwrap();
                assert_eq!(Some(qubits), spec.num_wires, "{}", spec.name);
                assert_eq!(params, spec.num_params, "{}", spec.name);
            }
        }
    }

    #[test]
    fn test_lookup_and_names() {
        assert_eq!(lookup("Toffoli").unwrap().emission, Emission::Gate("CCNOT"));
        assert!(lookup("QubitStateVector").is_none());
        let names = supported_operations();
        assert!(names.contains("BasisState"));
        assert!(names.contains("CPHASE"));
        assert_eq!(names.len(), SUPPORTED_OPERATIONS.len());
    }

    #[test]
    fn test_rot_decomposition() {
        let spec = lookup("Rot").unwrap();
        let out = spec
            .emit(vec![0.1.into(), 0.2.into(), 0.3.into()], &[4])
            .unwrap();
        let rendered: Vec<String> = out.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["RZ(0.1) 4", "RY(0.2) 4", "RZ(0.3) 4"]);
    }

    #[test]
    fn test_cphase_selector() {
        let spec = lookup("CPHASE").unwrap();
        let out = spec.emit(vec![0.5.into(), 2.0.into()], &[0, 1]).unwrap();
        assert_eq!(out[0].to_string(), "CPHASE10(0.5) 0 1");
        assert!(spec.emit(vec![0.5.into(), 7.0.into()], &[0, 1]).is_err());
    }

    #[test]
    fn test_basis_state() {
        let out = emit_basis_state(&[1, 0, 1], &[3, 4, 5]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].to_string(), "X 5");
        assert!(emit_basis_state(&[1], &[3, 4]).is_err());
        assert!(emit_basis_state(&[2], &[3]).is_err());
    }

    #[test]
    fn test_arity() {
        let spec = lookup("CNOT").unwrap();
        assert!(spec.check_arity(2, 0).is_ok());
        assert!(matches!(
            spec.check_arity(1, 0),
            Err(DeviceError::InvalidOperation(_))
        ));
        assert!(lookup("BasisState").unwrap().check_arity(5, 1).is_ok());
    }
}
