//! Circuit container and structural hashing.

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::error::{IrError, IrResult};
use crate::operation::Operation;
use crate::parameter::{ParamId, Parameter};

/// A circuit as handed to a device: operations, measurement-basis
/// rotations, and an optional caller-supplied structural hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CircuitRepr")]
pub struct Circuit {
    /// Operations in application order.
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Basis-change rotations applied before readout.
    #[serde(default)]
    pub rotations: Vec<Operation>,
    /// Explicit structural hash. When absent, [`Circuit::hash`] computes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<u64>,
    /// Next trainable slot to hand out.
    #[serde(skip)]
    next_param: u32,
}

/// Wire form of a circuit; slot allocation resumes after the highest id seen.
#[derive(Deserialize)]
struct CircuitRepr {
    #[serde(default)]
    operations: Vec<Operation>,
    #[serde(default)]
    rotations: Vec<Operation>,
    #[serde(default)]
    hash: Option<u64>,
}

impl From<CircuitRepr> for Circuit {
    fn from(repr: CircuitRepr) -> Self {
        let mut circuit = Circuit::from_operations(repr.operations, repr.rotations);
        circuit.hash = repr.hash;
        circuit
    }
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit from existing operations and rotations.
    pub fn from_operations(operations: Vec<Operation>, rotations: Vec<Operation>) -> Self {
        let next_param = operations
            .iter()
            .chain(&rotations)
            .flat_map(|op| &op.parameters)
            .filter_map(Parameter::id)
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(0);
        Self {
            operations,
            rotations,
            hash: None,
            next_param,
        }
    }

    /// Allocate a new trainable parameter with the next free slot id.
    pub fn trainable(&mut self, value: f64) -> Parameter {
        let id = ParamId(self.next_param);
        self.next_param += 1;
        Parameter::Trainable { id, value }
    }

    /// Append an operation.
    pub fn push(&mut self, op: Operation) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Append a measurement-basis rotation.
    pub fn push_rotation(&mut self, op: Operation) -> &mut Self {
        self.rotations.push(op);
        self
    }

    /// Set an explicit structural hash.
    pub fn with_hash(mut self, hash: u64) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Update every occurrence of a trainable parameter.
    ///
    /// The circuit structure, and therefore its structural hash, is unchanged.
    pub fn set_parameter(&mut self, id: ParamId, value: f64) -> IrResult<()> {
        let mut found = false;
        for op in self.operations.iter_mut().chain(self.rotations.iter_mut()) {
            for param in &mut op.parameters {
                if let Parameter::Trainable { id: pid, value: v } = param {
                    if *pid == id {
                        *v = value;
                        found = true;
                    }
                }
            }
        }
        if found {
            Ok(())
        } else {
            Err(IrError::UnknownParameter(id))
        }
    }

    /// Number of trainable slots handed out so far.
    pub fn num_trainable(&self) -> u32 {
        self.next_param
    }

    /// The structural hash: the explicit one if set, otherwise computed.
    pub fn hash(&self) -> u64 {
        self.hash.unwrap_or_else(|| self.structural_hash())
    }

    /// Fingerprint of the circuit structure.
    ///
    /// Covers operation names, wires, parameter kinds and trainable slot ids.
    /// Values of trainable operation parameters outside state preparations
    /// are left out since they are rebound after compilation. Every other
    /// value, rotations included, is baked into the compiled program and is
    /// hashed.
    pub fn structural_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for (section, ops) in [&self.operations, &self.rotations].into_iter().enumerate() {
            section.hash(&mut hasher);
            ops.len().hash(&mut hasher);
            for op in ops {
                op.name.hash(&mut hasher);
                op.wires.hash(&mut hasher);
                let symbolic = section == 0 && !op.is_state_preparation();
                for param in &op.parameters {
                    match param {
                        Parameter::Trainable { id, .. } if symbolic => {
                            0u8.hash(&mut hasher);
                            id.hash(&mut hasher);
                        }
                        Parameter::Trainable { value, .. } | Parameter::Value(value) => {
                            1u8.hash(&mut hasher);
                            value.to_bits().hash(&mut hasher);
                        }
                        Parameter::Bits(bits) => {
                            2u8.hash(&mut hasher);
                            bits.hash(&mut hasher);
                        }
                    }
                }
            }
        }
        hasher.finish()
    }
}
