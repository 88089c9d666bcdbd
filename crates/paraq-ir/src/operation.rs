//! Abstract operations of the circuit-description layer.

use serde::{Deserialize, Serialize};

use crate::parameter::Parameter;
use crate::wire::WireLabel;

/// Operations that only have defined semantics as the very first
/// instruction on a pristine register.
pub const STATE_PREPARATIONS: &[&str] = &["BasisState", "QubitStateVector"];

/// An abstract quantum operation: a name, its parameters and the logical
/// wires it acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation name (e.g. `"RX"`, `"CNOT"`, `"BasisState"`).
    pub name: String,
    /// Ordered parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Ordered logical wires.
    pub wires: Vec<WireLabel>,
}

impl Operation {
    /// Create a new operation.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        wires: impl IntoIterator<Item = impl Into<WireLabel>>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            wires: wires.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a basis-state preparation over `wires`.
    pub fn basis_state(
        bits: impl Into<Vec<u8>>,
        wires: impl IntoIterator<Item = impl Into<WireLabel>>,
    ) -> Self {
        Self::new("BasisState", vec![Parameter::Bits(bits.into())], wires)
    }

    /// Check if this is a state-preparation operation.
    pub fn is_state_preparation(&self) -> bool {
        STATE_PREPARATIONS.contains(&self.name.as_str())
    }

    /// Number of wires this operation acts on.
    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }
}
