//! Gate parameters for literal and trainable circuits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable slot index of a trainable parameter within one circuit.
///
/// Ids are handed out monotonically by [`Circuit::trainable`](crate::Circuit::trainable).
/// Every occurrence that carries the same id is the same parameter, no matter
/// its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId(pub u32);

impl ParamId {
    /// Name of the memory region that holds this parameter in a built program.
    pub fn symbol(self) -> String {
        format!("theta{}", self.0)
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A parameter of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// A concrete numeric value.
    Value(f64),
    /// A differentiable parameter that can be rebound after compilation.
    Trainable {
        /// Slot index of this parameter.
        id: ParamId,
        /// Current numeric value.
        value: f64,
    },
    /// A computational-basis bit pattern (basis-state preparation).
    Bits(Vec<u8>),
}

impl Parameter {
    /// Create a concrete parameter.
    pub fn value(value: f64) -> Self {
        Parameter::Value(value)
    }

    /// Check if this parameter is marked trainable.
    pub fn is_trainable(&self) -> bool {
        matches!(self, Parameter::Trainable { .. })
    }

    /// The slot id, for trainable parameters.
    pub fn id(&self) -> Option<ParamId> {
        match self {
            Parameter::Trainable { id, .. } => Some(*id),
            Parameter::Value(_) | Parameter::Bits(_) => None,
        }
    }

    /// The scalar value, if this parameter has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Parameter::Value(v) | Parameter::Trainable { value: v, .. } => Some(*v),
            Parameter::Bits(_) => None,
        }
    }
}

impl From<f64> for Parameter {
    fn from(value: f64) -> Self {
        Parameter::Value(value)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Value(v) => write!(f, "{v}"),
            Parameter::Trainable { id, value } => write!(f, "{id}={value}"),
            Parameter::Bits(bits) => {
                for b in bits {
                    write!(f, "{b}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainable() {
        let p = Parameter::Trainable {
            id: ParamId(4),
            value: 0.5,
        };
        assert!(p.is_trainable());
        assert_eq!(p.id(), Some(ParamId(4)));
        assert_eq!(p.as_f64(), Some(0.5));
        assert_eq!(ParamId(4).symbol(), "theta4");
    }

    #[test]
    fn test_bits_have_no_scalar() {
        let p = Parameter::Bits(vec![1, 0, 1]);
        assert!(!p.is_trainable());
        assert_eq!(p.as_f64(), None);
        assert_eq!(p.to_string(), "101");
    }
}
