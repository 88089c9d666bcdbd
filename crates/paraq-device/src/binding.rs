//! Symbolic parameter bindings.
//!
//! A built parametric program reads every trainable parameter from a
//! one-slot `REAL` region named after its id. The binding table remembers
//! which region belongs to which symbol and the value to push into it before
//! the next run, so new values never require a rebuild or a recompile.

use std::collections::BTreeMap;

use paraq_ir::{MemoryRef, Program};

use crate::error::DeviceResult;

/// Co-indexed `symbol -> region handle` and `symbol -> value` maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBindingTable {
    references: BTreeMap<String, MemoryRef>,
    values: BTreeMap<String, f64>,
}

impl ParameterBindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding, replacing the value of an existing symbol.
    pub fn bind(&mut self, symbol: impl Into<String>, reference: MemoryRef, value: f64) {
        let symbol = symbol.into();
        self.values.insert(symbol.clone(), value);
        self.references.insert(symbol, reference);
    }

    /// Update the value of a bound symbol. Returns `false` if unbound.
    pub fn set_value(&mut self, symbol: &str, value: f64) -> bool {
        match self.values.get_mut(symbol) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Region handle for a symbol.
    pub fn reference(&self, symbol: &str) -> Option<&MemoryRef> {
        self.references.get(symbol)
    }

    /// Current value of a symbol.
    pub fn value(&self, symbol: &str) -> Option<f64> {
        self.values.get(symbol).copied()
    }

    /// Iterate over `(symbol, handle, value)` in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemoryRef, f64)> {
        self.references
            .iter()
            .filter_map(|(s, r)| self.values.get(s).map(|v| (s.as_str(), r, *v)))
    }

    /// Number of bound symbols.
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Check if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Move every binding of `other` into this table.
    pub fn merge(&mut self, other: ParameterBindingTable) {
        self.references.extend(other.references);
        self.values.extend(other.values);
    }

    /// Forget every binding.
    pub fn clear(&mut self) {
        self.references.clear();
        self.values.clear();
    }

    /// Write every value into its region of `program`, overwriting what
    /// was written before.
    pub fn write_into(&self, program: &mut Program) -> DeviceResult<()> {
        for (_, reference, value) in self.iter() {
            program.write_memory(reference.region.clone(), vec![value])?;
        }
        Ok(())
    }
}
