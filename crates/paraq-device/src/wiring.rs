//! Logical wire labels to physical qubits.

use rustc_hash::FxHashMap;

use paraq_ir::WireLabel;

use crate::error::{DeviceError, DeviceResult};

/// Bijection between user wire labels and machine qubits.
///
/// Labels are paired in order with the machine's qubits sorted ascending.
/// The map is fixed for the lifetime of a device.
#[derive(Debug, Clone)]
pub struct WiringMap {
    labels: Vec<WireLabel>,
    qubits: Vec<u32>,
    index: FxHashMap<WireLabel, usize>,
}

impl WiringMap {
    /// Pair `labels` with `machine_qubits`.
    ///
    /// Without labels, wires are the consecutive integers `0..n`.
    pub fn new(labels: Option<Vec<WireLabel>>, machine_qubits: &[u32]) -> DeviceResult<Self> {
        let mut qubits = machine_qubits.to_vec();
        qubits.sort_unstable();
        qubits.dedup();

        let labels = match labels {
            Some(labels) => labels,
            None => (0..qubits.len() as i64).map(WireLabel::Index).collect(),
        };
        if labels.len() != qubits.len() {
            return Err(DeviceError::Configuration(format!(
                "Device has a fixed number of {} qubits and cannot be created with {} wires.",
                qubits.len(),
                labels.len()
            )));
        }

        let mut index = FxHashMap::default();
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(DeviceError::Configuration(format!(
                    "Wire label {label} appears more than once"
                )));
            }
        }

        Ok(Self {
            labels,
            qubits,
            index,
        })
    }

    /// Physical qubit for a label.
    pub fn physical(&self, label: &WireLabel) -> DeviceResult<u32> {
        self.position(label)
            .map(|i| self.qubits[i])
            .ok_or_else(|| DeviceError::UnknownWire(label.clone()))
    }

    /// Physical qubits for a list of labels, in order.
    pub fn map_wires(&self, labels: &[WireLabel]) -> DeviceResult<Vec<u32>> {
        labels.iter().map(|l| self.physical(l)).collect()
    }

    /// Position of a label in wire order (also its state-vector axis).
    pub fn position(&self, label: &WireLabel) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Wire labels in order.
    pub fn labels(&self) -> &[WireLabel] {
        &self.labels
    }

    /// Physical qubits, ascending.
    pub fn physical_qubits(&self) -> &[u32] {
        &self.qubits
    }

    /// Iterate over `(label, qubit)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&WireLabel, u32)> {
        self.labels.iter().zip(self.qubits.iter().copied())
    }

    /// Number of wires.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the map has no wires.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
