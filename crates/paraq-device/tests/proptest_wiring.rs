//! Property-based tests for the wiring map.

use paraq_device::WiringMap;
use paraq_ir::WireLabel;
use proptest::prelude::*;

/// A set of distinct machine qubits, in arbitrary order.
fn arb_qubits() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::btree_set(0_u32..64, 1..10)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn labels_pair_with_sorted_qubits(qubits in arb_qubits()) {
        let labels: Vec<WireLabel> = (0..qubits.len())
            .map(|i| WireLabel::from(format!("w{i}")))
            .collect();
        let wiring = WiringMap::new(Some(labels.clone()), &qubits).unwrap();

        let mut sorted = qubits.clone();
        sorted.sort_unstable();
        prop_assert_eq!(wiring.map_wires(&labels).unwrap(), sorted.clone());
        prop_assert_eq!(wiring.physical_qubits(), sorted.as_slice());

        for (i, label) in labels.iter().enumerate() {
            prop_assert_eq!(wiring.position(label), Some(i));
        }
    }

    #[test]
    fn mapping_is_injective(qubits in arb_qubits()) {
        let wiring = WiringMap::new(None, &qubits).unwrap();
        let mut mapped: Vec<u32> = wiring.iter().map(|(_, q)| q).collect();
        mapped.sort_unstable();
        mapped.dedup();
        prop_assert_eq!(mapped.len(), qubits.len());
    }
}
