//! Tensor contraction engine.
//!
//! Applies a `2^k × 2^k` operator to `k` qubits of an `n`-qubit state vector
//! without ever materialising the `2^n × 2^n` operator.
//!
//! # Conventions
//!
//! Qubit 0 is the most significant bit of a state index. The rows and
//! columns of an operator follow the computational basis of its targets in
//! the order given, first target most significant.
//!
//! # Algorithm
//!
//! ```text
//!   state (2^n)                        reshape   [2, 2, ..., 2]       (one axis per qubit)
//!   permute axes                                 targets ++ sorted(rest)
//!   collapse                                     (2^k, 2^(n-k))
//!   operator · collapsed                         contracts the bra axes with the targets
//!   expand                                       [2, ..., 2]          (targets first)
//!   permute by argsort(targets ++ sorted(rest))  canonical qubit order
//!   flatten                                      2^n
//! ```
//!
//! The untouched qubits must be taken in ascending order; the inverse
//! permutation is only correct against that fixed layout.

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

/// Number of qubits represented by a state of `len` amplitudes.
pub fn num_qubits_for(len: usize) -> SimResult<usize> {
    if len == 0 || !len.is_power_of_two() {
        return Err(SimError::InvalidStateLength {
            expected: 0,
            got: len,
        });
    }
    Ok(len.trailing_zeros() as usize)
}

/// Axis order after contraction: the targets, then every other qubit
/// ascending.
pub fn contraction_order(targets: &[usize], num_qubits: usize) -> Vec<usize> {
    let mut order = targets.to_vec();
    order.extend((0..num_qubits).filter(|q| !targets.contains(q)));
    order
}

/// Inverse of a permutation (argsort).
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (position, &axis) in perm.iter().enumerate() {
        inverse[axis] = position;
    }
    inverse
}

fn check_targets(targets: &[usize], num_qubits: usize) -> SimResult<()> {
    for (i, &qubit) in targets.iter().enumerate() {
        if qubit >= num_qubits {
            return Err(SimError::QubitOutOfRange { qubit, num_qubits });
        }
        if targets[..i].contains(&qubit) {
            return Err(SimError::DuplicateTarget(qubit));
        }
    }
    Ok(())
}

/// Apply `matrix` to the qubits `targets` of `state`.
///
/// The number of qubits is inferred from the state length.
///
/// # Errors
///
/// - [`SimError::DimensionMismatch`] if `matrix` is not `2^k × 2^k` for
///   `k = targets.len()`
/// - [`SimError::InvalidStateLength`] if the state length is not a power of two
/// - [`SimError::QubitOutOfRange`] / [`SimError::DuplicateTarget`] for bad targets
pub fn apply_operator(
    matrix: &Array2<Complex64>,
    state: ArrayView1<'_, Complex64>,
    targets: &[usize],
) -> SimResult<Array1<Complex64>> {
    let num_qubits = num_qubits_for(state.len())?;
    // Distinct in-range targets keep the shift below the state's width.
    check_targets(targets, num_qubits)?;

    let num_targets = targets.len();
    let dim = 1usize << num_targets;
    let (rows, cols) = matrix.dim();
    if (rows, cols) != (dim, dim) {
        return Err(SimError::DimensionMismatch {
            expected: dim,
            num_targets,
            rows,
            cols,
        });
    }

    let axes = vec![2usize; num_qubits];
    let order = contraction_order(targets, num_qubits);
    let rest = 1usize << (num_qubits - num_targets);

    // Bring the target axes to the front and collapse into a matrix whose
    // rows index the targets.
    let tensor = state.into_shape_with_order(axes.clone())?;
    let front = tensor
        .permuted_axes(order.clone())
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((dim, rest))?;

    let contracted = matrix.dot(&front);

    let restored = contracted
        .into_shape_with_order(axes)?
        .permuted_axes(inverse_permutation(&order));

    Ok(restored
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order(1usize << num_qubits)?)
}

/// Apply `matrix` to `wires` of a state that must span exactly
/// `num_wires` qubits.
pub fn mat_vec_product(
    matrix: &Array2<Complex64>,
    state: &Array1<Complex64>,
    wires: &[usize],
    num_wires: usize,
) -> SimResult<Array1<Complex64>> {
    let expected = u32::try_from(num_wires)
        .ok()
        .and_then(|n| 1usize.checked_shl(n))
        .unwrap_or(0);
    if state.len() != expected {
        return Err(SimError::InvalidStateLength {
            expected,
            got: state.len(),
        });
    }
    apply_operator(matrix, state.view(), wires)
}
