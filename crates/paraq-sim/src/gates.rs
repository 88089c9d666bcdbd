//! Gate matrices for the native gate set.
//!
//! Matrices are written in the computational basis of the gate's qubits in
//! the order they are listed, first qubit most significant.

use std::f64::consts::FRAC_1_SQRT_2;

use ndarray::{Array2, array};
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Number of qubits and parameters a native gate takes.
pub fn gate_arity(name: &str) -> Option<(usize, usize)> {
    let arity = match name {
        "I" | "X" | "Y" | "Z" | "H" | "S" | "T" => (1, 0),
        "PHASE" | "RX" | "RY" | "RZ" => (1, 1),
        "CNOT" | "CZ" | "SWAP" | "ISWAP" => (2, 0),
        "PSWAP" | "CPHASE00" | "CPHASE01" | "CPHASE10" | "CPHASE" => (2, 1),
        "CSWAP" | "CCNOT" => (3, 0),
        _ => return None,
    };
    Some(arity)
}

/// Unitary matrix of a native gate.
pub fn gate_matrix(name: &str, params: &[f64]) -> SimResult<Array2<Complex64>> {
    let (_, num_params) =
        gate_arity(name).ok_or_else(|| SimError::UnknownGate(name.to_string()))?;
    if params.len() != num_params {
        return Err(SimError::ParameterCount {
            gate: name.to_string(),
            expected: num_params,
            got: params.len(),
        });
    }
    let theta = params.first().copied().unwrap_or_default();

    let matrix = match name {
        "I" => Array2::eye(2),
        "X" => array![[ZERO, ONE], [ONE, ZERO]],
        "Y" => array![[ZERO, -I], [I, ZERO]],
        "Z" => diagonal(&[ONE, -ONE]),
        "H" => {
            let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
            array![[h, h], [h, -h]]
        }
        "S" => diagonal(&[ONE, I]),
        "T" => diagonal(&[ONE, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)]),
        "PHASE" => diagonal(&[ONE, phase(theta)]),
        "RX" => {
            let (c, s) = half_angle(theta);
            array![[c, -I * s], [-I * s, c]]
        }
        "RY" => {
            let (c, s) = half_angle(theta);
            array![[c, -s], [s, c]]
        }
        "RZ" => diagonal(&[phase(-theta / 2.0), phase(theta / 2.0)]),
        "CNOT" => permutation(4, &[(2, 3)]),
        "CZ" => diagonal(&[ONE, ONE, ONE, -ONE]),
        "SWAP" => permutation(4, &[(1, 2)]),
        "ISWAP" => swap_with_phase(I),
        "PSWAP" => swap_with_phase(phase(theta)),
        "CPHASE00" => diagonal(&[phase(theta), ONE, ONE, ONE]),
        "CPHASE01" => diagonal(&[ONE, phase(theta), ONE, ONE]),
        "CPHASE10" => diagonal(&[ONE, ONE, phase(theta), ONE]),
        "CPHASE" => diagonal(&[ONE, ONE, ONE, phase(theta)]),
        "CSWAP" => permutation(8, &[(5, 6)]),
        "CCNOT" => permutation(8, &[(6, 7)]),
        _ => return Err(SimError::UnknownGate(name.to_string())),
    };
    Ok(matrix)
}

fn phase(angle: f64) -> Complex64 {
    Complex64::from_polar(1.0, angle)
}

fn half_angle(theta: f64) -> (Complex64, Complex64) {
    let half = theta / 2.0;
    (Complex64::new(half.cos(), 0.0), Complex64::new(half.sin(), 0.0))
}

fn diagonal(entries: &[Complex64]) -> Array2<Complex64> {
    Array2::from_diag(&ndarray::aview1(entries))
}

/// Identity with the listed basis states exchanged.
fn permutation(dim: usize, swaps: &[(usize, usize)]) -> Array2<Complex64> {
    let mut matrix = Array2::eye(dim);
    for &(a, b) in swaps {
        matrix[[a, a]] = ZERO;
        matrix[[b, b]] = ZERO;
        matrix[[a, b]] = ONE;
        matrix[[b, a]] = ONE;
    }
    matrix
}

fn swap_with_phase(factor: Complex64) -> Array2<Complex64> {
    let mut matrix = permutation(4, &[(1, 2)]);
    matrix[[1, 2]] = factor;
    matrix[[2, 1]] = factor;
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn is_unitary(m: &Array2<Complex64>) -> bool {
        let adjoint = m.t().mapv(|z| z.conj());
        let product = adjoint.dot(m);
        let eye: Array2<Complex64> = Array2::eye(m.nrows());
        product
            .iter()
            .zip(eye.iter())
            .all(|(a, b)| (a - b).norm() < 1e-10)
    }

    #[test]
    fn test_all_native_gates_are_unitary() {
        for name in [
            "I", "X", "Y", "Z", "H", "S", "T", "PHASE", "RX", "RY", "RZ", "CNOT", "CZ", "SWAP",
            "ISWAP", "PSWAP", "CPHASE00", "CPHASE01", "CPHASE10", "CPHASE", "CSWAP", "CCNOT",
        ] {
            let (qubits, params) = gate_arity(name).unwrap();
            let args = vec![0.37; params];
            let m = gate_matrix(name, &args).unwrap();
            assert_eq!(m.nrows(), 1 << qubits, "{name}");
            assert!(is_unitary(&m), "{name} is not unitary");
        }
    }

    #[test]
    fn test_rx_pi_is_x_up_to_phase() {
        let rx = gate_matrix("RX", &[PI]).unwrap();
        assert!(rx[[0, 0]].norm() < 1e-10);
        assert!((rx[[1, 0]] - Complex64::new(0.0, -1.0)).norm() < 1e-10);
    }

    #[test]
    fn test_cphase_variants_place_phase() {
        let phi = 0.5;
        for (name, index) in [("CPHASE00", 0), ("CPHASE01", 1), ("CPHASE10", 2), ("CPHASE", 3)] {
            let m = gate_matrix(name, &[phi]).unwrap();
            assert!((m[[index, index]] - phase(phi)).norm() < 1e-10, "{name}");
        }
    }

    #[test]
    fn test_unknown_gate_and_parameter_count() {
        assert!(matches!(gate_matrix("FOO", &[]), Err(SimError::UnknownGate(_))));
        assert!(matches!(
            gate_matrix("RX", &[]),
            Err(SimError::ParameterCount { expected: 1, got: 0, .. })
        ));
        assert!(gate_arity("RXX").is_none());
    }
}
