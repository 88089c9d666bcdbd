//! Statevector simulation engine.

use ndarray::Array1;
use num_complex::Complex64;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tracing::trace;

use crate::error::{SimError, SimResult};
use crate::gates::{gate_arity, gate_matrix};
use crate::tensor::apply_operator;

/// A statevector representing a quantum state.
///
/// Qubit 0 is the most significant bit of an amplitude index.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Array1<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = Array1::zeros(1 << num_qubits);
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes.
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// Apply a native gate by name.
    pub fn apply_gate(&mut self, name: &str, params: &[f64], qubits: &[usize]) -> SimResult<()> {
        if let Some((expected, _)) = gate_arity(name) {
            if qubits.len() != expected {
                return Err(SimError::QubitCount {
                    gate: name.to_string(),
                    expected,
                    got: qubits.len(),
                });
            }
        }
        let matrix = gate_matrix(name, params)?;
        trace!(gate = name, ?qubits, "applying gate");
        self.amplitudes = apply_operator(&matrix, self.amplitudes.view(), qubits)?;
        Ok(())
    }

    /// Return `qubit` to |0⟩: measure it, then flip it if it read 1.
    pub fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> SimResult<()> {
        if self.measure(qubit, rng)? == 1 {
            self.apply_gate("X", &[], &[qubit])?;
        }
        Ok(())
    }

    /// Measure one qubit, collapsing the state onto the observed outcome.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> SimResult<u8> {
        if qubit >= self.num_qubits {
            return Err(SimError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        let mask = 1 << (self.num_qubits - 1 - qubit);
        let p_one: f64 = self
            .amplitudes
            .indexed_iter()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();
        let total: f64 = self.amplitudes.iter().map(Complex64::norm_sqr).sum();
        if total <= 0.0 {
            return Err(SimError::ZeroNorm);
        }

        let outcome = u8::from(rng.r#gen::<f64>() * total < p_one);
        let kept = if outcome == 1 { p_one } else { total - p_one };
        let scale = kept.sqrt();
        for (i, amp) in self.amplitudes.indexed_iter_mut() {
            if u8::from(i & mask != 0) == outcome {
                *amp /= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        Ok(outcome)
    }

    /// Outcome probabilities, indexed like the amplitudes.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Draw `shots` basis-state outcomes.
    pub fn sample<R: Rng + ?Sized>(&self, shots: usize, rng: &mut R) -> SimResult<Vec<usize>> {
        let dist = WeightedIndex::new(self.probabilities()).map_err(|_| SimError::ZeroNorm)?;
        Ok((0..shots).map(|_| dist.sample(rng)).collect())
    }

    /// Value of `qubit` in a basis-state outcome.
    pub fn bit(&self, outcome: usize, qubit: usize) -> u8 {
        ((outcome >> (self.num_qubits - 1 - qubit)) & 1) as u8
    }

    /// Convert a measurement outcome to a bitstring, qubit 0 first.
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        format!("{:0width$b}", outcome, width = self.num_qubits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate("H", &[], &[0]).unwrap();
        sv.apply_gate("CNOT", &[], &[0, 1]).unwrap();

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_x_gate_bit_order() {
        let mut sv = Statevector::new(3);
        sv.apply_gate("X", &[], &[0]).unwrap();
        assert!(approx_eq(sv.amplitudes[0b100], Complex64::new(1.0, 0.0)));
        assert_eq!(sv.bit(0b100, 0), 1);
        assert_eq!(sv.bit(0b100, 2), 0);
        assert_eq!(sv.outcome_to_bitstring(0b100), "100");
    }

    #[test]
    fn test_wrong_qubit_count() {
        let mut sv = Statevector::new(2);
        assert!(matches!(
            sv.apply_gate("CNOT", &[], &[0]),
            Err(SimError::QubitCount { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn test_reset() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(2);
        sv.apply_gate("X", &[], &[1]).unwrap();
        sv.reset(1, &mut rng).unwrap();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(matches!(
            sv.reset(5, &mut rng),
            Err(SimError::QubitOutOfRange { qubit: 5, .. })
        ));

        // |−⟩ resets to |0⟩ up to a phase.
        for _ in 0..10 {
            let mut sv = Statevector::new(1);
            sv.apply_gate("X", &[], &[0]).unwrap();
            sv.apply_gate("H", &[], &[0]).unwrap();
            sv.reset(0, &mut rng).unwrap();
            assert!((sv.amplitudes[0].norm() - 1.0).abs() < 1e-10);
            assert!(sv.amplitudes[1].norm() < 1e-10);
        }
    }

    #[test]
    fn test_sample_deterministic() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sv = Statevector::new(1);
        sv.apply_gate("X", &[], &[0]).unwrap();
        assert!(sv.sample(100, &mut rng).unwrap().iter().all(|&o| o == 1));
    }

    #[test]
    fn test_measure_collapses_bell_pair() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut sv = Statevector::new(2);
            sv.apply_gate("H", &[], &[0]).unwrap();
            sv.apply_gate("CNOT", &[], &[0, 1]).unwrap();
            let first = sv.measure(0, &mut rng).unwrap();
            let second = sv.measure(1, &mut rng).unwrap();
            assert_eq!(first, second);
            let norm: f64 = sv.probabilities().iter().sum();
            assert!((norm - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_sample_rejects_nan_state() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut sv = Statevector::new(1);
        sv.apply_gate("RX", &[f64::NAN], &[0]).unwrap();
        assert!(matches!(sv.sample(1, &mut rng), Err(SimError::ZeroNorm)));
    }
}
