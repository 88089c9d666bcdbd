//! Paraq state-vector kernels.
//!
//! - [`tensor`]: applies small operators to selected qubits of a large state
//!   by tensor contraction
//! - [`gates`]: matrices of the native gate set
//! - [`statevector`]: a shot-sampling simulator built on the two
//!
//! # Example
//!
//! ```
//! use paraq_sim::{Statevector, gate_matrix};
//!
//! let mut sv = Statevector::new(2);
//! sv.apply_gate("H", &[], &[0]).unwrap();
//! sv.apply_gate("CNOT", &[], &[0, 1]).unwrap();
//! assert!((sv.probabilities()[3] - 0.5).abs() < 1e-12);
//! assert_eq!(gate_matrix("SWAP", &[]).unwrap().nrows(), 4);
//! ```

pub mod error;
pub mod gates;
pub mod statevector;
pub mod tensor;

pub use error::{SimError, SimResult};
pub use gates::{gate_arity, gate_matrix};
pub use statevector::Statevector;
pub use tensor::{apply_operator, contraction_order, inverse_permutation, mat_vec_product};
