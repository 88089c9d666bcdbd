//! QVM targets: qubit sets and connectivity.
//!
//! Named targets follow the usual QVM naming scheme:
//!
//! | Name | Qubits | Connectivity | Compiles |
//! |------|--------|--------------|----------|
//! | `Nq-qvm` | `0..N` | all-to-all | yes |
//! | `Nq-pyqvm` | `0..N` | all-to-all | no |
//! | `9q-square-qvm` | `0..9` | 3×3 lattice | yes |
//! | `9q-square-pyqvm` | `0..9` | 3×3 lattice | no |
//!
//! Arbitrary topologies are built from an undirected graph whose nodes are
//! physical qubit indices.

use petgraph::algo::astar;
use petgraph::graphmap::UnGraphMap;

use paraq_hal::{HalError, HalResult};

/// Largest state vector the QVM will allocate.
pub const MAX_QUBITS: usize = 24;

/// Qubits and connectivity of a virtual machine.
#[derive(Debug, Clone)]
pub struct QvmTarget {
    name: String,
    qubits: Vec<u32>,
    /// `None` means all-to-all.
    topology: Option<UnGraphMap<u32, ()>>,
    pure_simulation: bool,
}

impl QvmTarget {
    /// Parse a named target such as `4q-qvm` or `9q-square-pyqvm`.
    pub fn parse(name: &str) -> HalResult<Self> {
        let (base, pure_simulation) = if let Some(base) = name.strip_suffix("-pyqvm") {
            (base, true)
        } else if let Some(base) = name.strip_suffix("-qvm") {
            (base, false)
        } else {
            return Err(HalError::MachineUnavailable(format!(
                "'{name}' is not a QVM name (expected '<N>q-qvm', '<N>q-pyqvm' or '9q-square-qvm')"
            )));
        };

        let target = match base {
            "9q-square" => Self::square(name, 3),
            _ => {
                let count = base
                    .strip_suffix('q')
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| HalError::MachineUnavailable(format!("unknown QVM '{name}'")))?;
                Self::fully_connected(name, count)?
            }
        };
        Ok(Self {
            pure_simulation,
            ..target
        })
    }

    /// All-to-all target over qubits `0..count`.
    pub fn fully_connected(name: impl Into<String>, count: usize) -> HalResult<Self> {
        check_size(count)?;
        Ok(Self {
            name: name.into(),
            qubits: (0..count as u32).collect(),
            topology: None,
            pure_simulation: false,
        })
    }

    /// Square lattice of `side × side` qubits, numbered row-major.
    pub fn square(name: impl Into<String>, side: u32) -> Self {
        let mut graph = UnGraphMap::new();
        for row in 0..side {
            for col in 0..side {
                let q = row * side + col;
                graph.add_node(q);
                if col + 1 < side {
                    graph.add_edge(q, q + 1, ());
                }
                if row + 1 < side {
                    graph.add_edge(q, q + side, ());
                }
            }
        }
        Self {
            name: name.into(),
            qubits: (0..side * side).collect(),
            topology: Some(graph),
            pure_simulation: false,
        }
    }

    /// Target with an explicit coupling graph.
    pub fn with_topology(name: impl Into<String>, graph: UnGraphMap<u32, ()>) -> HalResult<Self> {
        check_size(graph.node_count())?;
        let mut qubits: Vec<u32> = graph.nodes().collect();
        qubits.sort_unstable();
        Ok(Self {
            name: name.into(),
            qubits,
            topology: Some(graph),
            pure_simulation: false,
        })
    }

    /// Target with a coupling graph given as an edge list.
    pub fn from_edges(
        name: impl Into<String>,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> HalResult<Self> {
        Self::with_topology(name, UnGraphMap::from_edges(edges))
    }

    /// Switch between the compiling and pure-simulation flavours.
    pub fn with_pure_simulation(mut self, pure: bool) -> Self {
        self.pure_simulation = pure;
        self
    }

    /// Target name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical qubits, ascending.
    pub fn qubits(&self) -> &[u32] {
        &self.qubits
    }

    /// Whether programs run without compilation.
    pub fn is_pure_simulation(&self) -> bool {
        self.pure_simulation
    }

    /// Whether every pair of qubits is coupled.
    pub fn is_fully_connected(&self) -> bool {
        self.topology.is_none()
    }

    /// Position of a physical qubit in the state vector.
    pub fn index_of(&self, qubit: u32) -> Option<usize> {
        self.qubits.binary_search(&qubit).ok()
    }

    /// Whether a two-qubit gate can act on `a` and `b` directly.
    pub fn are_coupled(&self, a: u32, b: u32) -> bool {
        match &self.topology {
            None => true,
            Some(graph) => graph.contains_edge(a, b),
        }
    }

    /// Shortest chain of coupled qubits from `from` to `to`, both included.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        match &self.topology {
            None => Some(vec![from, to]),
            Some(graph) => astar(graph, from, |n| n == to, |_| 1u32, |_| 0).map(|(_, p)| p),
        }
    }
}

fn check_size(count: usize) -> HalResult<()> {
    if count == 0 {
        return Err(HalError::Configuration("a QVM needs at least one qubit".into()));
    }
    if count > MAX_QUBITS {
        return Err(HalError::Configuration(format!(
            "QVM supports at most {MAX_QUBITS} qubits, requested {count}"
        )));
    }
    Ok(())
}
