//! Quil-like executable programs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{IrError, IrResult};

/// Values written into declared memory regions, keyed by region name.
pub type MemoryMap = BTreeMap<String, Vec<f64>>;

/// Type of a classical memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryType {
    /// Single bits (readout).
    Bit,
    /// Double-precision reals (parameters).
    Real,
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryType::Bit => write!(f, "BIT"),
            MemoryType::Real => write!(f, "REAL"),
        }
    }
}

/// A reference to one slot of a declared memory region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRef {
    /// Region name.
    pub region: String,
    /// Slot within the region.
    pub offset: usize,
}

impl MemoryRef {
    /// Create a memory reference.
    pub fn new(region: impl Into<String>, offset: usize) -> Self {
        Self {
            region: region.into(),
            offset,
        }
    }
}

impl fmt::Display for MemoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.region, self.offset)
    }
}

/// A gate argument: a literal or a reference into parameter memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateArg {
    /// A value baked into the program.
    Literal(f64),
    /// A value read from memory at run time.
    Memory(MemoryRef),
}

impl GateArg {
    /// Resolve the argument against written memory.
    pub fn resolve(&self, memory: &MemoryMap) -> Option<f64> {
        match self {
            GateArg::Literal(v) => Some(*v),
            GateArg::Memory(r) => memory.get(&r.region)?.get(r.offset).copied(),
        }
    }

    /// Check if the argument is a memory reference.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, GateArg::Memory(_))
    }
}

impl From<f64> for GateArg {
    fn from(value: f64) -> Self {
        GateArg::Literal(value)
    }
}

impl fmt::Display for GateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateArg::Literal(v) => write!(f, "{v}"),
            GateArg::Memory(r) => write!(f, "{r}"),
        }
    }
}

/// One program instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Compiler directive.
    Pragma {
        /// Directive name.
        name: String,
        /// Directive arguments, rendered verbatim.
        args: Vec<String>,
    },
    /// Reset every qubit to |0⟩.
    Reset,
    /// Classical memory declaration.
    Declare {
        /// Region name.
        name: String,
        /// Element type.
        ty: MemoryType,
        /// Number of slots.
        size: usize,
    },
    /// Gate application on physical qubits.
    Gate {
        /// Quil gate name.
        name: String,
        /// Gate arguments.
        params: Vec<GateArg>,
        /// Physical qubits.
        qubits: Vec<u32>,
    },
    /// Measurement of one qubit into a bit slot.
    Measure {
        /// Physical qubit.
        qubit: u32,
        /// Readout slot.
        target: MemoryRef,
    },
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(
        name: impl Into<String>,
        params: Vec<GateArg>,
        qubits: impl IntoIterator<Item = u32>,
    ) -> Self {
        Instruction::Gate {
            name: name.into(),
            params,
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Create a parameterless gate instruction.
    pub fn simple(name: impl Into<String>, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self::gate(name, vec![], qubits)
    }

    /// Create a pragma.
    pub fn pragma(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Instruction::Pragma {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a measurement.
    pub fn measure(qubit: u32, target: MemoryRef) -> Self {
        Instruction::Measure { qubit, target }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Pragma { name, args } => {
                write!(f, "PRAGMA {name}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Instruction::Reset => write!(f, "RESET"),
            Instruction::Declare { name, ty, size } => write!(f, "DECLARE {name} {ty}[{size}]"),
            Instruction::Gate {
                name,
                params,
                qubits,
            } => {
                write!(f, "{name}")?;
                if !params.is_empty() {
                    let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
                    write!(f, "({})", rendered.join(", "))?;
                }
                for q in qubits {
                    write!(f, " {q}")?;
                }
                Ok(())
            }
            Instruction::Measure { qubit, target } => write!(f, "MEASURE {qubit} {target}"),
        }
    }
}

/// An executable program: instructions, shot count and written memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
    num_shots: u32,
    memory: MemoryMap,
}

impl Program {
    /// Create an empty program that runs once.
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            num_shots: 1,
            memory: MemoryMap::new(),
        }
    }

    /// Append an instruction.
    pub fn inst(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// Append several instructions.
    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> &mut Self {
        self.instructions.extend(instructions);
        self
    }

    /// Declare a memory region and return a reference to its first slot.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        ty: MemoryType,
        size: usize,
    ) -> IrResult<MemoryRef> {
        let name = name.into();
        if self.declared_size(&name).is_some() {
            return Err(IrError::DuplicateRegion(name));
        }
        self.instructions.push(Instruction::Declare {
            name: name.clone(),
            ty,
            size,
        });
        Ok(MemoryRef::new(name, 0))
    }

    /// Size of a declared region.
    pub fn declared_size(&self, name: &str) -> Option<usize> {
        self.declarations()
            .find(|(n, _, _)| *n == name)
            .map(|(_, _, size)| size)
    }

    /// Iterate over declarations as `(name, type, size)`.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, MemoryType, usize)> {
        self.instructions.iter().filter_map(|inst| match inst {
            Instruction::Declare { name, ty, size } => Some((name.as_str(), *ty, *size)),
            _ => None,
        })
    }

    /// Write values into a declared region, replacing earlier values.
    pub fn write_memory(&mut self, region: impl Into<String>, values: Vec<f64>) -> IrResult<()> {
        let region = region.into();
        let declared = self
            .declared_size(&region)
            .ok_or_else(|| IrError::UndeclaredRegion(region.clone()))?;
        if declared != values.len() {
            return Err(IrError::RegionSizeMismatch {
                region,
                declared,
                got: values.len(),
            });
        }
        self.memory.insert(region, values);
        Ok(())
    }

    /// Values written so far.
    pub fn memory(&self) -> &MemoryMap {
        &self.memory
    }

    /// Run the whole program `shots` times.
    pub fn wrap_in_numshots_loop(&mut self, shots: u32) -> &mut Self {
        self.num_shots = shots;
        self
    }

    /// Number of repetitions.
    pub fn num_shots(&self) -> u32 {
        self.num_shots
    }

    /// All instructions in order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of gate instructions.
    pub fn gate_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|inst| matches!(inst, Instruction::Gate { .. }))
            .count()
    }

    /// Check if any gate reads its arguments from memory.
    pub fn is_parametric(&self) -> bool {
        self.instructions.iter().any(|inst| match inst {
            Instruction::Gate { params, .. } => params.iter().any(GateArg::is_symbolic),
            _ => false,
        })
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (decls, body): (Vec<_>, Vec<_>) = self
            .instructions
            .iter()
            .partition(|inst| matches!(inst, Instruction::Declare { .. }));
        for inst in decls.into_iter().chain(body) {
            writeln!(f, "{inst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quil_rendering_puts_declarations_first() {
        let mut prog = Program::new();
        prog.inst(Instruction::pragma("INITIAL_REWIRING", ["\"PARTIAL\""]));
        let theta = prog.declare("theta0", MemoryType::Real, 1).unwrap();
        prog.inst(Instruction::gate("RX", vec![GateArg::Memory(theta)], [0]));
        let ro = prog.declare("ro", MemoryType::Bit, 1).unwrap();
        prog.inst(Instruction::measure(0, ro));

        assert_eq!(
            prog.to_string(),
            "DECLARE theta0 REAL[1]\n\
             DECLARE ro BIT[1]\n\
             PRAGMA INITIAL_REWIRING \"PARTIAL\"\n\
             RX(theta0[0]) 0\n\
             MEASURE 0 ro[0]\n"
        );
        assert!(prog.is_parametric());
        assert_eq!(prog.gate_count(), 1);
    }

    #[test]
    fn test_write_memory_overwrites() {
        let mut prog = Program::new();
        prog.declare("theta0", MemoryType::Real, 1).unwrap();
        prog.write_memory("theta0", vec![0.1]).unwrap();
        prog.write_memory("theta0", vec![0.2]).unwrap();
        assert_eq!(prog.memory()["theta0"], vec![0.2]);

        let arg = GateArg::Memory(MemoryRef::new("theta0", 0));
        assert_eq!(arg.resolve(prog.memory()), Some(0.2));
    }

    #[test]
    fn test_write_memory_errors() {
        let mut prog = Program::new();
        assert!(matches!(
            prog.write_memory("missing", vec![1.0]),
            Err(IrError::UndeclaredRegion(_))
        ));
        prog.declare("theta0", MemoryType::Real, 1).unwrap();
        assert!(matches!(
            prog.write_memory("theta0", vec![1.0, 2.0]),
            Err(IrError::RegionSizeMismatch { declared: 1, got: 2, .. })
        ));
        assert!(matches!(
            prog.declare("theta0", MemoryType::Real, 1),
            Err(IrError::DuplicateRegion(_))
        ));
    }

    #[test]
    fn test_numshots() {
        let mut prog = Program::new();
        assert_eq!(prog.num_shots(), 1);
        prog.wrap_in_numshots_loop(500);
        assert_eq!(prog.num_shots(), 500);
    }
}
