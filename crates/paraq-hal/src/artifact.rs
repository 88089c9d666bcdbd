//! Compiled artifacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use paraq_ir::Program;

/// The executable form produced by a machine's compiler.
///
/// Opaque to the device core apart from its human-readable rendering.
/// Parameter memory references survive compilation, so one artifact serves
/// every value binding of the circuit shape it was compiled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledArtifact {
    program: Program,
    target: String,
    compiled_at: DateTime<Utc>,
}

impl CompiledArtifact {
    /// Wrap a compiled program.
    pub fn new(program: Program, target: impl Into<String>) -> Self {
        Self {
            program,
            target: target.into(),
            compiled_at: Utc::now(),
        }
    }

    /// The compiled program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Name of the machine this was compiled for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// When compilation finished.
    pub fn compiled_at(&self) -> DateTime<Utc> {
        self.compiled_at
    }
}

impl fmt::Display for CompiledArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)
    }
}
