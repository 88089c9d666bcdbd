//! Parametric compilation cache.
//!
//! Maps a structural circuit hash to the artifact compiled for it. Each hash
//! is compiled at most once for the lifetime of the cache: the first caller
//! to miss compiles and publishes, concurrent callers for the same hash wait
//! on the same slot. A failed compilation leaves the slot empty so a later
//! call can retry. Entries are never evicted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use paraq_hal::{CompiledArtifact, QuantumMachine};
use paraq_ir::Program;

use crate::error::DeviceResult;

type Slot = Arc<OnceCell<Arc<CompiledArtifact>>>;

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered without compiling.
    pub hits: u64,
    /// Lookups that ran the compiler (including failed compilations).
    pub misses: u64,
    /// Compiled artifacts held.
    pub entries: usize,
}

/// Circuit hash → compiled artifact.
#[derive(Default)]
pub struct CompilationCache {
    slots: Mutex<FxHashMap<u64, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CompilationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, hash: u64) -> Slot {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slots.entry(hash).or_default().clone()
    }

    /// Fetch the artifact for `hash`, compiling `program` on `machine` if
    /// this hash has never compiled successfully.
    #[instrument(skip(self, machine, program))]
    pub async fn get_or_compile(
        &self,
        hash: u64,
        machine: &dyn QuantumMachine,
        program: &Program,
    ) -> DeviceResult<Arc<CompiledArtifact>> {
        let slot = self.slot(hash);
        let compiled_here = AtomicBool::new(false);
        let result = slot
            .get_or_try_init(|| async {
                compiled_here.store(true, Ordering::Relaxed);
                debug!("Cache miss, compiling");
                machine.compile(program).await.map(Arc::new)
            })
            .await;

        if compiled_here.load(Ordering::Relaxed) {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit");
        }
        Ok(result?.clone())
    }

    /// The artifact for `hash`, if compiled.
    pub fn get(&self, hash: u64) -> Option<Arc<CompiledArtifact>> {
        let slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slots.get(&hash).and_then(|slot| slot.get().cloned())
    }

    /// Whether `hash` has a compiled artifact.
    pub fn contains(&self, hash: u64) -> bool {
        self.get(hash).is_some()
    }

    /// Number of compiled artifacts.
    pub fn len(&self) -> usize {
        let slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }

    /// Check if nothing has been compiled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl std::fmt::Debug for CompilationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationCache")
            .field("stats", &self.stats())
            .finish()
    }
}
