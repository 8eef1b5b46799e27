//! Configuration options for simulation runs.

use serde::{Deserialize, Serialize};

/// Configuration for the Monte Carlo equity engine.
///
/// The defaults (entropy-seeded RNG, global thread pool) are right for
/// production use; tests and benchmarks pin a seed to make runs reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Random seed for reproducibility.
    ///
    /// If set, every simulation batch derives its RNG from this seed and the
    /// batch index, so a run produces identical tallies regardless of thread
    /// count. If `None`, each batch seeds itself from entropy.
    pub seed: Option<u64>,

    /// Number of threads to use for parallel simulation.
    ///
    /// Set to 0 or 1 for single-threaded execution. Set to `None` to use the
    /// global rayon pool; any other value builds a dedicated pool of that
    /// size for the run.
    pub num_threads: Option<usize>,
}

impl SimConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Whether the configuration forces single-threaded execution.
    pub(crate) fn single_threaded(&self) -> bool {
        matches!(self.num_threads, Some(0) | Some(1))
    }
}
