//! Configuration for CSC multiplication

/// How the column partitions of B are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// One worker, one partition, no distribution
    Sequential,
    /// Partitions processed concurrently on a rayon pool over shared memory
    Parallel,
    /// Ranks exchanging messages: coordinator broadcasts the transpose of A
    /// and gathers each rank's product slice
    Distributed,
}

impl Backend {
    /// Check if this backend splits the work across several workers
    pub fn is_multi_worker(&self) -> bool {
        !matches!(self, Backend::Sequential)
    }
}

/// System parameters for the worker pool
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Number of workers (ranks or rayon threads)
    pub n_workers: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            n_workers: num_cpus::get(), // Use all available cores
        }
    }
}

/// Configuration for a multiplication call
#[derive(Debug, Clone)]
pub struct SpgemmConfig {
    /// System parameters for the worker pool
    pub system_params: SystemParameters,

    /// Execution backend
    pub backend: Backend,
}

impl Default for SpgemmConfig {
    fn default() -> Self {
        Self {
            system_params: SystemParameters::default(),
            backend: Backend::Distributed,
        }
    }
}

impl SpgemmConfig {
    /// Single-worker configuration
    pub fn sequential() -> Self {
        Self {
            system_params: SystemParameters { n_workers: 1 },
            backend: Backend::Sequential,
        }
    }

    /// Configuration for a given backend and worker count
    pub fn with_workers(backend: Backend, n_workers: usize) -> Self {
        Self {
            system_params: SystemParameters { n_workers },
            backend,
        }
    }

    /// Number of workers that will actually run
    ///
    /// The sequential backend always runs exactly one.
    pub fn effective_workers(&self) -> usize {
        match self.backend {
            Backend::Sequential => 1,
            _ => self.system_params.n_workers,
        }
    }
}
