//! Parallel evaluation settings
//!
//! Vertices are split into contiguous id blocks which are evaluated
//! independently. Blocks run on a dedicated thread pool when a thread count
//! is configured, otherwise on the global rayon pool.

use meshfair_core::{Error, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

/// Thread and block configuration for the per-vertex fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Number of worker threads (None = global rayon pool)
    pub num_threads: Option<usize>,
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
    /// Minimum number of vertices per block
    pub min_block_size: usize,
    /// Target number of blocks per worker thread
    pub blocks_per_thread: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            enabled: true,
            min_block_size: 256,
            blocks_per_thread: 4,
        }
    }
}

impl ParallelConfig {
    /// Single-threaded evaluation
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set minimum block size
    pub fn with_min_block_size(mut self, min_block_size: usize) -> Self {
        self.min_block_size = min_block_size;
        self
    }

    /// Number of vertices per block for `vertex_count` vertices on `threads` workers
    pub fn block_size(&self, vertex_count: usize, threads: usize) -> usize {
        if !self.enabled {
            return vertex_count.max(1);
        }
        let blocks = (threads * self.blocks_per_thread).max(1);
        vertex_count.div_ceil(blocks).max(self.min_block_size).max(1)
    }

    /// Build a dedicated pool if a thread count is configured
    pub fn build_pool(&self) -> Result<Option<ThreadPool>> {
        let Some(num_threads) = self.num_threads.filter(|_| self.enabled) else {
            return Ok(None);
        };
        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("meshfair-smooth-{}", index))
            .build()
            .map(Some)
            .map_err(|e| Error::Algorithm(format!("Failed to create thread pool: {}", e)))
    }
}
