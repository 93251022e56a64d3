//! CPU client and parallelism configuration

use super::device::CpuDevice;
use crate::error::{Error, Result};
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// How blocks of a grid are spread over host threads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Size of a dedicated thread pool; `None` uses rayon's global pool
    pub num_threads: Option<usize>,
    /// Minimum number of block rows handed to one rayon task
    pub min_rows_per_task: usize,
}

impl Default for ParallelismConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            min_rows_per_task: 1,
        }
    }
}

/// CPU client for operation dispatch
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    parallelism: ParallelismConfig,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl CpuClient {
    /// Create a new CPU client using the global thread pool
    pub fn new(device: CpuDevice) -> Self {
        Self {
            device,
            parallelism: ParallelismConfig::default(),
            #[cfg(feature = "rayon")]
            pool: None,
        }
    }

    /// Create a CPU client with an explicit parallelism configuration
    pub fn with_parallelism(device: CpuDevice, config: ParallelismConfig) -> Result<Self> {
        if config.num_threads == Some(0) {
            return Err(Error::invalid_argument(
                "num_threads",
                "thread pool must have at least one thread",
            ));
        }

        #[cfg(feature = "rayon")]
        let pool = match config.num_threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("fusednorm-{i}"))
                    .build()
                    .map_err(|e| Error::Backend(format!("failed to build thread pool: {e}")))?;
                log::debug!("built dedicated pool with {} threads", n);
                Some(Arc::new(pool))
            }
            None => None,
        };

        #[cfg(not(feature = "rayon"))]
        if let Some(n) = config.num_threads {
            log::warn!(
                "num_threads = {} ignored: built without the `rayon` feature, blocks run sequentially",
                n
            );
        }

        Ok(Self {
            device,
            parallelism: config,
            #[cfg(feature = "rayon")]
            pool,
        })
    }

    /// Device this client launches on
    pub fn device(&self) -> &CpuDevice {
        &self.device
    }

    /// Active parallelism configuration
    pub fn parallelism(&self) -> &ParallelismConfig {
        &self.parallelism
    }

    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn rayon_min_len(&self) -> usize {
        self.parallelism.min_rows_per_task.max(1)
    }

    /// Run `f` inside this client's thread pool
    #[cfg(feature = "rayon")]
    pub(crate) fn install_parallelism<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Default for CpuClient {
    fn default() -> Self {
        Self::new(CpuDevice::new())
    }
}
