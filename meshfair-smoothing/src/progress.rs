//! Progress reporting at iteration boundaries

use std::sync::Arc;

type Callback = dyn Fn(usize, usize, &str) + Send + Sync;

/// Observer notified after every completed smoothing iteration
///
/// Arguments are the number of completed iterations, the total number of
/// iterations and a short stage label. Clones share the same callback.
#[derive(Clone)]
pub struct Progress {
    callback: Arc<Callback>,
}

impl Progress {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    #[inline]
    pub fn report(&self, completed: usize, total: usize, stage: &str) {
        (self.callback)(completed, total, stage)
    }

    /// Observer that ignores every update
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
