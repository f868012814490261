use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Block the current thread for `ms` milliseconds.
///
/// Only used to pace interactive playback and tests; the export path never sleeps.
pub fn wait(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}

/// Shared cancellation flag for a render or export session.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
