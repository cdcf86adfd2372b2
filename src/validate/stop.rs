//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag asking a run to stop at its next checkpoint
///
/// Checked between visitation reports and between relationship checks,
/// never inside a chunk merge.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Creates a lowered flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once raised
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = StopFlag::new();
        let other = flag.clone();
        assert!(!other.is_stopped());
        flag.stop();
        assert!(other.is_stopped());
    }
}
