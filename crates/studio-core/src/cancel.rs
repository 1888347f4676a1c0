//! Cancellation of in-flight background loads

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag handed to a background job
#[derive(Debug, Clone)]
pub struct LoadToken {
    target: String,
    cancelled: Arc<AtomicBool>,
}

impl LoadToken {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn same_as(&self, other: &LoadToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// Tracks one live load per target
///
/// Starting a load for a target cancels the previous one; results must be
/// checked with [`LoadTracker::finish`] before they touch the scene.
#[derive(Debug, Default)]
pub struct LoadTracker {
    active: HashMap<String, LoadToken>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, target: impl Into<String>) -> LoadToken {
        let target = target.into();
        let token = LoadToken {
            target: target.clone(),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        if let Some(previous) = self.active.insert(target, token.clone()) {
            tracing::debug!("Superseding load for '{}'", previous.target);
            previous.cancel();
        }
        token
    }

    /// Retire a completed load; `false` means its result must be discarded
    pub fn finish(&mut self, token: &LoadToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        match self.active.get(&token.target) {
            Some(current) if current.same_as(token) => {
                self.active.remove(&token.target);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self, target: &str) {
        if let Some(token) = self.active.remove(target) {
            token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, token) in self.active.drain() {
            token.cancel();
        }
    }

    pub fn pending(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_load_supersedes_previous() {
        let mut tracker = LoadTracker::new();
        let first = tracker.begin("base");
        let second = tracker.begin("base");
        assert!(first.is_cancelled());
        assert!(!tracker.finish(&first));
        assert!(tracker.finish(&second));
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_cancel_all() {
        let mut tracker = LoadTracker::new();
        let a = tracker.begin("a");
        let b = tracker.begin("b");
        tracker.cancel_all();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(!tracker.finish(&a));
    }

    #[test]
    fn test_independent_targets() {
        let mut tracker = LoadTracker::new();
        let a = tracker.begin("a");
        let _b = tracker.begin("b");
        assert!(tracker.finish(&a));
        assert_eq!(tracker.pending(), 1);
    }
}
