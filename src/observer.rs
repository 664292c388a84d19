//! Diagnostic observers for dependency injection traceability.
//!
//! Observers are notified around every resolution performed by the root
//! provider or a scope. [`TracingObserver`] forwards the events to `tracing`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Observer trait for dependency injection resolution events.
///
/// Calls are made synchronously during resolution; keep implementations
/// lightweight.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{DiError, DiObserver, Key, ServiceCollection, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl DiObserver for Counter {
///     fn resolving(&self, _key: &Key) {}
///     fn resolved(&self, _key: &Key, _duration: Duration) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
///     fn resolution_failed(&self, _key: &Key, _error: &DiError) {}
/// }
///
/// let counter = Arc::new(Counter::default());
/// let mut services = ServiceCollection::new();
/// services.add_singleton(1u8);
/// services.add_observer(counter.clone());
///
/// let provider = services.build();
/// provider.get_required::<u8>();
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a service is resolved.
    fn resolving(&self, key: &Key);

    /// Called after a service resolved successfully.
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when resolution fails.
    fn resolution_failed(&self, key: &Key, error: &DiError);
}

/// Observer that emits `tracing` events for each resolution.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(service = key.display_name(), index = ?key.index(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(
            service = key.display_name(),
            index = ?key.index(),
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn resolution_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(service = key.display_name(), %error, "resolution failed");
    }
}

/// The observers attached to one provider.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    /// Runs `resolve`, notifying every observer around it.
    pub(crate) fn observe<T>(&self, key: &Key, resolve: impl FnOnce() -> DiResult<T>) -> DiResult<T> {
        if !self.has_observers() {
            return resolve();
        }

        for observer in &self.observers {
            observer.resolving(key);
        }
        let start = Instant::now();
        let result = resolve();
        let elapsed = start.elapsed();
        match &result {
            Ok(_) => {
                for observer in &self.observers {
                    observer.resolved(key, elapsed);
                }
            }
            Err(e) => {
                for observer in &self.observers {
                    observer.resolution_failed(key, e);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl DiObserver for Recording {
        fn resolving(&self, key: &Key) {
            self.events.lock().push(format!("resolving {}", key.display_name()));
        }

        fn resolved(&self, key: &Key, _duration: Duration) {
            self.events.lock().push(format!("resolved {}", key.display_name()));
        }

        fn resolution_failed(&self, key: &Key, _error: &DiError) {
            self.events.lock().push(format!("failed {}", key.display_name()));
        }
    }

    #[test]
    fn observe_reports_success_and_failure() {
        let recording = Arc::new(Recording::default());
        let mut observers = Observers::new();
        assert!(!observers.has_observers());
        observers.add(recording.clone());

        let key = key_of_type::<u32>();
        let ok = observers.observe(&key, || Ok(1));
        assert_eq!(ok.unwrap(), 1);
        let err: DiResult<()> = observers.observe(&key, || Err(DiError::NotFound("u32")));
        assert!(err.is_err());

        assert_eq!(
            *recording.events.lock(),
            vec!["resolving u32", "resolved u32", "resolving u32", "failed u32"]
        );
    }
}
