//! Progress reporting from the concurrent completion path.
//!
//! The orchestrator emits [`ProgressEvent`]s as agents settle; any sink
//! implementing [`ProgressObserver`] can receive them. A UI layer is one
//! possible observer, not the only one. Events arrive in completion
//! order, which may differ from agent-index order; only the completion
//! count is monotonic.

use tracing::debug;

/// A progress notification. Carries no retained state.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Number of agents that have reached a terminal state so far.
    pub completed: usize,
    /// Total number of dispatched agents.
    pub total: usize,
    /// Optional status text (group count, per-agent detail, synthesis).
    pub message: Option<String>,
}

/// Sink for progress events, called from concurrently completing agents.
///
/// Implementations must serialize their own internal updates; the
/// orchestrator guarantees only that completion counts are monotonic,
/// not cross-event ordering. Notification is best-effort with no return
/// value.
pub trait ProgressObserver: Send + Sync {
    /// Receives one progress event.
    fn notify(&self, event: ProgressEvent);
}

/// Observer that discards all events (logging them at debug level).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn notify(&self, event: ProgressEvent) {
        debug!(
            completed = event.completed,
            total = event.total,
            "progress"
        );
    }
}

/// Adapter turning a closure into an observer.
pub struct FnObserver<F>(F)
where
    F: Fn(ProgressEvent) + Send + Sync;

impl<F> FnObserver<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    /// Wraps `f` as a [`ProgressObserver`].
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ProgressObserver for FnObserver<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn notify(&self, event: ProgressEvent) {
        (self.0)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_fn_observer_forwards_events() {
        let seen = Mutex::new(Vec::new());
        let observer = FnObserver::new(|event: ProgressEvent| {
            if let Ok(mut guard) = seen.lock() {
                guard.push((event.completed, event.total));
            }
        });
        observer.notify(ProgressEvent {
            completed: 1,
            total: 3,
            message: None,
        });
        observer.notify(ProgressEvent {
            completed: 2,
            total: 3,
            message: Some("detail".to_string()),
        });
        let guard = seen.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(*guard, vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn test_null_observer_accepts_events() {
        NullObserver.notify(ProgressEvent {
            completed: 0,
            total: 0,
            message: None,
        });
    }
}
