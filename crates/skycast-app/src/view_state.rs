//! Per-screen fetch lifecycle.
//!
//! [`Fetcher`] wraps one async operation in `loading -> {ready | error}`
//! with user-initiated retry. A `run` issued while a previous one is still
//! in flight supersedes it: the old request is cancelled and a late
//! completion can never overwrite a newer one's result
//! (last-issued-wins, tracked by a generation counter).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use skycast_core::AppError;

/// Screen-level view of an async operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Error(String),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }
}

type FetchOp<T> =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<T, AppError>> + Send>> + Send + Sync>;

struct Inner<T> {
    state: ViewState<T>,
    /// Last successful value, kept while a refresh is in flight so the
    /// screen can show "updating" instead of blanking on refetch.
    last: Option<T>,
    op: Option<FetchOp<T>>,
    generation: u64,
    token: CancellationToken,
}

/// Generic fetch state machine; one instance per screen.
pub struct Fetcher<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Fetcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Fetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Fetcher<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: ViewState::Idle,
                last: None,
                op: None,
                generation: 0,
                token: CancellationToken::new(),
            })),
        }
    }
}

impl<T: Clone + Send + 'static> Fetcher<T> {
    /// Issue the operation, superseding any outstanding one.
    ///
    /// The closure is retained so [`retry`](Self::retry) can re-issue the
    /// exact same request later.
    pub fn run<F, Fut>(&self, op: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let op: FetchOp<T> = Arc::new(move || {
            let fut: Pin<Box<dyn Future<Output = Result<T, AppError>> + Send>> = Box::pin(op());
            fut
        });
        self.start(op);
    }

    /// Re-issue the last operation with its original parameters.
    /// Meaningful from both `Error` and `Ready`; a no-op before any `run`.
    pub fn retry(&self) {
        let op = self.inner.lock().op.clone();
        match op {
            Some(op) => self.start(op),
            None => tracing::debug!("Retry requested before any operation ran"),
        }
    }

    fn start(&self, op: FetchOp<T>) {
        let (generation, token, fut) = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.token.cancel();
            inner.token = CancellationToken::new();
            inner.op = Some(op.clone());
            inner.state = ViewState::Loading;
            (inner.generation, inner.token.clone(), op())
        };

        let shared = self.inner.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = fut => result,
            };

            let mut inner = shared.lock();
            if inner.generation != generation {
                // Superseded while completing; drop the stale result
                return;
            }
            match result {
                Ok(value) => {
                    inner.last = Some(value.clone());
                    inner.state = ViewState::Ready(value);
                }
                Err(e) => {
                    tracing::warn!("Fetch failed: {}", e);
                    inner.state = ViewState::Error(e.user_message().to_string());
                }
            }
        });
    }

    pub fn state(&self) -> ViewState<T> {
        self.inner.lock().state.clone()
    }

    /// Last successful value, if any; survives refreshes and errors.
    pub fn latest_data(&self) -> Option<T> {
        self.inner.lock().last.clone()
    }

    /// Apply an in-place change to the `Ready` value (used for confirmed
    /// mutations such as favorite removal). No-op in any other state.
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if let ViewState::Ready(value) = &mut inner.state {
            f(value);
            inner.last = Some(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn settled<T: Clone + Send + 'static>(fetcher: &Fetcher<T>) -> ViewState<T> {
        for _ in 0..200 {
            let state = fetcher.state();
            if !state.is_loading() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("fetcher did not settle in time");
    }

    #[tokio::test]
    async fn run_transitions_loading_to_ready() {
        let fetcher: Fetcher<String> = Fetcher::new();
        assert_eq!(fetcher.state(), ViewState::Idle);

        fetcher.run(|| async { Ok("data".to_string()) });
        assert_eq!(settled(&fetcher).await, ViewState::Ready("data".to_string()));
        assert_eq!(fetcher.latest_data().as_deref(), Some("data"));
    }

    #[tokio::test]
    async fn run_transitions_loading_to_error() {
        let fetcher: Fetcher<String> = Fetcher::new();
        fetcher.run(|| async { Err(skycast_core::AppError::Service("nope".into())) });

        match settled(&fetcher).await {
            ViewState::Error(message) => assert!(!message.is_empty()),
            other => panic!("expected error state, got {:?}", other),
        }
        assert!(fetcher.latest_data().is_none());
    }

    #[tokio::test]
    async fn newer_run_supersedes_slower_one() {
        let fetcher: Fetcher<&'static str> = Fetcher::new();

        // A issued first but resolves last
        fetcher.run(|| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok("A")
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.run(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok("B")
        });

        assert_eq!(settled(&fetcher).await, ViewState::Ready("B"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fetcher.state(), ViewState::Ready("B"), "stale A must stay dropped");
    }

    #[tokio::test]
    async fn retry_reissues_the_same_operation() {
        let fetcher: Fetcher<usize> = Fetcher::new();
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = attempts.clone();
        fetcher.run(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(skycast_core::AppError::Service("first attempt fails".into()))
                } else {
                    Ok(n)
                }
            }
        });

        assert!(settled(&fetcher).await.is_error());

        fetcher.retry();
        assert_eq!(settled(&fetcher).await, ViewState::Ready(1));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn latest_data_survives_refresh_and_error() {
        let fetcher: Fetcher<&'static str> = Fetcher::new();

        fetcher.run(|| async { Ok("first") });
        assert!(settled(&fetcher).await.is_ready());

        // Refresh in flight: loading, but the previous value is still there
        fetcher.run(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err(skycast_core::AppError::Service("refresh failed".into()))
        });
        assert!(fetcher.state().is_loading());
        assert_eq!(fetcher.latest_data(), Some("first"));

        assert!(settled(&fetcher).await.is_error());
        assert_eq!(fetcher.latest_data(), Some("first"));
    }

    #[tokio::test]
    async fn retry_before_any_run_is_a_noop() {
        let fetcher: Fetcher<String> = Fetcher::new();
        fetcher.retry();
        assert_eq!(fetcher.state(), ViewState::Idle);
    }

    #[tokio::test]
    async fn modify_updates_ready_value() {
        let fetcher: Fetcher<Vec<u32>> = Fetcher::new();
        fetcher.run(|| async { Ok(vec![1, 2, 3]) });
        assert!(settled(&fetcher).await.is_ready());

        fetcher.modify(|v| v.retain(|n| *n != 2));

        assert_eq!(fetcher.state(), ViewState::Ready(vec![1, 3]));
        assert_eq!(fetcher.latest_data(), Some(vec![1, 3]));
    }
}
