//! Loads the job collection once per session and tracks loading/error state.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api_client::JobSource;
use crate::models::job::Job;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded(Arc<[Job]>),
    Failed { message: String, retryable: bool },
}

impl LoadState {
    pub fn jobs(&self) -> Option<Arc<[Job]>> {
        match self {
            LoadState::Loaded(jobs) => Some(jobs.clone()),
            _ => None,
        }
    }
}

struct Inner {
    state: LoadState,
    in_flight: Option<u64>,
    next_ticket: u64,
}

/// Shared handle to the session's job collection. Clones observe the same state.
#[derive(Clone)]
pub struct JobFeed {
    inner: Arc<Mutex<Inner>>,
}

impl Default for JobFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl JobFeed {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: LoadState::Idle,
                in_flight: None,
                next_ticket: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn state(&self) -> LoadState {
        self.lock().state.clone()
    }

    pub fn jobs(&self) -> Option<Arc<[Job]>> {
        self.lock().state.jobs()
    }

    /// Claims the right to fetch. `None` when already loaded or a fetch is in flight.
    fn begin(&self, force: bool) -> Option<u64> {
        let mut inner = self.lock();
        let busy = match inner.state {
            LoadState::Loading => true,
            LoadState::Loaded(_) => !force,
            LoadState::Idle | LoadState::Failed { .. } => false,
        };
        if busy {
            return None;
        }
        let ticket = inner.next_ticket;
        inner.next_ticket += 1;
        inner.in_flight = Some(ticket);
        inner.state = LoadState::Loading;
        Some(ticket)
    }

    fn finish(&self, ticket: u64, state: LoadState) {
        let mut inner = self.lock();
        if inner.in_flight == Some(ticket) {
            inner.in_flight = None;
            inner.state = state;
        }
    }

    fn cancel(&self, ticket: u64) {
        let mut inner = self.lock();
        if inner.in_flight == Some(ticket) {
            debug!("Job fetch {ticket} cancelled");
            inner.in_flight = None;
            inner.state = LoadState::Idle;
        }
    }

    async fn run(&self, ticket: u64, source: &dyn JobSource) -> LoadState {
        // Resets `Loading` if this future is dropped before the fetch completes.
        let _in_flight = InFlight { feed: self, ticket };
        let next = match source.fetch_jobs().await {
            Ok(jobs) => {
                info!("Job feed loaded {} jobs", jobs.len());
                LoadState::Loaded(jobs.into())
            }
            Err(e) => {
                warn!("Job feed failed: {e}");
                LoadState::Failed {
                    message: e.user_message(),
                    retryable: e.is_retryable(),
                }
            }
        };
        self.finish(ticket, next);
        self.state()
    }

    /// Fetches unless the collection is already loaded or being loaded.
    pub async fn load(&self, source: &dyn JobSource) -> LoadState {
        match self.begin(false) {
            Some(ticket) => self.run(ticket, source).await,
            None => self.state(),
        }
    }

    /// The "try again" action: fetches even after a successful load.
    pub async fn reload(&self, source: &dyn JobSource) -> LoadState {
        match self.begin(true) {
            Some(ticket) => self.run(ticket, source).await,
            None => self.state(),
        }
    }

    /// Starts a background fetch tied to the returned guard. Dropping the guard
    /// aborts the fetch; an aborted fetch never writes its result.
    pub fn spawn_load(&self, source: Arc<dyn JobSource>) -> FetchGuard {
        let Some(ticket) = self.begin(false) else {
            return FetchGuard {
                feed: self.clone(),
                ticket: None,
                handle: None,
            };
        };
        let feed = self.clone();
        let handle = tokio::spawn(async move {
            feed.run(ticket, source.as_ref()).await;
        });
        FetchGuard {
            feed: self.clone(),
            ticket: Some(ticket),
            handle: Some(handle),
        }
    }
}

/// Cancels `ticket` on drop; a no-op once `finish` has cleared it.
struct InFlight<'a> {
    feed: &'a JobFeed,
    ticket: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.feed.cancel(self.ticket);
    }
}

pub struct FetchGuard {
    feed: JobFeed,
    ticket: Option<u64>,
    handle: Option<JoinHandle<()>>,
}

impl FetchGuard {
    /// Waits for the background fetch, if any, and returns the resulting state.
    pub async fn wait(mut self) -> LoadState {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Job fetch task ended abnormally: {e}");
            }
        }
        self.feed.state()
    }

    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if let Some(ticket) = self.ticket.take() {
            self.feed.cancel(ticket);
        }
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ClientError, Result};
    use crate::models::job::JobType;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn sample_jobs() -> Vec<Job> {
        vec![Job {
            id: "1".to_string(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            salary: String::new(),
            job_type: JobType::FullTime,
            remote: false,
            skills: vec!["Go".to_string()],
            description: String::new(),
            responsibilities: vec![],
            requirements: vec![],
            posted_date: None,
        }]
    }

    /// Serves `sample_jobs` after `delay`, failing the first `failures` calls.
    struct FixtureSource {
        calls: AtomicUsize,
        failures: usize,
        delay: Duration,
    }

    impl FixtureSource {
        fn new(failures: usize, delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobSource for FixtureSource {
        async fn fetch_jobs(&self) -> Result<Vec<Job>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if n < self.failures {
                return Err(ClientError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(sample_jobs())
        }
    }

    #[tokio::test]
    async fn test_load_fetches_once_per_session() {
        let feed = JobFeed::new();
        let source = FixtureSource::new(0, Duration::ZERO);

        let first = feed.load(&source).await;
        let second = feed.load(&source).await;

        assert_eq!(first.jobs().unwrap().len(), 1);
        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_state_and_reload_recovers() {
        let feed = JobFeed::new();
        let source = FixtureSource::new(1, Duration::ZERO);

        match feed.load(&source).await {
            LoadState::Failed { message, retryable } => {
                assert!(retryable);
                assert!(message.contains("try again"));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let recovered = feed.reload(&source).await;
        assert!(matches!(recovered, LoadState::Loaded(_)));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_overlapping_fetches() {
        let feed = JobFeed::new();
        let source: Arc<FixtureSource> = Arc::new(FixtureSource::new(0, Duration::from_secs(1)));

        let guard = feed.spawn_load(source.clone());
        tokio::task::yield_now().await;
        assert_eq!(feed.state(), LoadState::Loading);

        // A second trigger while loading reports the current state without fetching.
        assert_eq!(feed.load(source.as_ref()).await, LoadState::Loading);

        let done = guard.wait().await;
        assert!(matches!(done, LoadState::Loaded(_)));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_guard_cancels_fetch() {
        let feed = JobFeed::new();
        let source: Arc<FixtureSource> = Arc::new(FixtureSource::new(0, Duration::from_secs(5)));

        let guard = feed.spawn_load(source.clone());
        tokio::task::yield_now().await;
        drop(guard);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(feed.state(), LoadState::Idle);
        assert!(feed.jobs().is_none());

        // The feed can be loaded again afterwards.
        let state = feed.load(source.as_ref()).await;
        assert!(matches!(state, LoadState::Loaded(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_load_does_not_block_retry() {
        let feed = JobFeed::new();
        let source = FixtureSource::new(0, Duration::from_secs(5));

        let abandoned = tokio::time::timeout(Duration::from_secs(1), feed.load(&source)).await;
        assert!(abandoned.is_err());
        assert_eq!(feed.state(), LoadState::Idle);

        let retried = feed.reload(&source).await;
        assert!(matches!(retried, LoadState::Loaded(_)));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_spawn_after_load_is_noop() {
        let feed = JobFeed::new();
        let source: Arc<FixtureSource> = Arc::new(FixtureSource::new(0, Duration::ZERO));
        feed.load(source.as_ref()).await;

        let guard = feed.spawn_load(source.clone());
        assert!(matches!(guard.wait().await, LoadState::Loaded(_)));
        assert_eq!(source.calls(), 1);
    }
}
