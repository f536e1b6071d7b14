//! Public handle over the processor, the monitor and their shared state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::cell::StateCell;
use super::config::ManagerConfig;
use super::event::Event;
use super::monitor::StateMonitor;
use super::processor::EventProcessor;
use crate::core::{State, StateHistory, StateTransition, TransitionTable};
use crate::error::FsmError;
use crate::notify::{self, StateObserver, TracingObserver};
use crate::work::WorkSimulator;

enum Lifecycle {
    Created {
        processor: EventProcessor,
        monitor: StateMonitor,
    },
    Running {
        processor: JoinHandle<()>,
        monitor: JoinHandle<()>,
    },
    Stopped,
}

impl Lifecycle {
    fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Running { .. } => "running",
            Self::Stopped => "stopped",
        }
    }
}

struct Inner {
    config: ManagerConfig,
    cell: Arc<StateCell>,
    events: mpsc::Sender<Event>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    lifecycle: Mutex<Lifecycle>,
}

/// Handle to a running state machine.
///
/// Cloning is cheap; every clone talks to the same processor. Events are
/// applied one at a time in the order they enter the queue, and each
/// `submit` waits for its own result.
///
/// # Example
///
/// ```rust
/// use statekeeper::{Manager, State};
/// use statekeeper::work::NoWork;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let manager = Manager::builder().work(NoWork).build().unwrap();
/// manager.start().unwrap();
///
/// manager.submit("start").await.unwrap();
/// manager.submit("complete").await.unwrap();
/// assert_eq!(manager.current_state(), State::Completed);
///
/// assert!(manager.submit("start").await.is_err());
///
/// manager.stop().await;
/// assert!(manager.submit("reset").await.is_err());
/// # });
/// ```
#[derive(Clone)]
pub struct Manager {
    inner: Arc<Inner>,
}

impl Manager {
    /// Create a manager with the default configuration, random work and a
    /// tracing observer. Starts in `Idle`; call [`Manager::start`] next.
    pub fn new() -> Self {
        let config = ManagerConfig::default();
        let work = Arc::new(config.random_work());
        Self::assemble(config, work, Box::new(TracingObserver))
    }

    /// Create a manager from a validated configuration.
    pub fn with_config(config: ManagerConfig) -> Result<Self, FsmError> {
        ManagerBuilder::new().config(config).build()
    }

    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    fn assemble(
        config: ManagerConfig,
        work: Arc<dyn WorkSimulator>,
        observer: Box<dyn StateObserver>,
    ) -> Self {
        let cell = Arc::new(StateCell::new(config.history_limit));
        let (events, queue) = mpsc::channel(config.queue_capacity);
        let (publisher, subscriber) = notify::channel();
        let shutdown = CancellationToken::new();

        let processor = EventProcessor::new(
            TransitionTable::new(work),
            Arc::clone(&cell),
            publisher,
            queue,
            shutdown.clone(),
        );
        let monitor = StateMonitor::new(subscriber, observer);

        debug!(?config, "Manager::assemble: created");
        Self {
            inner: Arc::new(Inner {
                config,
                cell,
                events,
                shutdown,
                tasks: TaskTracker::new(),
                lifecycle: Mutex::new(Lifecycle::Created { processor, monitor }),
            }),
        }
    }

    /// Launch the event processor and the state monitor.
    ///
    /// Fails with `AlreadyStarted` on a second call and with `ShuttingDown`
    /// once the manager has been stopped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) -> Result<(), FsmError> {
        let mut lifecycle = self.lifecycle();
        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Created { processor, monitor } => {
                let tasks = &self.inner.tasks;
                *lifecycle = Lifecycle::Running {
                    processor: tasks.spawn(processor.run()),
                    monitor: tasks.spawn(monitor.run()),
                };
                tasks.close();
                info!(
                    queue_capacity = self.inner.config.queue_capacity,
                    "Manager started"
                );
                Ok(())
            }
            running @ Lifecycle::Running { .. } => {
                *lifecycle = running;
                Err(FsmError::AlreadyStarted)
            }
            Lifecycle::Stopped => Err(FsmError::ShuttingDown),
        }
    }

    /// Submit an event and wait for its result.
    ///
    /// Returns `Ok(())` once the transition, including any simulated work,
    /// is committed; `InvalidTransition` if the event does not apply to the
    /// current state; `ShuttingDown` if shutdown was raised before or while
    /// waiting. Never waits for a queue slot after shutdown.
    pub async fn submit(&self, name: impl Into<String>) -> Result<(), FsmError> {
        let name = name.into();
        if self.inner.shutdown.is_cancelled() {
            return Err(FsmError::ShuttingDown);
        }
        if matches!(*self.lifecycle(), Lifecycle::Created { .. }) {
            return Err(FsmError::NotStarted);
        }

        let (event, reply) = Event::new(name);
        debug!(event_id = %event.id, event = %event.name, "submit: called");

        tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => return Err(FsmError::ShuttingDown),
            sent = self.inner.events.send(event) => {
                sent.map_err(|_| FsmError::ShuttingDown)?;
            }
        }

        tokio::select! {
            biased;
            response = reply => response.unwrap_or(Err(FsmError::ShuttingDown)),
            _ = self.inner.shutdown.cancelled() => Err(FsmError::ShuttingDown),
        }
    }

    /// Snapshot of the current state. Never waits on the processor.
    pub fn current_state(&self) -> State {
        self.inner.cell.state()
    }

    /// Number of transitions committed so far.
    pub fn transition_count(&self) -> u64 {
        self.inner.cell.seq()
    }

    /// Recent transitions, oldest first, bounded by `history_limit`.
    pub fn history(&self) -> Vec<StateTransition> {
        self.inner.cell.history().transitions()
    }

    /// Full history snapshot, including its limit.
    pub fn history_snapshot(&self) -> StateHistory {
        self.inner.cell.history()
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle(), Lifecycle::Running { .. })
    }

    /// Shut down and wait for both background tasks.
    ///
    /// Raises the shutdown signal, then joins the processor and the
    /// monitor in that order. The processor answers anything still queued
    /// with `ShuttingDown`; its exit closes the notification channel, after
    /// which the monitor delivers the last change and exits. A task still
    /// running after `shutdown_timeout` is aborted.
    ///
    /// Safe to call from several clones at once: every call returns only
    /// after both tasks have exited.
    pub async fn stop(&self) {
        self.inner.shutdown.cancel();

        let previous = std::mem::replace(&mut *self.lifecycle(), Lifecycle::Stopped);
        debug!(previous = previous.name(), "stop: called");

        match previous {
            Lifecycle::Running { processor, monitor } => {
                let timeout = self.inner.config.shutdown_timeout();
                join_within("processor", processor, timeout).await;
                join_within("monitor", monitor, timeout).await;
            }
            Lifecycle::Created { .. } => {
                self.inner.tasks.close();
            }
            Lifecycle::Stopped => {}
        }
        self.inner.tasks.wait().await;

        info!(
            transitions = self.transition_count(),
            state = %self.current_state(),
            "Manager stopped"
        );
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.inner
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("state", &self.current_state())
            .field("transitions", &self.transition_count())
            .field("lifecycle", &self.lifecycle().name())
            .finish()
    }
}

async fn join_within(task: &'static str, mut handle: JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(())) => debug!(task, "join_within: task exited"),
        Ok(Err(e)) => warn!(task, error = %e, "join_within: task failed"),
        Err(_) => {
            warn!(task, ?timeout, "join_within: task did not exit in time, aborting");
            handle.abort();
        }
    }
}

/// Builder for [`Manager`] with injectable collaborators.
pub struct ManagerBuilder {
    config: ManagerConfig,
    work: Option<Arc<dyn WorkSimulator>>,
    observer: Option<Box<dyn StateObserver>>,
}

impl ManagerBuilder {
    pub fn new() -> Self {
        Self {
            config: ManagerConfig::default(),
            work: None,
            observer: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Use a custom work simulator instead of the configured random range.
    pub fn work<W: WorkSimulator + 'static>(mut self, work: W) -> Self {
        self.work = Some(Arc::new(work));
        self
    }

    /// Send state changes to `observer` instead of the tracing log.
    pub fn observer<O: StateObserver>(mut self, observer: O) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Build the manager. Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Manager, FsmError> {
        self.config.validate()?;

        let work: Arc<dyn WorkSimulator> = match self.work {
            Some(work) => work,
            None => Arc::new(self.config.random_work()),
        };
        let observer: Box<dyn StateObserver> = match self.observer {
            Some(observer) => observer,
            None => Box::new(TracingObserver),
        };

        Ok(Manager::assemble(self.config, work, observer))
    }
}

impl Default for ManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::StateChange;
    use crate::work::{FixedWork, NoWork};

    #[tokio::test]
    async fn submit_before_start_is_a_usage_error() {
        let manager = Manager::builder().work(NoWork).build().unwrap();

        assert_eq!(manager.submit("start").await, Err(FsmError::NotStarted));
        assert_eq!(manager.current_state(), State::Idle);
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let manager = Manager::builder().work(NoWork).build().unwrap();

        manager.start().unwrap();
        assert_eq!(manager.start(), Err(FsmError::AlreadyStarted));
        assert!(manager.is_running());

        manager.stop().await;
        assert!(!manager.is_running());
        assert_eq!(manager.start(), Err(FsmError::ShuttingDown));
    }

    #[tokio::test]
    async fn stop_without_start_makes_manager_inert() {
        let manager = Manager::builder().work(NoWork).build().unwrap();

        manager.stop().await;

        assert_eq!(manager.submit("start").await, Err(FsmError::ShuttingDown));
        assert_eq!(manager.start(), Err(FsmError::ShuttingDown));
    }

    #[tokio::test]
    async fn stop_twice_is_harmless() {
        let manager = Manager::builder().work(NoWork).build().unwrap();
        manager.start().unwrap();

        manager.stop().await;
        manager.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn overlapping_stops_both_wait_for_the_processor() {
        let manager = Manager::builder()
            .work(FixedWork(Duration::from_millis(300)))
            .build()
            .unwrap();
        manager.start().unwrap();
        manager.submit("start").await.unwrap();

        let busy = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit("complete").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        manager.stop().await;
        // The in-flight `complete` has been committed by the time either
        // stop returns; nothing changes afterwards.
        let after_stop = manager.current_state();
        assert_eq!(after_stop, State::Completed);
        assert_eq!(manager.transition_count(), 2);

        first.await.unwrap();
        let _ = busy.await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(manager.current_state(), after_stop);
        assert!(!manager.is_running());
    }

    #[test]
    fn huge_shutdown_timeout_saturates() {
        let builder = Manager::builder().shutdown_timeout(Duration::MAX);
        assert_eq!(builder.config.shutdown_timeout_ms, u64::MAX);

        let builder = Manager::builder().shutdown_timeout(Duration::from_millis(250));
        assert_eq!(builder.config.shutdown_timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_by_builder() {
        let result = Manager::builder().queue_capacity(0).build();
        assert!(matches!(result, Err(FsmError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn clones_share_one_machine() {
        let manager = Manager::builder().work(NoWork).build().unwrap();
        let other = manager.clone();
        manager.start().unwrap();

        other.submit("start").await.unwrap();
        assert_eq!(manager.current_state(), State::Processing);
        assert_eq!(manager.transition_count(), 1);

        other.stop().await;
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn observer_sees_final_state_after_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel::<StateChange>();
        let manager = Manager::builder()
            .work(FixedWork(Duration::from_millis(5)))
            .observer(tx)
            .build()
            .unwrap();
        manager.start().unwrap();

        for event in ["start", "complete", "reset", "start"] {
            manager.submit(event).await.unwrap();
        }
        manager.stop().await;

        let mut last = None;
        while let Some(change) = rx.recv().await {
            last = Some(change);
        }
        let last = last.unwrap();
        assert_eq!(last.seq, 4);
        assert_eq!(last.to, State::Processing);
    }

    #[tokio::test]
    async fn history_limit_bounds_history() {
        let manager = Manager::builder()
            .work(NoWork)
            .history_limit(2)
            .build()
            .unwrap();
        manager.start().unwrap();

        for event in ["start", "complete", "reset"] {
            manager.submit(event).await.unwrap();
        }

        let history = manager.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].event, "complete");
        assert_eq!(history[1].event, "reset");
        assert_eq!(manager.history_snapshot().limit(), 2);
        assert_eq!(manager.transition_count(), 3);

        manager.stop().await;
    }

    #[test]
    fn debug_shows_lifecycle() {
        let manager = Manager::builder().work(NoWork).build().unwrap();
        let rendered = format!("{manager:?}");
        assert!(rendered.contains("created"));
        assert!(rendered.contains("Idle"));
    }
}
