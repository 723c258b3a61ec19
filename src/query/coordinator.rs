use super::state::{Completion, QueryState, RequestSequencer};
use crate::client::QuerySource;
use crate::core::{FetchError, MonitorError, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Shortest polling period a coordinator will accept.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

enum Command<P> {
    Refresh(P),
}

type Completed<T> = (u64, std::result::Result<T, FetchError>);

/// Recurring fetch of one [`QuerySource`] with stale-while-revalidate state.
///
/// Requests are issued on a fixed cadence measured from the previous
/// issuance, so a slow fetch may overlap the next one. All state transitions
/// happen on a single worker task; fetches run on their own tasks and report
/// back tagged with a sequence number, and only the newest request's answer
/// is applied.
pub struct PollingQueryCoordinator<S: QuerySource> {
    source: Arc<S>,
    interval: Duration,
    params: S::Params,
    state_tx: Arc<watch::Sender<QueryState<S::Output>>>,
    worker: Option<CoordinatorWorker<S::Params>>,
}

impl<S: QuerySource> PollingQueryCoordinator<S> {
    pub fn new(source: S, interval: Duration, params: S::Params) -> Self {
        let (state_tx, _) = watch::channel(QueryState::Idle);
        Self {
            source: Arc::new(source),
            interval: interval.max(MIN_POLL_INTERVAL),
            params,
            state_tx: Arc::new(state_tx),
            worker: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Parameters of the most recent (or next) request.
    pub fn params(&self) -> &S::Params {
        &self.params
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn state(&self) -> QueryState<S::Output> {
        self.state_tx.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&QueryState<S::Output>) -> R) -> R {
        f(&self.state_tx.borrow())
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<S::Output>> {
        self.state_tx.subscribe()
    }

    /// Issue the first fetch right away, then one every `interval`.
    ///
    /// Must be called from within a tokio runtime. A coordinator that was
    /// stopped may be started again; it resumes from its last state.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Err(MonitorError::AlreadyRunning(self.name()));
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let join_handle = tokio::spawn(run_worker(
            Arc::clone(&self.source),
            self.interval,
            self.params.clone(),
            Arc::clone(&self.state_tx),
            command_rx,
            stop_rx,
        ));

        self.worker = Some(CoordinatorWorker {
            command_tx,
            stop_tx: Some(stop_tx),
            join_handle: Some(join_handle),
        });
        Ok(())
    }

    /// Replace the active parameters and fetch immediately, restarting the
    /// interval from now. Any request still in flight becomes stale.
    ///
    /// On a stopped coordinator the parameters are only recorded for the
    /// next `start`.
    pub fn refresh_now(&mut self, params: S::Params) -> Result<()> {
        self.params = params.clone();

        let Some(worker) = &self.worker else {
            debug!("{}: not running, recorded {:?} for next start", self.name(), self.params);
            return Ok(());
        };

        worker
            .command_tx
            .send(Command::Refresh(params))
            .map_err(|_| MonitorError::Worker(format!("{} worker is gone", self.name())))
    }

    /// Cancel the schedule. Fetches already in flight run to completion but
    /// their results are dropped.
    pub async fn stop(&mut self) -> Result<()> {
        match self.worker.take() {
            Some(worker) => worker.stop(self.name()).await,
            None => Ok(()),
        }
    }
}

struct CoordinatorWorker<P> {
    command_tx: mpsc::UnboundedSender<Command<P>>,
    stop_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl<P> CoordinatorWorker<P> {
    async fn stop(mut self, name: &'static str) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            join_handle
                .await
                .map_err(|err| MonitorError::Worker(format!("{} worker join: {}", name, err)))?;
        }
        Ok(())
    }
}

impl<P> Drop for CoordinatorWorker<P> {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.abort();
        }
    }
}

async fn run_worker<S: QuerySource>(
    source: Arc<S>,
    period: Duration,
    mut params: S::Params,
    state_tx: Arc<watch::Sender<QueryState<S::Output>>>,
    mut command_rx: mpsc::UnboundedReceiver<Command<S::Params>>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let name = source.name();
    let mut sequencer = RequestSequencer::with_state(state_tx.borrow().clone());
    // Completions from a previous run went to a channel that no longer exists.
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed<S::Output>>();

    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("{}: polling every {:?}", name, period);

    loop {
        tokio::select! {
            biased;

            _ = &mut stop_rx => {
                break;
            }
            command = command_rx.recv() => {
                match command {
                    Some(Command::Refresh(next)) => {
                        params = next;
                        issue(&source, &params, &mut sequencer, &state_tx, &done_tx);
                        ticker.reset();
                    }
                    None => break,
                }
            }
            Some((seq, result)) = done_rx.recv() => {
                if let Err(err) = &result {
                    if seq == sequencer.latest_issued() {
                        warn!("{}: fetch #{} failed: {}", name, seq, err);
                    }
                }

                match sequencer.complete(seq, result, now_ms()) {
                    Completion::Applied => {
                        state_tx.send_replace(sequencer.state().clone());
                    }
                    Completion::Superseded { latest } => {
                        debug!("{}: discarded response #{} (latest is #{})", name, seq, latest);
                    }
                }
            }
            _ = ticker.tick() => {
                issue(&source, &params, &mut sequencer, &state_tx, &done_tx);
            }
        }
    }

    info!("{}: polling stopped after {} requests", name, sequencer.latest_issued());
}

fn issue<S: QuerySource>(
    source: &Arc<S>,
    params: &S::Params,
    sequencer: &mut RequestSequencer<S::Output>,
    state_tx: &watch::Sender<QueryState<S::Output>>,
    done_tx: &mpsc::UnboundedSender<Completed<S::Output>>,
) {
    let seq = sequencer.issue();
    state_tx.send_replace(sequencer.state().clone());
    debug!("{}: fetch #{} issued with {:?}", source.name(), seq, params);

    let source = Arc::clone(source);
    let params = params.clone();
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = source.fetch(&params).await;
        // receiver is gone once the coordinator stopped
        let _ = done_tx.send((seq, result));
    });
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
