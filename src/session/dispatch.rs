//! Query dispatcher.
//!
//! Explore calls block on the network, so they run on a small bounded
//! pool of worker threads. Each finished call is reported as a
//! `Completion` carrying the ticket it was issued under; the session
//! manager applies completions on its own thread.
//!
//! Shutdown never waits on the network: queued calls are discarded, and
//! workers still inside a call get `shutdown_grace_ms` to finish before
//! they are detached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::catalog::ActiveBeliefSet;
use crate::client::ReasoningService;
use crate::error::{CheemeraError, DispatchError, TransportError};
use crate::property::Property;
use crate::result::ExploreResult;
use crate::session::TabId;

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Number of concurrent explore calls.
    pub workers: usize,
    /// Maximum queued calls before submissions are refused.
    pub queue_capacity: usize,
    /// How long dropping the dispatcher waits for calls already in progress.
    pub shutdown_grace_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
            shutdown_grace_ms: 200,
        }
    }
}

/// Identity of one issued query: the tab it belongs to and its position
/// in that tab's request sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    /// Tab the query was issued for.
    pub tab: TabId,
    /// Manager-wide request sequence number.
    pub seq: u64,
}

/// A finished explore call.
#[derive(Debug)]
pub struct Completion {
    /// Ticket the query was issued under.
    pub ticket: RequestTicket,
    /// Belief set the query ran against.
    pub snapshot: Arc<ActiveBeliefSet>,
    /// What the reasoning service answered.
    pub outcome: Result<ExploreResult, TransportError>,
}

struct Job {
    ticket: RequestTicket,
    snapshot: Arc<ActiveBeliefSet>,
    properties: Vec<Property>,
}

/// Bounded worker pool running explore calls.
pub struct QueryDispatcher {
    tx: Option<Sender<Job>>,
    /// Kept so shutdown can discard queued jobs.
    rx: Receiver<Job>,
    workers: Vec<JoinHandle<()>>,
    /// Disconnects once every worker has exited.
    exited: Receiver<()>,
    shutdown: Arc<AtomicBool>,
    queue_capacity: usize,
    shutdown_grace: Duration,
}

impl QueryDispatcher {
    /// Starts the workers. Completions are sent on `completions`.
    pub fn start(
        service: Arc<dyn ReasoningService>,
        config: &DispatcherConfig,
        completions: Sender<Completion>,
    ) -> Result<Self, CheemeraError> {
        let workers = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);
        let (exit_tx, exited) = bounded::<()>(0);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let service = Arc::clone(&service);
            let completions = completions.clone();
            let shutdown = Arc::clone(&shutdown);
            let exit_tx = exit_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("cheemera-explore-{idx}"))
                .spawn(move || {
                    // Dropped on exit; the dispatcher watches for disconnection.
                    let _exit_tx = exit_tx;
                    while let Ok(job) = rx.recv() {
                        if shutdown.load(Ordering::Acquire) {
                            break;
                        }
                        let outcome = service.explore(job.snapshot.belief_set(), &job.properties);
                        let completion = Completion {
                            ticket: job.ticket,
                            snapshot: job.snapshot,
                            outcome,
                        };
                        if completions.send(completion).is_err() {
                            // Manager is gone; nobody is left to route to.
                            break;
                        }
                    }
                })
                .map_err(|e| CheemeraError::internal(format!("failed to spawn explore worker: {e}")))?;
            handles.push(handle);
        }

        Ok(Self {
            tx: Some(tx),
            rx,
            workers: handles,
            exited,
            shutdown,
            queue_capacity,
            shutdown_grace: Duration::from_millis(config.shutdown_grace_ms),
        })
    }

    /// Queues an explore call without blocking.
    pub fn submit(
        &self,
        ticket: RequestTicket,
        snapshot: Arc<ActiveBeliefSet>,
        properties: Vec<Property>,
    ) -> Result<(), DispatchError> {
        let Some(tx) = &self.tx else {
            return Err(DispatchError::Disconnected);
        };
        let job = Job {
            ticket,
            snapshot,
            properties,
        };
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DispatchError::QueueFull {
                capacity: self.queue_capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(DispatchError::Disconnected),
        }
    }

    /// Number of worker threads started.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for QueryDispatcher {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        drop(self.tx.take());
        let mut discarded = 0usize;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }

        let deadline = Instant::now() + self.shutdown_grace;
        let settled = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.exited.recv_timeout(remaining) {
                Err(RecvTimeoutError::Disconnected) => break true,
                Err(RecvTimeoutError::Timeout) => break false,
                Ok(()) => {}
            }
        };

        if settled {
            for handle in self.workers.drain(..) {
                let _ = handle.join();
            }
        } else {
            // Workers blocked in a call exit on their own once it returns.
            tracing::warn!(
                workers = self.workers.len(),
                grace = ?self.shutdown_grace,
                "explore workers still busy at shutdown, detaching"
            );
            self.workers.clear();
        }
        tracing::debug!(discarded, "query dispatcher stopped");
    }
}
