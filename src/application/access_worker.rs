//! Background access counting.
//!
//! Resolve requests enqueue an [`AccessEvent`] through an [`AccessRecorder`] and
//! return immediately. [`run_access_worker`] applies the increments with bounded
//! concurrency, each under its own timeout and independent of the request that
//! produced it. Increments for one short code are applied in order.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::application::services::LinkStore;
use crate::domain::access_event::AccessEvent;

/// Sending half of the access queue.
#[derive(Clone)]
pub struct AccessRecorder {
    tx: mpsc::Sender<AccessEvent>,
    enqueue_timeout: Duration,
    deferred: Arc<Semaphore>,
}

/// Creates a bounded access queue with room for `capacity` pending events.
///
/// At most `capacity` further events may wait for room while the queue is full.
pub fn channel(capacity: usize) -> (AccessRecorder, mpsc::Receiver<AccessEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        AccessRecorder {
            tx,
            enqueue_timeout: Duration::from_secs(5),
            deferred: Arc::new(Semaphore::new(capacity)),
        },
        rx,
    )
}

impl AccessRecorder {
    /// Bounds how long an overflow event may wait for queue capacity.
    pub fn with_enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.enqueue_timeout = timeout;
        self
    }

    /// Bounds how many overflow events may wait for queue capacity at once.
    pub fn with_max_deferred(mut self, max_deferred: usize) -> Self {
        self.deferred = Arc::new(Semaphore::new(max_deferred));
        self
    }

    /// Queues an increment for `short_code` without waiting.
    ///
    /// When the queue is full the event is handed to a detached task that waits
    /// for capacity, so bursts delay counting instead of losing it. Once the
    /// number of waiting events reaches its limit, further events are dropped.
    pub fn record(&self, short_code: &str) {
        let event = AccessEvent::new(short_code);

        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                let Ok(permit) = self.deferred.clone().try_acquire_owned() else {
                    error!(
                        "Access queue and overflow full, dropping access for {}",
                        event.short_code
                    );
                    metrics::counter!("access_events_dropped_total").increment(1);
                    return;
                };

                metrics::counter!("access_events_deferred_total").increment(1);
                let tx = self.tx.clone();
                let timeout = self.enqueue_timeout;
                tokio::spawn(async move {
                    let code = event.short_code.clone();
                    match tokio::time::timeout(timeout, tx.send(event)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(_)) => {
                            error!("Access queue closed, dropping access for {}", code);
                            metrics::counter!("access_events_dropped_total").increment(1);
                        }
                        Err(_) => {
                            error!(
                                "Access queue full for {:?}, dropping access for {}",
                                timeout, code
                            );
                            metrics::counter!("access_events_dropped_total").increment(1);
                        }
                    }
                    drop(permit);
                });
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                error!(
                    "Access queue closed, dropping access for {}",
                    event.short_code
                );
                metrics::counter!("access_events_dropped_total").increment(1);
            }
        }
    }

    /// Returns true once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Free slots currently available in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// Tuning for [`run_access_worker`].
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Number of partitions, and so the maximum number of increments in flight.
    pub concurrency: usize,
    /// Retries for transient failures, on top of the first attempt.
    pub retry_attempts: usize,
    /// Upper bound for one event, retries included.
    pub task_timeout: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry_attempts: 3,
            task_timeout: Duration::from_secs(5),
        }
    }
}

/// Events buffered per partition before the dispatcher waits.
const PARTITION_BUFFER: usize = 64;

/// Consumes access events until every [`AccessRecorder`] is dropped, then waits
/// for in-flight increments to finish.
///
/// Events are spread over `concurrency` partitions by short code. A partition
/// applies its events one at a time, so increments for the same code refresh
/// the cache in the order they were committed.
pub async fn run_access_worker(
    mut rx: mpsc::Receiver<AccessEvent>,
    store: Arc<LinkStore>,
    settings: WorkerSettings,
) {
    let concurrency = settings.concurrency.max(1);
    let mut partitions = Vec::with_capacity(concurrency);
    let mut handles = Vec::with_capacity(concurrency);

    for _ in 0..concurrency {
        let (tx, mut partition_rx) = mpsc::channel::<AccessEvent>(PARTITION_BUFFER);
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            while let Some(event) = partition_rx.recv().await {
                process_event(&store, event, &settings).await;
            }
        }));
        partitions.push(tx);
    }

    while let Some(event) = rx.recv().await {
        let index = partition_for(&event.short_code, concurrency);
        if partitions[index].send(event).await.is_err() {
            error!("Access partition {} stopped unexpectedly", index);
            break;
        }
    }

    // Closing the partitions lets each one finish its backlog and exit.
    drop(partitions);
    for handle in handles {
        if let Err(e) = handle.await {
            error!("Access partition panicked: {}", e);
        }
    }
    info!("Access worker stopped");
}

fn partition_for(short_code: &str, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    short_code.hash(&mut hasher);
    (hasher.finish() % partitions as u64) as usize
}

async fn process_event(store: &LinkStore, event: AccessEvent, settings: &WorkerSettings) {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(25)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(settings.retry_attempts);

    let code = event.short_code.as_str();
    let attempt = RetryIf::start(
        strategy,
        move || store.increment_access_count(code),
        |e: &crate::error::AppError| {
            let transient = e.is_transient();
            if transient {
                warn!("Transient failure counting access for {}: {}", code, e);
            }
            transient
        },
    );

    match tokio::time::timeout(settings.task_timeout, attempt).await {
        Ok(Ok(Some(link))) => {
            debug!(
                "Access counted for {} (now {}, queued {:?} ago)",
                code,
                link.access_count,
                event.enqueued_at.elapsed()
            );
            metrics::counter!("access_increments_total", "outcome" => "ok").increment(1);
        }
        Ok(Ok(None)) => {
            warn!("Access counted for unknown short code {}", code);
            metrics::counter!("access_increments_total", "outcome" => "not_found").increment(1);
        }
        Ok(Err(e)) => {
            error!("Failed to count access for {}: {}", code, e);
            metrics::counter!("access_increments_total", "outcome" => "error").increment(1);
        }
        Err(_) => {
            error!(
                "Counting access for {} timed out after {:?}",
                code, settings.task_timeout
            );
            metrics::counter!("access_increments_total", "outcome" => "timeout").increment(1);
        }
    }
}
