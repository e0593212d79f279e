//! Print job queue
//!
//! Orchestrates the lifecycle of a submitted print request: resolve
//! targets through the registry, encode once, fan the payload out to every
//! target concurrently, aggregate per-target results into a terminal
//! status, and notify subscribers on every transition.

use crate::registry::PrinterRegistry;
use crate::render::{self, EncodeWarning};
use crate::types::PrintRequest;
use dashmap::DashMap;
use futures::future::join_all;
use heron_printer::Transport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// How long terminal jobs stay queryable before eviction
const DEFAULT_RETENTION: Duration = Duration::from_secs(300);

/// Receipt paper width in characters (80mm stock)
const DEFAULT_RECEIPT_WIDTH: usize = 48;

/// Job lifecycle: `Queued → Sending → {Succeeded, Partial, Failed}`
///
/// A job that fails at target resolution goes `Queued → Failed` directly
/// and never enters `Sending`. No transitions occur after a terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Sending,
    Succeeded,
    Partial,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Partial | JobStatus::Failed
        )
    }
}

/// Outcome of one target printer's transmission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runtime record of one submitted request's execution
///
/// Snapshots of this record are what subscribers receive; a job is never
/// published in a terminal state with a transmission still outstanding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: String,
    pub status: JobStatus,
    /// Printer id -> transmission outcome, one entry per dispatched target
    pub per_target: HashMap<String, TargetResult>,
    /// Failure reason for jobs that never dispatched (no printers, nothing
    /// encodable)
    pub reason: Option<String>,
    /// Non-fatal encoding conditions (e.g. labels missing barcode data)
    pub warnings: Vec<EncodeWarning>,
    pub created_at: i64,
}

impl PrintJob {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: JobStatus::Queued,
            per_target: HashMap::new(),
            reason: None,
            warnings: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Handle for one subscriber of job status updates
///
/// Receives a snapshot on every status transition of every job. Dropping
/// the handle detaches it; explicit `PrintQueue::unsubscribe` is
/// idempotent.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<PrintJob>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next job update; `None` once detached
    pub async fn recv(&mut self) -> Option<PrintJob> {
        self.rx.recv().await
    }
}

/// Print job queue and status stream
pub struct PrintQueue {
    registry: Arc<PrinterRegistry>,
    transport: Arc<dyn Transport>,
    jobs: Arc<DashMap<String, PrintJob>>,
    subscribers: DashMap<u64, mpsc::UnboundedSender<PrintJob>>,
    next_subscriber: AtomicU64,
    receipt_width: usize,
    retention: Duration,
}

impl PrintQueue {
    pub fn new(registry: Arc<PrinterRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
            jobs: Arc::new(DashMap::new()),
            subscribers: DashMap::new(),
            next_subscriber: AtomicU64::new(0),
            receipt_width: DEFAULT_RECEIPT_WIDTH,
            retention: DEFAULT_RETENTION,
        }
    }

    /// Override how long terminal jobs stay queryable
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Override the receipt paper width in characters
    pub fn with_receipt_width(mut self, width: usize) -> Self {
        self.receipt_width = width;
        self
    }

    /// Submit a print request; returns the job id immediately
    ///
    /// All network work happens on a spawned task; callers observe the
    /// outcome through `subscribe` or `job`.
    pub fn submit(self: &Arc<Self>, request: PrintRequest) -> String {
        let job = PrintJob::new();
        let job_id = job.id.clone();

        info!(job_id = %job_id, class = %request.target_class, "Print job submitted");
        self.jobs.insert(job_id.clone(), job);

        let queue = Arc::clone(self);
        let id = job_id.clone();
        tokio::spawn(async move {
            queue.run_job(id, request).await;
        });

        job_id
    }

    /// True iff at least one enabled printer of the class is configured
    ///
    /// Lets callers short-circuit to a fallback (e.g. textual preview)
    /// before paying for a send attempt.
    pub fn is_available(&self, class: &str) -> bool {
        self.registry.load();
        !self.registry.enabled_targets_for(class).is_empty()
    }

    /// Snapshot of a tracked job, if it has not been evicted yet
    pub fn job(&self, job_id: &str) -> Option<PrintJob> {
        self.jobs.get(job_id).map(|j| j.value().clone())
    }

    /// Register for status updates of every job
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        Subscription { id, rx }
    }

    /// Detach a subscriber; safe to call repeatedly, other subscribers are
    /// unaffected
    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.remove(&id);
    }

    #[instrument(skip_all, fields(job_id = %job_id, class = %request.target_class))]
    async fn run_job(self: Arc<Self>, job_id: String, request: PrintRequest) {
        self.registry.load();
        let targets = self.registry.enabled_targets_for(&request.target_class);

        if targets.is_empty() {
            warn!("No enabled printer for class");
            self.transition(&job_id, JobStatus::Failed, Some("No printer configured".into()));
            return;
        }

        // Encode once; the same payload goes to every target
        let encoded = render::render_request(&request.content, self.receipt_width);
        if !encoded.warnings.is_empty() {
            warn!(warnings = encoded.warnings.len(), "Request encoded with warnings");
            self.with_job(&job_id, |job| job.warnings = encoded.warnings.clone());
        }
        if encoded.payload.is_empty() {
            self.transition(&job_id, JobStatus::Failed, Some("Nothing to print".into()));
            return;
        }

        self.transition(&job_id, JobStatus::Sending, None);

        // Fan out concurrently; a wedged printer only costs its own
        // transport timeout, never a sibling's delivery
        let payload = encoded.payload;
        let sends = targets.iter().map(|target| {
            let transport = Arc::clone(&self.transport);
            let payload = &payload;
            async move { transport.send(&target.address, target.port, payload).await }
        });
        let results = join_all(sends).await;

        let mut ok_count = 0usize;
        let mut per_target = HashMap::with_capacity(targets.len());
        for (target, result) in targets.iter().zip(results) {
            match result {
                Ok(()) => {
                    ok_count += 1;
                    per_target.insert(target.id.clone(), TargetResult { ok: true, error: None });
                }
                Err(e) => {
                    warn!(printer = %target.id, error = %e, "Target send failed");
                    per_target.insert(
                        target.id.clone(),
                        TargetResult {
                            ok: false,
                            error: Some(e.reason().to_string()),
                        },
                    );
                }
            }
        }

        let status = if ok_count == targets.len() {
            JobStatus::Succeeded
        } else if ok_count > 0 {
            JobStatus::Partial
        } else {
            JobStatus::Failed
        };

        info!(ok = ok_count, total = targets.len(), status = ?status, "Print job settled");
        self.with_job(&job_id, |job| job.per_target = per_target);
        self.transition(&job_id, status, None);
    }

    /// Mutate a job in place without publishing
    fn with_job(&self, job_id: &str, f: impl FnOnce(&mut PrintJob)) {
        if let Some(mut entry) = self.jobs.get_mut(job_id) {
            f(entry.value_mut());
        }
    }

    /// Apply a status transition and publish the snapshot
    ///
    /// Transitions after a terminal state are ignored, which also makes
    /// publication exactly-once per transition.
    fn transition(&self, job_id: &str, status: JobStatus, reason: Option<String>) {
        let snapshot = {
            let Some(mut entry) = self.jobs.get_mut(job_id) else {
                return;
            };
            if entry.status.is_terminal() {
                warn!(job_id = %job_id, "Ignoring transition after terminal state");
                return;
            }
            entry.status = status;
            if reason.is_some() {
                entry.reason = reason;
            }
            entry.value().clone()
        };

        self.publish(&snapshot);

        if snapshot.status.is_terminal() {
            let jobs = Arc::clone(&self.jobs);
            let id = job_id.to_string();
            let retention = self.retention;
            tokio::spawn(async move {
                tokio::time::sleep(retention).await;
                jobs.remove(&id);
            });
        }
    }

    /// Send a snapshot to every live subscriber, dropping dead ones
    fn publish(&self, job: &PrintJob) {
        self.subscribers.retain(|_, tx| tx.send(job.clone()).is_ok());
    }
}
