//! Autosave worker: debounced full-list persistence.
//!
//! DESIGN
//! ======
//! The session hands every annotation snapshot to [`AutosaveHandle::schedule`].
//! A background task keeps only the newest snapshot and restarts the
//! quiescence window on each one; when the window elapses without a new
//! snapshot the write is dispatched. A snapshot for a different image than
//! the pending one dispatches the pending write immediately, so navigating
//! away never drops an edit.
//!
//! ORDERING
//! ========
//! Each write runs in its own task and is never cancelled or serialized
//! behind an earlier one. Two overlapping writes both reach the store and
//! whichever finishes last wins. Writes carry a monotonically increasing
//! sequence number in logs and in [`SaveStatus::last_seq`] so overlaps are
//! visible.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is logged and counted; the in-flight count still drops and
//! the local list is untouched. The next snapshot retries with the full list.

use std::sync::Arc;
use std::time::Duration;

use canvas::doc::Annotation;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::RemoteStore;

/// A full annotation list to persist for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub project_id: String,
    pub image_id: String,
    pub annotations: Vec<Annotation>,
}

impl SaveRequest {
    fn same_target(&self, other: &Self) -> bool {
        self.project_id == other.project_id && self.image_id == other.image_id
    }
}

/// Observable autosave progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStatus {
    /// Writes dispatched and not yet finished.
    pub in_flight: usize,
    pub completed: u64,
    pub failed: u64,
    pub last_error: Option<String>,
    /// Sequence number of the most recently dispatched write.
    pub last_seq: u64,
}

impl SaveStatus {
    #[must_use]
    pub fn saving(&self) -> bool {
        self.in_flight > 0
    }
}

pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<SaveRequest>,
    status: watch::Receiver<SaveStatus>,
    worker: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Queue a snapshot, restarting the quiescence window.
    pub fn schedule(&self, request: SaveRequest) {
        if let Err(e) = self.tx.send(request) {
            warn!(image_id = %e.0.image_id, "autosave worker stopped; dropping snapshot");
        }
    }

    #[must_use]
    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// True while at least one write is in flight.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.status.borrow().saving()
    }

    /// Dispatch any pending snapshot, wait for every write to finish, and stop.
    pub async fn shutdown(self) -> SaveStatus {
        let Self { tx, status, worker } = self;
        drop(tx);
        if let Err(e) = worker.await {
            error!(error = %e, "autosave worker ended abnormally");
        }
        status.borrow().clone()
    }
}

/// Spawn the autosave worker with the given quiescence window.
#[must_use]
pub fn spawn_autosave_worker(store: Arc<dyn RemoteStore>, window: Duration) -> AutosaveHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(SaveStatus::default());
    info!(window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX), "autosave worker configured");
    let worker = tokio::spawn(run_worker(store, window, rx, Arc::new(status_tx)));
    AutosaveHandle { tx, status: status_rx, worker }
}

struct Dispatcher {
    store: Arc<dyn RemoteStore>,
    status: Arc<watch::Sender<SaveStatus>>,
    writes: JoinSet<()>,
    next_seq: u64,
}

impl Dispatcher {
    fn dispatch(&mut self, request: SaveRequest) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.status.send_modify(|s| {
            s.in_flight += 1;
            s.last_seq = seq;
        });
        info!(
            seq,
            project_id = %request.project_id,
            image_id = %request.image_id,
            count = request.annotations.len(),
            "autosave dispatched"
        );
        self.writes
            .spawn(write_once(Arc::clone(&self.store), Arc::clone(&self.status), seq, request));
    }
}

async fn write_once(
    store: Arc<dyn RemoteStore>,
    status: Arc<watch::Sender<SaveStatus>>,
    seq: u64,
    request: SaveRequest,
) {
    let result = store
        .save_annotations(&request.project_id, &request.image_id, &request.annotations)
        .await;
    match result {
        Ok(()) => {
            debug!(seq, image_id = %request.image_id, "autosave completed");
            status.send_modify(|s| {
                s.in_flight = s.in_flight.saturating_sub(1);
                s.completed += 1;
            });
        }
        Err(e) => {
            error!(seq, error = %e, image_id = %request.image_id, "autosave failed");
            status.send_modify(|s| {
                s.in_flight = s.in_flight.saturating_sub(1);
                s.failed += 1;
                s.last_error = Some(e.to_string());
            });
        }
    }
}

async fn run_worker(
    store: Arc<dyn RemoteStore>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
    status: Arc<watch::Sender<SaveStatus>>,
) {
    let mut dispatcher = Dispatcher { store, status, writes: JoinSet::new(), next_seq: 0 };
    let mut pending: Option<SaveRequest> = None;
    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            maybe_request = rx.recv() => {
                let Some(request) = maybe_request else {
                    if let Some(last) = pending.take() {
                        dispatcher.dispatch(last);
                    }
                    break;
                };
                if let Some(other) = pending.take_if(|p| !p.same_target(&request)) {
                    dispatcher.dispatch(other);
                }
                pending = Some(request);
                deadline.as_mut().reset(Instant::now() + window);
            }
            () = &mut deadline, if pending.is_some() => {
                if let Some(request) = pending.take() {
                    dispatcher.dispatch(request);
                }
            }
            Some(joined) = dispatcher.writes.join_next(), if !dispatcher.writes.is_empty() => {
                if let Err(e) = joined {
                    error!(error = %e, "autosave write task ended abnormally");
                }
            }
        }
    }

    while let Some(joined) = dispatcher.writes.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "autosave write task ended abnormally");
        }
    }
    debug!("autosave worker stopped");
}

#[cfg(test)]
#[path = "autosave_test.rs"]
mod tests;
