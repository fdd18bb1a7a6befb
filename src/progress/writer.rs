//! Background persistence writer
//!
//! Snapshots are handed over through an unbounded channel so gameplay never
//! waits on storage. Pending snapshots are coalesced: only the newest one is
//! written. A failed write is retried once; after that the failure is logged
//! and the in-memory progress stays authoritative.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::backend::ProgressBackend;

enum WriterCommand {
    Write(Value),
    Flush(oneshot::Sender<bool>),
}

/// Handle to the writer task of one namespace
#[derive(Clone)]
pub struct PersistWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl PersistWriter {
    /// Spawn the writer task. Must be called from within a tokio runtime.
    pub fn spawn(backend: Arc<dyn ProgressBackend>, namespace: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(backend, namespace, rx));
        Self { tx }
    }

    /// Queue a snapshot for writing
    pub fn submit(&self, document: Value) {
        if self.tx.send(WriterCommand::Write(document)).is_err() {
            warn!("Persistence writer stopped, progress change not saved");
        }
    }

    /// Wait until every snapshot submitted so far has been handled.
    ///
    /// Returns `false` when the last write failed or the writer is gone.
    pub async fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriterCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.await.unwrap_or(false)
    }
}

async fn run_writer(
    backend: Arc<dyn ProgressBackend>,
    namespace: &'static str,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
) {
    let mut healthy = true;

    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Write(mut document) => {
                let mut acks = Vec::new();
                while let Ok(next) = rx.try_recv() {
                    match next {
                        WriterCommand::Write(newer) => document = newer,
                        WriterCommand::Flush(ack) => acks.push(ack),
                    }
                }

                healthy = write_with_retry(&backend, namespace, document).await;
                for ack in acks {
                    let _ = ack.send(healthy);
                }
            }
            WriterCommand::Flush(ack) => {
                let _ = ack.send(healthy);
            }
        }
    }

    debug!(namespace, "Persistence writer stopped");
}

async fn write_with_retry(
    backend: &Arc<dyn ProgressBackend>,
    namespace: &'static str,
    document: Value,
) -> bool {
    let document = Arc::new(document);

    for attempt in 1..=2 {
        let backend = Arc::clone(backend);
        let doc = Arc::clone(&document);
        let result = tokio::task::spawn_blocking(move || backend.write(namespace, &doc)).await;

        match result {
            Ok(Ok(())) => {
                debug!(namespace, attempt, "Progress saved");
                return true;
            }
            Ok(Err(e)) => warn!(namespace, attempt, "Progress write failed: {}", e),
            Err(e) => warn!(namespace, attempt, "Progress write task failed: {}", e),
        }
    }

    warn!(
        namespace,
        "Giving up on this write; in-memory progress remains authoritative"
    );
    false
}
