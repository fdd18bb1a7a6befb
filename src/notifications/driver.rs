//! Timer-driven notification loop
//!
//! The queue is owned by one tokio task. Producers talk to it through a
//! [`NotificationHandle`]; the only timer is the dwell deadline of the
//! notification currently on screen.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use super::queue::{NotificationQueue, QueueSnapshot};
use crate::achievements::NotificationEvent;

enum QueueCommand {
    /// One batch, applied as a whole
    Enqueue(Vec<NotificationEvent>),
    Dismiss(Option<Uuid>),
}

/// Cloneable producer/observer handle of a running notification queue
#[derive(Clone)]
pub struct NotificationHandle {
    tx: mpsc::UnboundedSender<QueueCommand>,
    state: watch::Receiver<QueueSnapshot>,
    sent: Arc<AtomicU64>,
}

impl NotificationHandle {
    /// Move the queue into its own task. Must be called from within a tokio
    /// runtime. The task ends once every handle is dropped.
    pub fn spawn(queue: NotificationQueue) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(queue.snapshot());
        let task = tokio::spawn(run_queue(queue, rx, state_tx));

        let handle = Self {
            tx,
            state: state_rx,
            sent: Arc::new(AtomicU64::new(0)),
        };
        (handle, task)
    }

    /// Hand a batch of unlock events to the queue
    pub fn enqueue(&self, events: Vec<NotificationEvent>) {
        if events.is_empty() {
            return;
        }
        let count = events.len();
        self.sent.fetch_add(count as u64, Ordering::SeqCst);
        if self.tx.send(QueueCommand::Enqueue(events)).is_err() {
            warn!("Notification queue stopped, dropping {} events", count);
        }
    }

    /// Dismiss whatever is currently showing
    pub fn dismiss(&self) {
        let _ = self.tx.send(QueueCommand::Dismiss(None));
    }

    /// Dismiss a specific event if it is still the one showing
    pub fn dismiss_event(&self, id: Uuid) {
        let _ = self.tx.send(QueueCommand::Dismiss(Some(id)));
    }

    /// Latest published queue state
    pub fn snapshot(&self) -> QueueSnapshot {
        self.state.borrow().clone()
    }

    /// Watch queue state changes (for a UI)
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.state.clone()
    }

    /// Resolve once everything enqueued through this handle's clones so far
    /// has been shown and has left the screen
    pub async fn wait_idle(&self) {
        let target = self.sent.load(Ordering::SeqCst);
        let mut state = self.state.clone();
        let result = state
            .wait_for(|snapshot| snapshot.accepted >= target && snapshot.is_idle())
            .await;
        if result.is_err() {
            debug!("Notification queue stopped while waiting for idle");
        }
    }
}

async fn run_queue(
    mut queue: NotificationQueue,
    mut rx: mpsc::UnboundedReceiver<QueueCommand>,
    state_tx: watch::Sender<QueueSnapshot>,
) {
    loop {
        let deadline = queue.deadline();

        tokio::select! {
            command = rx.recv() => match command {
                Some(QueueCommand::Enqueue(events)) => queue.enqueue(events, Instant::now()),
                Some(QueueCommand::Dismiss(Some(id))) => {
                    queue.dismiss_event(id, Instant::now());
                }
                Some(QueueCommand::Dismiss(None)) => {
                    queue.dismiss(Instant::now());
                }
                None => break,
            },
            _ = sleep_until(deadline) => {
                queue.expire(Instant::now());
            }
        }

        state_tx.send_replace(queue.snapshot());
    }

    debug!("Notification queue stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
