//! Notification queue state machine
//!
//! Shows one unlock at a time. Leaving the `Showing` state always goes
//! through [`NotificationQueue::advance`], whether the dwell time ran out or
//! the user dismissed the notification early.
//!
//! The queue does not own a timer. Callers pass the current instant and ask
//! for [`NotificationQueue::deadline`]; see `driver` for the tokio loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use super::sink::{NotificationSink, SoundCue};
use crate::achievements::NotificationEvent;

/// How long a notification stays visible
pub const DEFAULT_DWELL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueState {
    #[default]
    Idle,
    Showing,
}

/// Observable state of the queue
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueueSnapshot {
    pub state: QueueState,
    pub current: Option<NotificationEvent>,
    pub pending: usize,
    /// Events accepted by `enqueue` (including any later dropped)
    pub accepted: u64,
    pub displayed: u64,
    pub dropped: u64,
}

impl QueueSnapshot {
    pub fn is_idle(&self) -> bool {
        self.state == QueueState::Idle
    }
}

struct Active {
    event: NotificationEvent,
    deadline: Instant,
}

/// Single-display scheduler for unlock events
pub struct NotificationQueue {
    pending: VecDeque<NotificationEvent>,
    active: Option<Active>,
    dwell: Duration,
    max_pending: Option<usize>,
    sink: Arc<dyn NotificationSink>,
    accepted: u64,
    displayed: u64,
    dropped: u64,
}

impl NotificationQueue {
    pub fn new(sink: Arc<dyn NotificationSink>, dwell: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            active: None,
            dwell,
            max_pending: None,
            sink,
            accepted: 0,
            displayed: 0,
            dropped: 0,
        }
    }

    /// Keep at most `max` waiting events, dropping the oldest beyond that
    pub fn with_max_pending(mut self, max: usize) -> Self {
        self.max_pending = Some(max);
        self
    }

    pub fn state(&self) -> QueueState {
        if self.active.is_some() {
            QueueState::Showing
        } else {
            QueueState::Idle
        }
    }

    pub fn current(&self) -> Option<&NotificationEvent> {
        self.active.as_ref().map(|active| &active.event)
    }

    /// When the current notification expires
    pub fn deadline(&self) -> Option<Instant> {
        self.active.as_ref().map(|active| active.deadline)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            state: self.state(),
            current: self.current().cloned(),
            pending: self.pending.len(),
            accepted: self.accepted,
            displayed: self.displayed,
            dropped: self.dropped,
        }
    }

    /// Append a batch in order. Starts showing if the queue was idle.
    pub fn enqueue(&mut self, events: Vec<NotificationEvent>, now: Instant) {
        if events.is_empty() {
            return;
        }

        self.accepted += events.len() as u64;
        self.pending.extend(events);

        if self.active.is_none() {
            self.advance(now);
        }
        self.enforce_capacity();
    }

    /// Advance if the dwell time of the current event has elapsed
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.advance(now);
                true
            }
            _ => false,
        }
    }

    /// Dismiss whatever is showing
    pub fn dismiss(&mut self, now: Instant) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.advance(now);
        true
    }

    /// Dismiss only if `id` is still the event on screen.
    ///
    /// A repeated dismissal of the same event is ignored.
    pub fn dismiss_event(&mut self, id: Uuid, now: Instant) -> bool {
        match self.current() {
            Some(event) if event.id == id => self.dismiss(now),
            _ => {
                debug!(%id, "Ignoring dismissal of an event that is not showing");
                false
            }
        }
    }

    fn advance(&mut self, now: Instant) {
        if let Some(done) = self.active.take() {
            debug!(id = %done.event.id, "Notification finished");
        }

        if let Some(event) = self.pending.pop_front() {
            self.present(&event);
            self.displayed += 1;
            self.active = Some(Active {
                event,
                deadline: now + self.dwell,
            });
        }
    }

    fn present(&self, event: &NotificationEvent) {
        if let Err(e) = self.sink.show_notification(event) {
            warn!(id = %event.id, "Failed to display notification: {:#}", e);
        }
        if let Err(e) = self.sink.play_sound(SoundCue::for_tier(event.tier)) {
            debug!("Failed to play notification sound: {:#}", e);
        }
    }

    fn enforce_capacity(&mut self) {
        let Some(max) = self.max_pending else {
            return;
        };
        while self.pending.len() > max {
            if let Some(dropped) = self.pending.pop_front() {
                self.dropped += 1;
                warn!(
                    id = %dropped.id,
                    key = %dropped.key(),
                    "Notification backlog full, dropping oldest pending event"
                );
            }
        }
    }
}
