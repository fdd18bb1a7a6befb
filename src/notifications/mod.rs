//! Achievement notification delivery
//!
//! Unlock events are shown one at a time for a fixed dwell time. The state
//! machine lives in [`NotificationQueue`]; [`NotificationHandle`] runs it on
//! a tokio task and exposes the current state to any front end.
//!
//! ```text
//!            enqueue (non-empty)
//!   ┌──────┐ ─────────────────────▶ ┌─────────┐ ──┐ dwell elapsed / dismiss,
//!   │ Idle │                        │ Showing │   │ more pending
//!   └──────┘ ◀───────────────────── └─────────┘ ◀─┘
//!            dwell elapsed / dismiss,
//!            nothing pending
//! ```

mod driver;
mod queue;
mod sink;

pub use driver::NotificationHandle;
pub use queue::{NotificationQueue, QueueSnapshot, QueueState, DEFAULT_DWELL};
pub use sink::{NotificationSink, RecordingSink, SinkCall, SoundCue, TerminalSink};
