//! Display collaborators
//!
//! A sink is told when an event starts showing. Calls are fire-and-forget:
//! the queue logs a failure and carries on.

use std::io::Write;
use std::sync::Mutex;

use anyhow::Result;

use crate::achievements::{NotificationEvent, Tier};

/// Audio cue played when a notification appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Bronze and silver tiers
    Chime,
    /// Gold and perfect tiers
    Fanfare,
}

impl SoundCue {
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Bronze | Tier::Silver => Self::Chime,
            Tier::Gold | Tier::Perfect => Self::Fanfare,
        }
    }
}

/// UI side of the notification queue
pub trait NotificationSink: Send + Sync {
    fn show_notification(&self, event: &NotificationEvent) -> Result<()>;

    fn play_sound(&self, cue: SoundCue) -> Result<()>;
}

/// Prints notifications to stdout
#[derive(Debug, Clone, Default)]
pub struct TerminalSink {
    /// Ring the terminal bell on each notification
    pub sound: bool,
}

impl TerminalSink {
    pub fn new(sound: bool) -> Self {
        Self { sound }
    }
}

impl NotificationSink for TerminalSink {
    fn show_notification(&self, event: &NotificationEvent) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "Achievement unlocked! {}", event.title())?;
        out.flush()?;
        Ok(())
    }

    fn play_sound(&self, cue: SoundCue) -> Result<()> {
        if !self.sound {
            return Ok(());
        }
        let bells = match cue {
            SoundCue::Chime => "\x07",
            SoundCue::Fanfare => "\x07\x07",
        };
        let mut out = std::io::stdout().lock();
        out.write_all(bells.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// What a [`RecordingSink`] was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Show(NotificationEvent),
    Sound(SoundCue),
}

/// Keeps every call in memory, for headless front ends and tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose calls are recorded and then reported as failed
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Events shown so far, in display order
    pub fn shown(&self) -> Vec<NotificationEvent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Show(event) => Some(event),
                SinkCall::Sound(_) => None,
            })
            .collect()
    }

    fn record(&self, call: SinkCall) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self.fail {
            anyhow::bail!("display unavailable");
        }
        Ok(())
    }
}

impl NotificationSink for RecordingSink {
    fn show_notification(&self, event: &NotificationEvent) -> Result<()> {
        self.record(SinkCall::Show(event.clone()))
    }

    fn play_sound(&self, cue: SoundCue) -> Result<()> {
        self.record(SinkCall::Sound(cue))
    }
}
