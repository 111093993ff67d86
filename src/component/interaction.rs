//! Focus/commit state machine.
//!
//! ```text
//!          focus_in (snapshot)            grace elapsed / Enter
//!   Idle ───────────────────▶ Focused ───────────────────▶ Committing ──▶ Idle
//!                              │  ▲                                  (change if
//!                       input  └──┘  focus_in within grace            value ≠ snapshot)
//!                                    cancels the pending commit
//! ```
//!
//! The blur grace timer is the only timer in the framework. Time is passed
//! in by the host as a monotonic [`Duration`].

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Idle,
    Focused,
    Committing,
}

/// Keys the interaction controller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Backspace,
    Delete,
    /// A printable character.
    Char(char),
    Other,
}

/// Whether the host should perform the key's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Default,
    Prevented,
}

#[derive(Debug)]
pub(crate) struct Interaction {
    state: FocusState,
    snapshot: Option<String>,
    blur_deadline: Option<Duration>,
    grace: Duration,
}

impl Interaction {
    pub(crate) fn new(grace: Duration) -> Self {
        Self {
            state: FocusState::Idle,
            snapshot: None,
            blur_deadline: None,
            grace,
        }
    }

    pub(crate) fn state(&self) -> FocusState {
        self.state
    }

    pub(crate) fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Enters `Focused`. A pending blur is cancelled and the original
    /// snapshot kept; otherwise `value` becomes the snapshot.
    pub(crate) fn focus_in(&mut self, value: &str) {
        match self.state {
            FocusState::Focused if self.blur_deadline.is_some() => {
                self.blur_deadline = None;
            }
            FocusState::Focused | FocusState::Committing => {}
            FocusState::Idle => {
                self.state = FocusState::Focused;
                self.snapshot = Some(value.to_string());
            }
        }
    }

    /// Starts the grace timer.
    pub(crate) fn schedule_blur(&mut self, now: Duration) {
        if self.state == FocusState::Focused {
            self.blur_deadline = Some(now + self.grace);
        }
    }

    pub(crate) fn blur_pending(&self) -> bool {
        self.blur_deadline.is_some()
    }

    pub(crate) fn blur_due(&self, now: Duration) -> bool {
        self.blur_deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Enters `Committing` and hands back the snapshot.
    pub(crate) fn begin_commit(&mut self) -> Option<String> {
        if self.state != FocusState::Focused {
            return None;
        }
        self.state = FocusState::Committing;
        self.blur_deadline = None;
        self.snapshot.take()
    }

    pub(crate) fn finish_commit(&mut self) {
        self.state = FocusState::Idle;
    }

    /// Drops focus without committing and cancels the timer.
    pub(crate) fn reset(&mut self) {
        self.state = FocusState::Idle;
        self.snapshot = None;
        self.blur_deadline = None;
    }
}
