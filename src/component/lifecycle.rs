//! Attach/detach phases.
//!
//! ```text
//! Uninitialized ──attach──▶ Attaching ──resolved──▶ Ready ──detach──▶ Detached
//!                               ▲                                        │
//!                               └──────────────── attach ────────────────┘
//! ```
//!
//! Nothing renders, persists, or emits before `Ready`. Value writes that
//! arrive earlier are buffered and replayed once, in order, on entering it.

use crate::node::WeakNode;
use crate::options::Setting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Attaching,
    Ready,
    Detached,
}

#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    phase: Phase,
    pending: Vec<Setting>,
    deferred: Option<Vec<WeakNode>>,
    seeded: bool,
}

impl Lifecycle {
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Enters `Attaching`. Returns false if already attaching or ready.
    pub(crate) fn begin_attach(&mut self) -> bool {
        match self.phase {
            Phase::Uninitialized | Phase::Detached => {
                self.phase = Phase::Attaching;
                true
            }
            Phase::Attaching | Phase::Ready => false,
        }
    }

    pub(crate) fn mark_ready(&mut self) {
        self.deferred = None;
        self.phase = Phase::Ready;
    }

    pub(crate) fn mark_detached(&mut self) {
        self.deferred = None;
        self.phase = Phase::Detached;
    }

    /// Holds host content until the next turn.
    pub(crate) fn defer(&mut self, children: Vec<WeakNode>) {
        self.deferred = Some(children);
    }

    pub(crate) fn take_deferred(&mut self) -> Option<Vec<WeakNode>> {
        self.deferred.take()
    }

    pub(crate) fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    pub(crate) fn buffer(&mut self, setting: Setting) {
        self.pending.push(setting);
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Setting> {
        std::mem::take(&mut self.pending)
    }

    /// Whether the initial value has been seeded. Seeding happens once per
    /// instance; a reattach keeps the value it had.
    pub(crate) fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub(crate) fn mark_seeded(&mut self) {
        self.seeded = true;
    }
}
