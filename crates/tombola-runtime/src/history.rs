#![forbid(unsafe_code)]

//! Undo/redo history for the wheel.
//!
//! Two bounded stacks of deep-copied snapshots. The host routes every
//! `StateChanged` event into [`HistoryManager::record`]; restores go
//! back out through [`Wheel::apply_snapshot`], which re-emits the same
//! signal tagged [`StateChange::Restore`] so it is never re-recorded.
//!
//! Snapshots never alias live wheel state: capture and restore both
//! deep-copy the option list.

use std::collections::VecDeque;
use std::time::SystemTime;

use tombola_core::event::StateChange;
use tombola_core::option::WheelOption;
use tombola_core::wheel::Wheel;

/// Default bound for both stacks.
pub const DEFAULT_CAPACITY: usize = 50;

/// An immutable deep copy of the undoable wheel state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub options: Vec<WheelOption>,
    pub uses_defaults: bool,
    pub suspense: u32,
    pub action: StateChange,
    pub at: SystemTime,
}

impl Snapshot {
    fn capture(wheel: &Wheel, action: StateChange) -> Self {
        Self {
            options: wheel.base().to_vec(),
            uses_defaults: wheel.uses_defaults(),
            suspense: wheel.suspense(),
            action,
            at: SystemTime::now(),
        }
    }

    /// Whether two snapshots describe the same undoable state. The
    /// suspense multiplier and action tag are carried but not compared,
    /// matching the no-op suppression rule.
    fn same_state(&self, other: &Self) -> bool {
        self.options == other.options && self.uses_defaults == other.uses_defaults
    }
}

#[derive(Debug)]
pub struct HistoryManager {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
    restoring: bool,
}

impl HistoryManager {
    /// A manager seeded with the wheel's current state as the initial
    /// entry.
    pub fn new(wheel: &Wheel) -> Self {
        Self::with_capacity(wheel, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(wheel: &Wheel, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut manager = Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
            restoring: false,
        };
        manager.undo.push_back(Snapshot::capture(wheel, StateChange::Load));
        manager
    }

    /// Record the wheel's current state. Returns whether a snapshot was
    /// actually pushed.
    ///
    /// Skipped while a restore is in progress, for `Restore`-tagged
    /// signals (the restore path re-enters here), and when the state
    /// equals the undo top (redundant signals must not pollute history).
    /// A successful record invalidates the redo stack.
    pub fn record(&mut self, wheel: &Wheel, action: StateChange) -> bool {
        if self.restoring || action == StateChange::Restore {
            return false;
        }

        let snapshot = Snapshot::capture(wheel, action);
        if let Some(top) = self.undo.back()
            && top.same_state(&snapshot)
        {
            return false;
        }

        self.undo.push_back(snapshot);
        if self.undo.len() > self.capacity {
            // Oldest entries fall off; undo depth is silently bounded.
            self.undo.pop_front();
        }
        self.redo.clear();

        tracing::debug!(?action, depth = self.undo.len(), "state recorded");
        true
    }

    /// Undo needs something below the current entry, and undoing out of
    /// the placeholder state is disallowed (there is nothing meaningful
    /// beneath it).
    pub fn can_undo(&self, wheel: &Wheel) -> bool {
        self.undo.len() > 1 && !wheel.uses_defaults()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Step back: push the live state onto redo, discard the top undo
    /// entry, restore the one beneath it.
    pub fn undo(&mut self, wheel: &mut Wheel) -> bool {
        if !self.can_undo(wheel) {
            return false;
        }

        self.redo.push(Snapshot::capture(wheel, StateChange::Restore));
        self.undo.pop_back();

        let Some(target) = self.undo.back().cloned() else {
            return false;
        };
        self.restore(wheel, &target);
        tracing::debug!(depth = self.undo.len(), "undo");
        true
    }

    /// Step forward through previously undone states.
    pub fn redo(&mut self, wheel: &mut Wheel) -> bool {
        let Some(target) = self.redo.pop() else {
            return false;
        };

        self.undo.push_back(target.clone());
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        self.restore(wheel, &target);
        tracing::debug!(depth = self.undo.len(), "redo");
        true
    }

    /// Drop all history and re-seed with the current state.
    pub fn clear(&mut self, wheel: &Wheel) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push_back(Snapshot::capture(wheel, StateChange::Load));
    }

    /// Number of entries on the undo stack (including the current
    /// state).
    pub fn depth(&self) -> usize {
        self.undo.len()
    }

    fn restore(&mut self, wheel: &mut Wheel, snapshot: &Snapshot) {
        self.restoring = true;
        wheel.apply_snapshot(
            snapshot.options.clone(),
            snapshot.uses_defaults,
            snapshot.suspense,
        );
        self.restoring = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
