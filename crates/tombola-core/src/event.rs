#![forbid(unsafe_code)]

//! Notifications emitted by the wheel.
//!
//! The wheel pushes events into an internal queue; the host drains it
//! once per frame with [`Wheel::drain_events`] and dispatches each event
//! to at most one consumer per concern (history, persistence, UI
//! feedback). This replaces the original's broadcast DOM events with an
//! explicit channel owned by the engine.
//!
//! [`Wheel::drain_events`]: crate::wheel::Wheel::drain_events

use crate::option::WheelOption;

/// Why the wheel state changed. The history manager keys off this tag:
/// `Restore` marks a change produced by restoring a snapshot and is
/// never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Load,
    Add,
    Remove,
    Rename,
    Boost,
    Enable,
    Reorder,
    Suspense,
    Reset,
    Restore,
}

/// A fire-and-forget notification from the wheel.
#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    /// The expanded list was rebuilt; relayout and redraw.
    OptionsChanged,
    /// A new option was appended.
    OptionAdded(String),
    /// An option was removed.
    OptionRemoved,
    /// A spin started; auto-rotate is suspended.
    SpinStarted,
    /// The segment under the pointer changed mid-spin. Fires exactly
    /// once per crossing (tick/sound feedback).
    SegmentCrossed(usize),
    /// A spin finished. `index` is into the expanded list.
    SpinEnded { index: usize, option: WheelOption },
    /// The base list, a weight, or the suspense multiplier changed.
    StateChanged(StateChange),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_is_distinguishable() {
        assert_ne!(StateChange::Restore, StateChange::Load);
    }

    #[test]
    fn spin_ended_carries_the_option() {
        let ev = WheelEvent::SpinEnded {
            index: 2,
            option: WheelOption::new("winner"),
        };
        match ev {
            WheelEvent::SpinEnded { index, option } => {
                assert_eq!(index, 2);
                assert_eq!(option.text, "winner");
            }
            _ => unreachable!(),
        }
    }
}
