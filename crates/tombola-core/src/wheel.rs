#![forbid(unsafe_code)]

//! The wheel state machine.
//!
//! Holds the user-edited base option list and the derived expanded list
//! (base repeated `suspense` times), drives the spin animation and idle
//! auto-rotation from a host-supplied `advance(dt)`, and queues
//! [`WheelEvent`]s for the host to dispatch.
//!
//! Invariants:
//! - `expanded.len() == base.len() * suspense`; the expanded list is
//!   rebuilt wholesale on every base/weight/suspense change, never
//!   patched.
//! - At most one animation driver is active: a running spin suspends
//!   auto-rotate, and `resume_idle` re-arms it only once the spin is
//!   gone.
//! - The rotation angle stays in [0, 2π) outside a running spin.

use std::time::Duration;

use rand::Rng;

use crate::arc::{normalize_angle, rotation_for_segment, segment_at};
use crate::config::WheelConfig;
use crate::event::{StateChange, WheelEvent};
use crate::option::{WheelOption, normalize_all};
use crate::pick::weighted_index;
use crate::spin::Spin;

#[derive(Debug)]
pub struct Wheel {
    base: Vec<WheelOption>,
    expanded: Vec<WheelOption>,
    defaults: Vec<WheelOption>,
    uses_defaults: bool,
    has_new_option: bool,
    suspense: u32,
    rotation: f64,
    auto_rotate: bool,
    spin: Option<Spin>,
    last_crossed: Option<usize>,
    last_winner: Option<usize>,
    config: WheelConfig,
    events: Vec<WheelEvent>,
}

impl Wheel {
    /// An empty wheel with no placeholder set.
    pub fn new() -> Self {
        Self::with_config(Vec::new(), WheelConfig::default())
    }

    /// A wheel seeded with a placeholder default set. The placeholder is
    /// shown until the first real option is added and restored when the
    /// list empties.
    pub fn with_defaults(defaults: Vec<WheelOption>) -> Self {
        Self::with_config(defaults, WheelConfig::default())
    }

    pub fn with_config(defaults: Vec<WheelOption>, config: WheelConfig) -> Self {
        let mut defaults = defaults;
        normalize_all(&mut defaults);
        let uses_defaults = !defaults.is_empty();
        let mut wheel = Self {
            base: defaults.clone(),
            expanded: Vec::new(),
            defaults,
            uses_defaults,
            has_new_option: false,
            suspense: 1,
            rotation: 0.0,
            auto_rotate: false,
            spin: None,
            last_crossed: None,
            last_winner: None,
            config,
            events: Vec::new(),
        };
        wheel.rebuild();
        wheel.events.clear();
        wheel
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn base(&self) -> &[WheelOption] {
        &self.base
    }

    pub fn expanded(&self) -> &[WheelOption] {
        &self.expanded
    }

    /// The placeholder default set (possibly empty).
    pub fn defaults(&self) -> &[WheelOption] {
        &self.defaults
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn suspense(&self) -> u32 {
        self.suspense
    }

    pub fn uses_defaults(&self) -> bool {
        self.uses_defaults
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    /// Index of the last spin's winner, into the expanded list.
    pub fn last_winner(&self) -> Option<usize> {
        self.last_winner
    }

    /// Whether a real (non-placeholder) set of options is loaded. The
    /// host gates the spin trigger on this.
    pub fn has_real_options(&self) -> bool {
        !self.uses_defaults && !self.expanded.is_empty()
    }

    /// Set once the first real option is added; the saved-wheels manager
    /// consumes it for unsaved-state tracking.
    pub fn has_new_option(&self) -> bool {
        self.has_new_option
    }

    pub fn clear_new_option_flag(&mut self) {
        self.has_new_option = false;
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    /// The segment currently under the pointer.
    pub fn segment_under_pointer(&self) -> Option<usize> {
        segment_at(&self.expanded, self.rotation)
    }

    /// The option currently under the pointer.
    pub fn current_option(&self) -> Option<&WheelOption> {
        self.segment_under_pointer().and_then(|i| self.expanded.get(i))
    }

    /// Drain queued events for dispatch. Called once per frame by the
    /// host.
    pub fn drain_events(&mut self) -> Vec<WheelEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Rebuild the expanded list from the base list and suspense
    /// multiplier.
    fn rebuild(&mut self) {
        self.expanded.clear();
        for _ in 0..self.suspense {
            self.expanded.extend(self.base.iter().cloned());
        }
        self.events.push(WheelEvent::OptionsChanged);
    }

    fn changed(&mut self, reason: StateChange) {
        self.rebuild();
        self.events.push(WheelEvent::StateChanged(reason));
    }

    /// Replace the base list wholesale, as on load/import. Clears the
    /// placeholder flag.
    pub fn set_options(&mut self, options: Vec<WheelOption>) {
        let mut options = options;
        normalize_all(&mut options);
        self.base = options;
        self.uses_defaults = false;
        self.last_winner = None;
        self.changed(StateChange::Load);
    }

    /// Append a unit-weight option. The first real addition clears the
    /// placeholder set. Blank text is a no-op.
    pub fn add_option(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if self.uses_defaults {
            self.base.clear();
            self.uses_defaults = false;
        }
        self.base.push(WheelOption::new(text));
        self.has_new_option = true;
        self.changed(StateChange::Add);
        self.events.push(WheelEvent::OptionAdded(text.to_string()));
        true
    }

    /// Remove by index into the **expanded** list. The base index is the
    /// expanded index divided by the suspense multiplier. If the base
    /// list empties and a placeholder set exists, it is restored.
    pub fn remove_option(&mut self, expanded_index: usize) -> bool {
        let base_index = expanded_index / self.suspense as usize;
        if base_index >= self.base.len() {
            return false;
        }
        self.base.remove(base_index);
        if self.base.is_empty() && !self.defaults.is_empty() {
            self.base = self.defaults.clone();
            self.uses_defaults = true;
        }
        self.last_winner = None;
        self.changed(StateChange::Remove);
        self.events.push(WheelEvent::OptionRemoved);
        true
    }

    /// Rename a base option. Blank or unchanged text is a no-op.
    pub fn rename_option(&mut self, base_index: usize, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        match self.base.get_mut(base_index) {
            Some(opt) if opt.text != text => {
                opt.text = text.to_string();
                self.changed(StateChange::Rename);
                true
            }
            _ => false,
        }
    }

    /// Toggle the ×2 boost on a base option.
    pub fn set_boosted(&mut self, base_index: usize, boosted: bool) -> bool {
        match self.base.get_mut(base_index) {
            Some(opt) => {
                opt.set_boosted(boosted);
                self.changed(StateChange::Boost);
                true
            }
            None => false,
        }
    }

    /// Set a base option's multiplier directly. Zero clamps to 1.
    pub fn set_multiplier(&mut self, base_index: usize, multiplier: u32) -> bool {
        match self.base.get_mut(base_index) {
            Some(opt) => {
                opt.multiplier = multiplier.max(1);
                self.changed(StateChange::Boost);
                true
            }
            None => false,
        }
    }

    /// Enable or disable a base option. Persisted metadata only; does
    /// not change layout or selection.
    pub fn set_enabled(&mut self, base_index: usize, enabled: bool) -> bool {
        match self.base.get_mut(base_index) {
            Some(opt) => {
                opt.enabled = enabled;
                self.changed(StateChange::Enable);
                true
            }
            None => false,
        }
    }

    /// Reorder: move the base option at `from` to position `to`.
    pub fn move_option(&mut self, from: usize, to: usize) -> bool {
        let len = self.base.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let opt = self.base.remove(from);
        self.base.insert(to, opt);
        self.changed(StateChange::Reorder);
        true
    }

    /// Set the suspense multiplier, clamped to `[1, suspense_limit]`.
    pub fn set_suspense(&mut self, suspense: u32) {
        self.suspense = suspense.clamp(1, self.config.suspense_limit);
        self.changed(StateChange::Suspense);
    }

    /// Restore the placeholder set, if one exists.
    pub fn reset_to_default(&mut self) -> bool {
        if self.defaults.is_empty() {
            return false;
        }
        self.base = self.defaults.clone();
        self.uses_defaults = true;
        self.changed(StateChange::Reset);
        true
    }

    /// Restore a history snapshot: replace the base list (or the
    /// placeholder set when the snapshot is the default state), the
    /// placeholder flag, and the suspense multiplier. Emits
    /// `StateChanged(Restore)`, which the history manager never records.
    pub fn apply_snapshot(
        &mut self,
        options: Vec<WheelOption>,
        uses_defaults: bool,
        suspense: u32,
    ) {
        if uses_defaults && !self.defaults.is_empty() {
            self.base = self.defaults.clone();
        } else {
            self.base = options;
        }
        self.uses_defaults = uses_defaults;
        self.suspense = suspense.clamp(1, self.config.suspense_limit);
        self.last_winner = None;
        self.changed(StateChange::Restore);
    }

    // -----------------------------------------------------------------------
    // Animation
    // -----------------------------------------------------------------------

    /// Start a spin. Rejected (returns `false`) while a spin is running
    /// or when there is nothing to land on.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.spin.is_some() || self.expanded.is_empty() {
            return false;
        }
        let Some(winner) = weighted_index(rng, &self.expanded) else {
            return false;
        };
        let Some(target) = rotation_for_segment(&self.expanded, winner) else {
            return false;
        };

        self.auto_rotate = false;
        // Seed crossing detection with the segment currently under the
        // pointer so the first frame doesn't fire a spurious tick.
        self.last_crossed = self.segment_under_pointer();
        self.spin = Some(Spin::plan(rng, &self.config.spin, self.rotation, target));

        #[cfg(feature = "tracing")]
        tracing::debug!(winner, target, "spin started");

        self.events.push(WheelEvent::SpinStarted);
        true
    }

    /// Enable idle auto-rotation. Ignored while a spin is running.
    pub fn resume_idle(&mut self) {
        if self.spin.is_none() {
            self.auto_rotate = true;
        }
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        if enabled {
            self.resume_idle();
        } else {
            self.auto_rotate = false;
        }
    }

    /// Advance the active animation driver by `dt`. Returns `true` when
    /// the wheel moved and needs a redraw.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if let Some(spin) = &mut self.spin {
            let done = spin.tick(dt);
            self.rotation = spin.angle();

            // Fire a tick exactly once per segment boundary crossing.
            if let Some(current) = segment_at(&self.expanded, self.rotation)
                && self.last_crossed != Some(current)
            {
                self.last_crossed = Some(current);
                self.events.push(WheelEvent::SegmentCrossed(current));
            }

            if done {
                self.spin = None;
                self.last_crossed = None;
                self.rotation = normalize_angle(self.rotation);
                // Resolve the winner from where the wheel actually
                // settled, tolerating floating-point drift.
                if let Some(index) = segment_at(&self.expanded, self.rotation)
                    && let Some(option) = self.expanded.get(index).cloned()
                {
                    self.last_winner = Some(index);

                    #[cfg(feature = "tracing")]
                    tracing::debug!(index, winner = %option.text, "spin ended");

                    self.events.push(WheelEvent::SpinEnded { index, option });
                }
            }
            true
        } else if self.auto_rotate {
            self.rotation =
                normalize_angle(self.rotation + self.config.rotation_speed * dt.as_secs_f64());
            true
        } else {
            false
        }
    }
}

impl Default for Wheel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::TAU;

    const FRAME: Duration = Duration::from_millis(16);

    fn texts(options: &[WheelOption]) -> Vec<&str> {
        options.iter().map(|o| o.text.as_str()).collect()
    }

    fn real_wheel(names: &[&str]) -> Wheel {
        let mut wheel = Wheel::new();
        wheel.set_options(names.iter().map(|&n| WheelOption::new(n)).collect());
        wheel.drain_events();
        wheel
    }

    fn run_to_completion(wheel: &mut Wheel) -> Vec<WheelEvent> {
        let mut events = Vec::new();
        for _ in 0..400 {
            wheel.advance(FRAME);
            events.extend(wheel.drain_events());
            if !wheel.is_spinning() {
                break;
            }
        }
        assert!(!wheel.is_spinning(), "spin did not complete");
        events
    }

    #[test]
    fn defaults_are_placeholder() {
        let wheel = Wheel::with_defaults(vec!["D".into(), "R".into()]);
        assert!(wheel.uses_defaults());
        assert!(!wheel.has_real_options());
        assert_eq!(wheel.expanded().len(), 2);
    }

    #[test]
    fn add_on_placeholder_clears_default_mode() {
        let mut wheel = Wheel::with_defaults(vec!["D".into(), "R".into(), "A".into()]);
        assert!(wheel.add_option("pizza"));
        assert!(!wheel.uses_defaults());
        assert_eq!(wheel.base().len(), 1);
        assert_eq!(wheel.base()[0].text, "pizza");
        assert!(wheel.has_real_options());
        assert!(wheel.has_new_option());
    }

    #[test]
    fn blank_add_is_rejected() {
        let mut wheel = Wheel::new();
        assert!(!wheel.add_option("   "));
        assert!(wheel.base().is_empty());
    }

    #[test]
    fn suspense_expands_in_list_order() {
        let mut wheel = real_wheel(&["X", "Y"]);
        assert_eq!(wheel.expanded().len(), 2);

        wheel.set_suspense(3);
        assert_eq!(wheel.expanded().len(), 6);
        assert_eq!(texts(wheel.expanded()), ["X", "Y", "X", "Y", "X", "Y"]);
    }

    #[test]
    fn suspense_one_is_identity() {
        let mut wheel = real_wheel(&["a", "b", "c"]);
        wheel.set_suspense(1);
        assert_eq!(wheel.expanded(), wheel.base());
    }

    #[test]
    fn suspense_clamps_to_limit() {
        let mut wheel = real_wheel(&["a"]);
        wheel.set_suspense(99);
        assert_eq!(wheel.suspense(), 5);
        wheel.set_suspense(0);
        assert_eq!(wheel.suspense(), 1);
    }

    #[test]
    fn remove_maps_expanded_index_to_base() {
        let mut wheel = real_wheel(&["X", "Y"]);
        wheel.set_suspense(3);
        // Expanded: [X, Y, X, Y, X, Y]. Base index = 4 / 3 = 1.
        assert!(wheel.remove_option(4));
        assert_eq!(texts(wheel.base()), ["X"]);
        assert_eq!(wheel.expanded().len(), 3);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut wheel = real_wheel(&["a"]);
        assert!(!wheel.remove_option(7));
        assert_eq!(wheel.base().len(), 1);
    }

    #[test]
    fn removing_last_option_restores_defaults() {
        let mut wheel = Wheel::with_defaults(vec!["D".into(), "R".into()]);
        wheel.add_option("only");
        wheel.drain_events();

        assert!(wheel.remove_option(0));
        assert!(wheel.uses_defaults());
        assert_eq!(texts(wheel.base()), ["D", "R"]);
    }

    #[test]
    fn rename_rejects_blank_and_unchanged() {
        let mut wheel = real_wheel(&["old"]);
        assert!(!wheel.rename_option(0, ""));
        assert!(!wheel.rename_option(0, "old"));
        assert!(wheel.rename_option(0, "new"));
        assert_eq!(wheel.base()[0].text, "new");
    }

    #[test]
    fn boost_propagates_to_expanded_copies() {
        let mut wheel = real_wheel(&["a", "b"]);
        wheel.set_suspense(2);
        wheel.set_boosted(1, true);
        for copy in [1, 3] {
            assert!(wheel.expanded()[copy].boosted);
            assert_eq!(wheel.expanded()[copy].multiplier, 2);
        }
    }

    #[test]
    fn move_option_reorders_base() {
        let mut wheel = real_wheel(&["a", "b", "c"]);
        assert!(wheel.move_option(0, 2));
        assert_eq!(texts(wheel.base()), ["b", "c", "a"]);
        assert!(!wheel.move_option(1, 1));
        assert!(!wheel.move_option(5, 0));
    }

    #[test]
    fn spin_rejected_when_empty_or_running() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wheel = Wheel::new();
        assert!(!wheel.spin(&mut rng));

        let mut wheel = real_wheel(&["a", "b"]);
        assert!(wheel.spin(&mut rng));
        assert!(!wheel.spin(&mut rng), "re-entrant spin must be rejected");
    }

    #[test]
    fn spin_suspends_auto_rotate() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wheel = real_wheel(&["a", "b"]);
        wheel.resume_idle();
        assert!(wheel.is_auto_rotating());

        wheel.spin(&mut rng);
        assert!(!wheel.is_auto_rotating());

        // resume_idle is ignored mid-spin.
        wheel.resume_idle();
        assert!(!wheel.is_auto_rotating());
    }

    #[test]
    fn spin_ends_with_winner_under_pointer() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut wheel = real_wheel(&["a", "b", "c"]);
        wheel.spin(&mut rng);

        let events = run_to_completion(&mut wheel);
        let ended = events.iter().find_map(|e| match e {
            WheelEvent::SpinEnded { index, option } => Some((*index, option.clone())),
            _ => None,
        });
        let (index, option) = ended.expect("missing SpinEnded");
        assert_eq!(wheel.segment_under_pointer(), Some(index));
        assert_eq!(wheel.last_winner(), Some(index));
        assert_eq!(option.text, wheel.expanded()[index].text);
    }

    #[test]
    fn single_option_always_wins() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut wheel = real_wheel(&["solo"]);
            wheel.spin(&mut rng);
            let events = run_to_completion(&mut wheel);
            let won = events.iter().any(|e| {
                matches!(e, WheelEvent::SpinEnded { index: 0, option } if option.text == "solo")
            });
            assert!(won, "seed {seed}");
        }
    }

    #[test]
    fn segment_ticks_fire_once_per_crossing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut wheel = real_wheel(&["a", "b", "c", "d"]);
        wheel.spin(&mut rng);

        let events = run_to_completion(&mut wheel);
        let crossings: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                WheelEvent::SegmentCrossed(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert!(!crossings.is_empty());
        for pair in crossings.windows(2) {
            assert_ne!(pair[0], pair[1], "tick double-fired: {crossings:?}");
        }
    }

    #[test]
    fn auto_rotate_advances_and_wraps() {
        let mut wheel = real_wheel(&["a", "b"]);
        wheel.resume_idle();

        assert!(wheel.advance(Duration::from_secs(1)));
        let speed = wheel.config().rotation_speed;
        assert!((wheel.rotation() - speed).abs() < 1e-9);

        // A long idle stretch must stay within [0, 2π).
        wheel.advance(Duration::from_secs(3600));
        assert!(wheel.rotation() >= 0.0 && wheel.rotation() < TAU);
    }

    #[test]
    fn advance_is_inert_when_idle_and_not_rotating() {
        let mut wheel = real_wheel(&["a"]);
        assert!(!wheel.advance(FRAME));
        assert_eq!(wheel.rotation(), 0.0);
    }

    #[test]
    fn resume_idle_after_spin() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut wheel = real_wheel(&["a", "b"]);
        wheel.spin(&mut rng);
        run_to_completion(&mut wheel);

        wheel.resume_idle();
        assert!(wheel.is_auto_rotating());
        assert!(wheel.advance(FRAME));
    }

    #[test]
    fn set_options_emits_load_change() {
        let mut wheel = Wheel::new();
        wheel.set_options(vec!["a".into()]);
        let events = wheel.drain_events();
        assert!(events.contains(&WheelEvent::StateChanged(StateChange::Load)));
        assert!(events.contains(&WheelEvent::OptionsChanged));
    }

    #[test]
    fn apply_snapshot_restores_defaults_from_own_copy() {
        let mut wheel = Wheel::with_defaults(vec!["D".into()]);
        wheel.add_option("real");
        wheel.drain_events();

        wheel.apply_snapshot(Vec::new(), true, 2);
        assert!(wheel.uses_defaults());
        assert_eq!(texts(wheel.base()), ["D"]);
        assert_eq!(wheel.suspense(), 2);
        let events = wheel.drain_events();
        assert!(events.contains(&WheelEvent::StateChanged(StateChange::Restore)));
    }

    #[test]
    fn snapshot_restore_does_not_alias() {
        let mut wheel = Wheel::new();
        let snapshot = vec![WheelOption::new("kept")];
        wheel.apply_snapshot(snapshot.clone(), false, 1);
        wheel.rename_option(0, "mutated");
        assert_eq!(snapshot[0].text, "kept");
    }
}
