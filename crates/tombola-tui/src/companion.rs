#![forbid(unsafe_code)]

//! The companion: a small mascot that reacts to the wheel.
//!
//! A pure state machine: moods change on wheel events and decay back to
//! idle on a timer; long inactivity sends it to sleep. The host calls
//! [`Companion::tick`] every frame and redraws when it reports a
//! change.

use std::time::Duration;

/// How long excitement lasts.
const EXCITED_FOR: Duration = Duration::from_secs(2);
/// How long the post-result cheer lasts.
const CHEER_FOR: Duration = Duration::from_secs(4);
/// Idle time before falling asleep.
const SLEEP_AFTER: Duration = Duration::from_secs(30);
/// How long a speech bubble stays up.
const BUBBLE_FOR: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Idle,
    Excited,
    Cheering,
    Sleeping,
}

#[derive(Debug)]
pub struct Companion {
    visible: bool,
    mood: Mood,
    mood_left: Option<Duration>,
    idle_for: Duration,
    bubble: Option<(String, Duration)>,
}

impl Companion {
    pub fn new() -> Self {
        Self {
            visible: false,
            mood: Mood::Idle,
            mood_left: None,
            idle_for: Duration::ZERO,
            bubble: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.wake();
            self.say("Hi there!");
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn bubble(&self) -> Option<&str> {
        self.bubble.as_ref().map(|(text, _)| text.as_str())
    }

    /// Glyph for the current mood.
    pub fn glyph(&self) -> &'static str {
        match self.mood {
            Mood::Idle => "(o.o)",
            Mood::Excited => "(O.O)",
            Mood::Cheering => "\\(^o^)/",
            Mood::Sleeping => "(-.-)zZ",
        }
    }

    pub fn on_spin_started(&mut self) {
        self.wake();
        self.set_mood(Mood::Excited, Some(EXCITED_FOR));
        self.say("Here we go!");
    }

    pub fn on_spin_ended(&mut self, winner: &str) {
        self.wake();
        self.set_mood(Mood::Cheering, Some(CHEER_FOR));
        self.say(&format!("{winner}! What a pick!"));
    }

    pub fn on_option_added(&mut self) {
        self.wake();
        self.set_mood(Mood::Excited, Some(EXCITED_FOR));
        self.say("Ooh, a new choice!");
    }

    pub fn on_option_removed(&mut self) {
        self.wake();
        self.say("Bye bye!");
    }

    /// Advance timers. Returns `true` when something visible changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.visible {
            return false;
        }
        let mut changed = false;

        if let Some(left) = self.mood_left {
            match left.checked_sub(dt) {
                Some(rest) if !rest.is_zero() => self.mood_left = Some(rest),
                _ => {
                    self.mood = Mood::Idle;
                    self.mood_left = None;
                    changed = true;
                }
            }
        }

        if let Some((_, left)) = &mut self.bubble {
            match left.checked_sub(dt) {
                Some(rest) if !rest.is_zero() => *left = rest,
                _ => {
                    self.bubble = None;
                    changed = true;
                }
            }
        }

        if self.mood == Mood::Idle {
            self.idle_for += dt;
            if self.idle_for >= SLEEP_AFTER {
                self.mood = Mood::Sleeping;
                changed = true;
            }
        }

        changed
    }

    fn wake(&mut self) {
        self.idle_for = Duration::ZERO;
        if self.mood == Mood::Sleeping {
            self.mood = Mood::Idle;
        }
    }

    /// Replace the speech bubble; an earlier bubble's timer never
    /// outlives its text.
    fn say(&mut self, text: &str) {
        if self.visible {
            self.bubble = Some((text.to_string(), BUBBLE_FOR));
        }
    }

    fn set_mood(&mut self, mood: Mood, expiry: Option<Duration>) {
        self.mood = mood;
        self.mood_left = expiry;
    }
}

impl Default for Companion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible() -> Companion {
        let mut companion = Companion::new();
        companion.toggle();
        companion
    }

    #[test]
    fn starts_hidden_and_idle() {
        let companion = Companion::new();
        assert!(!companion.is_visible());
        assert_eq!(companion.mood(), Mood::Idle);
    }

    #[test]
    fn excitement_decays_to_idle() {
        let mut companion = visible();
        companion.on_spin_started();
        assert_eq!(companion.mood(), Mood::Excited);

        companion.tick(EXCITED_FOR + Duration::from_millis(1));
        assert_eq!(companion.mood(), Mood::Idle);
    }

    #[test]
    fn cheer_after_result() {
        let mut companion = visible();
        companion.on_spin_ended("cake");
        assert_eq!(companion.mood(), Mood::Cheering);
        assert!(companion.bubble().unwrap().contains("cake"));
    }

    #[test]
    fn falls_asleep_when_ignored() {
        let mut companion = visible();
        companion.tick(Duration::from_millis(1)); // consume the greeting
        for _ in 0..31 {
            companion.tick(Duration::from_secs(1));
        }
        assert_eq!(companion.mood(), Mood::Sleeping);
    }

    #[test]
    fn activity_wakes_it_up() {
        let mut companion = visible();
        companion.tick(SLEEP_AFTER);
        assert_eq!(companion.mood(), Mood::Sleeping);

        companion.on_option_added();
        assert_ne!(companion.mood(), Mood::Sleeping);
    }

    #[test]
    fn bubble_expires() {
        let mut companion = visible();
        companion.on_option_removed();
        assert!(companion.bubble().is_some());
        companion.tick(BUBBLE_FOR + Duration::from_millis(1));
        assert!(companion.bubble().is_none());
    }

    #[test]
    fn new_bubble_replaces_old_timer() {
        let mut companion = visible();
        companion.on_option_removed();
        companion.tick(Duration::from_millis(2900));
        companion.on_option_added();
        // The fresh bubble gets a full timer, not the stale remainder.
        companion.tick(Duration::from_millis(200));
        assert_eq!(companion.bubble(), Some("Ooh, a new choice!"));
    }

    #[test]
    fn hidden_companion_ignores_ticks() {
        let mut companion = Companion::new();
        assert!(!companion.tick(Duration::from_secs(60)));
        assert_eq!(companion.mood(), Mood::Idle);
    }
}
