#![forbid(unsafe_code)]

//! The application host.
//!
//! Owns the wheel and its collaborators, maps key events to wheel
//! operations, and dispatches drained wheel events: `StateChanged` to
//! the history manager, `SpinEnded` to the results log and the result
//! overlay, everything interesting to the companion.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::SeedableRng;
use rand::rngs::StdRng;

use tombola_core::event::WheelEvent;
use tombola_core::option::WheelOption;
use tombola_core::wheel::Wheel;
use tombola_runtime::history::HistoryManager;
use tombola_runtime::results::ResultsLog;
use tombola_runtime::saved::SavedWheelsManager;
use tombola_runtime::storage::Storage;

use crate::companion::Companion;

/// Placeholder letters shown until the user adds real options.
pub const DEFAULT_OPTIONS: [&str; 7] = ["T", "O", "M", "B", "O", "L", "A"];

/// Where export writes and import reads.
pub const EXCHANGE_PATH: &str = "tombola-wheel.json";

const NOTICE_FOR: Duration = Duration::from_secs(3);

/// Input focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing a new option into the entry field.
    Adding { buffer: String },
    /// Editing the selected option's label in place.
    Renaming { buffer: String },
}

/// A destructive action awaiting a repeated keypress while there are
/// unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirm {
    LoadNext,
    NewWheel,
}

/// Transient status message. One slot: a new notice replaces the old
/// one and its deadline, so a stale timer never clears fresh text.
#[derive(Debug)]
pub struct Notice {
    pub text: String,
    pub error: bool,
    deadline: Instant,
}

pub struct App {
    pub wheel: Wheel,
    pub history: HistoryManager,
    pub saved: SavedWheelsManager,
    pub results: ResultsLog,
    pub companion: Companion,
    pub storage: Storage,
    pub mode: Mode,
    /// Cursor into the base option list.
    pub selected: usize,
    /// Winner text while the result overlay is open.
    pub result: Option<String>,
    pub notice: Option<Notice>,
    /// Seconds driving the boosted-segment rainbow.
    pub rainbow_time: f64,
    pub running: bool,
    rng: StdRng,
    confirm: Option<Confirm>,
    pending_restore: Option<Vec<WheelOption>>,
    bell_pending: bool,
    dirty: bool,
}

impl App {
    pub fn new(storage: Storage) -> Self {
        let mut wheel = Wheel::with_defaults(
            DEFAULT_OPTIONS.iter().map(|&s| WheelOption::new(s)).collect(),
        );
        wheel.resume_idle();
        wheel.drain_events();

        let history = HistoryManager::new(&wheel);
        let mut saved = SavedWheelsManager::new();
        saved.load(&storage);
        let mut results = ResultsLog::new();
        results.load(&storage);
        let pending_restore = saved.take_unsaved(&storage);

        let mut app = Self {
            wheel,
            history,
            saved,
            results,
            companion: Companion::new(),
            storage,
            mode: Mode::Normal,
            selected: 0,
            result: None,
            notice: None,
            rainbow_time: 0.0,
            running: true,
            rng: StdRng::from_os_rng(),
            confirm: None,
            pending_restore: None,
            bell_pending: false,
            dirty: true,
        };
        if pending_restore.is_some() {
            app.pending_restore = pending_restore;
            app.notify("Recovered unsaved options from last session - press y to restore");
        }
        app
    }

    /// Stash unsaved work on the way out.
    pub fn on_exit(&mut self) {
        self.saved.stash_unsaved(&self.wheel, &self.storage);
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a terminal bell should ring this frame (segment tick).
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    // -----------------------------------------------------------------------
    // Frame tick
    // -----------------------------------------------------------------------

    pub fn tick(&mut self, dt: Duration, now: Instant) {
        if self.wheel.advance(dt) {
            self.dirty = true;
        }

        if self.wheel.expanded().iter().any(|o| o.boosted) {
            self.rainbow_time += dt.as_secs_f64();
            self.dirty = true;
        }

        for event in self.wheel.drain_events() {
            self.dispatch(event);
        }

        if self.companion.tick(dt) {
            self.dirty = true;
        }

        if let Some(notice) = &self.notice
            && now >= notice.deadline
        {
            self.notice = None;
            self.dirty = true;
        }
    }

    fn dispatch(&mut self, event: WheelEvent) {
        self.dirty = true;
        match event {
            WheelEvent::OptionsChanged => {
                let len = self.wheel.base().len();
                if len > 0 {
                    self.selected = self.selected.min(len - 1);
                } else {
                    self.selected = 0;
                }
            }
            WheelEvent::StateChanged(reason) => {
                self.history.record(&self.wheel, reason);
            }
            WheelEvent::SpinStarted => {
                self.bell_pending = true;
                self.companion.on_spin_started();
            }
            WheelEvent::SegmentCrossed(_) => {
                self.bell_pending = true;
            }
            WheelEvent::SpinEnded { option, .. } => {
                self.results.record(&self.storage, &option.text);
                self.result = Some(option.text.clone());
                self.companion.on_spin_ended(&option.text);
            }
            WheelEvent::OptionAdded(_) => {
                self.companion.on_option_added();
            }
            WheelEvent::OptionRemoved => {
                self.companion.on_option_removed();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.dirty = true;

        // Editing is locked while the wheel spins; only quitting works.
        if self.wheel.is_spinning() {
            if matches!(key.code, KeyCode::Char('q')) {
                self.running = false;
            }
            return;
        }

        if self.result.is_some() {
            self.handle_result_key(key);
            return;
        }

        match &self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Adding { .. } => self.handle_adding_key(key),
            Mode::Renaming { .. } => self.handle_renaming_key(key),
        }
    }

    fn handle_result_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char(' ') => {
                self.dismiss_result();
            }
            KeyCode::Char('x') => {
                // Remove the winner from the wheel, then dismiss.
                if let Some(winner) = self.wheel.last_winner() {
                    self.wheel.remove_option(winner);
                }
                self.dismiss_result();
            }
            _ => {}
        }
    }

    fn dismiss_result(&mut self) {
        self.result = None;
        self.wheel.resume_idle();
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        // Undo/redo shortcuts, terminal style and classic style.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('z') => return self.undo(),
                KeyCode::Char('y') => return self.redo(),
                _ => {}
            }
        }

        let confirm = self.confirm.take();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('a') => self.mode = Mode::Adding { buffer: String::new() },
            KeyCode::Char('r') => {
                if let Some(opt) = self.wheel.base().get(self.selected) {
                    self.mode = Mode::Renaming { buffer: opt.text.clone() };
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.wheel.base().len();
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
            KeyCode::Char('K') => {
                if self.selected > 0 && self.wheel.move_option(self.selected, self.selected - 1) {
                    self.selected -= 1;
                }
            }
            KeyCode::Char('J') => {
                if self.wheel.move_option(self.selected, self.selected + 1) {
                    self.selected += 1;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if !self.wheel.uses_defaults() {
                    // The engine takes expanded indices; the first copy
                    // of the selected base option sits at selected ×
                    // suspense.
                    let expanded = self.selected * self.wheel.suspense() as usize;
                    self.wheel.remove_option(expanded);
                }
            }
            KeyCode::Char('b') => {
                if let Some(opt) = self.wheel.base().get(self.selected) {
                    let boosted = !opt.boosted;
                    self.wheel.set_boosted(self.selected, boosted);
                }
            }
            KeyCode::Char('e') => {
                if let Some(opt) = self.wheel.base().get(self.selected) {
                    let enabled = !opt.enabled;
                    self.wheel.set_enabled(self.selected, enabled);
                }
            }
            KeyCode::Char('+') | KeyCode::Char(']') => {
                self.wheel.set_suspense(self.wheel.suspense() + 1);
            }
            KeyCode::Char('-') | KeyCode::Char('[') => {
                self.wheel.set_suspense(self.wheel.suspense().saturating_sub(1));
            }
            KeyCode::Char(' ') => self.start_spin(),
            KeyCode::Char('u') => self.undo(),
            KeyCode::Char('U') => self.redo(),
            KeyCode::Char('s') => self.save_wheel(),
            KeyCode::Char('n') => self.new_wheel(confirm),
            KeyCode::Tab => self.load_next_wheel(confirm),
            KeyCode::Char('X') => self.delete_current_wheel(),
            KeyCode::Char('o') => self.export_wheel(),
            KeyCode::Char('p') => self.import_wheel(),
            KeyCode::Char('c') => self.companion.toggle(),
            KeyCode::Char('y') => self.restore_stashed(),
            _ => {}
        }
    }

    fn handle_adding_key(&mut self, key: KeyEvent) {
        let Mode::Adding { buffer } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let text = buffer.clone();
                // Stay in entry mode for rapid-fire additions.
                buffer.clear();
                self.wheel.add_option(&text);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
    }

    fn handle_renaming_key(&mut self, key: KeyEvent) {
        let Mode::Renaming { buffer } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let text = buffer.clone();
                self.mode = Mode::Normal;
                self.wheel.rename_option(self.selected, &text);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    fn start_spin(&mut self) {
        if !self.wheel.has_real_options() {
            self.warn("Add some options before spinning");
            return;
        }
        self.wheel.spin(&mut self.rng);
    }

    fn undo(&mut self) {
        if self.history.undo(&mut self.wheel) {
            self.notify("Undone");
        } else {
            self.warn("Nothing to undo");
        }
    }

    fn redo(&mut self) {
        if self.history.redo(&mut self.wheel) {
            self.notify("Redone");
        } else {
            self.warn("Nothing to redo");
        }
    }

    fn save_wheel(&mut self) {
        match self.saved.save_current(&mut self.wheel, &self.storage) {
            Ok(()) => self.notify("Wheel saved"),
            Err(e) => self.warn(&e.to_string()),
        }
    }

    fn new_wheel(&mut self, confirm: Option<Confirm>) {
        if self.saved.has_unsaved_changes(&self.wheel) && confirm != Some(Confirm::NewWheel) {
            self.confirm = Some(Confirm::NewWheel);
            self.warn("Unsaved changes - press n again to discard, s to save first");
            return;
        }
        self.saved.add_new(&mut self.wheel, &self.storage);
        self.notify("Started a new wheel");
    }

    fn load_next_wheel(&mut self, confirm: Option<Confirm>) {
        if self.saved.wheels().is_empty() {
            self.warn("No saved wheels yet - press s to save this one");
            return;
        }
        if self.saved.has_unsaved_changes(&self.wheel) && confirm != Some(Confirm::LoadNext) {
            self.confirm = Some(Confirm::LoadNext);
            self.warn("Unsaved changes - press Tab again to discard, s to save first");
            return;
        }

        let wheels = self.saved.wheels();
        let next_id = match self.saved.current_id() {
            Some(current) => {
                let pos = wheels.iter().position(|w| w.id == current).unwrap_or(0);
                wheels[(pos + 1) % wheels.len()].id
            }
            None => wheels[0].id,
        };
        if self.saved.load_wheel(&mut self.wheel, next_id) {
            let name = self
                .saved
                .wheels()
                .iter()
                .find(|w| w.id == next_id)
                .map(|w| w.name.clone())
                .unwrap_or_default();
            self.notify(&format!("Loaded {name}"));
        }
    }

    fn delete_current_wheel(&mut self) {
        match self.saved.current_id() {
            Some(id) => {
                self.saved.delete(id, &self.storage);
                self.notify("Wheel deleted");
            }
            None => self.warn("No wheel selected"),
        }
    }

    fn export_wheel(&mut self) {
        let Some(json) = self.saved.export_json(&self.wheel) else {
            self.warn("Export failed");
            return;
        };
        match std::fs::write(EXCHANGE_PATH, json) {
            Ok(()) => self.notify(&format!("Exported to {EXCHANGE_PATH}")),
            Err(e) => {
                tracing::warn!(error = %e, "export write failed");
                self.warn("Export failed");
            }
        }
    }

    fn import_wheel(&mut self) {
        let json = match std::fs::read_to_string(EXCHANGE_PATH) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "import read failed");
                self.warn(&format!("Nothing to import at {EXCHANGE_PATH}"));
                return;
            }
        };
        match self.saved.import_json(&mut self.wheel, &self.storage, &json) {
            Ok(name) => self.notify(&format!("Imported {name}")),
            Err(e) => self.warn(&e.to_string()),
        }
    }

    fn restore_stashed(&mut self) {
        match self.pending_restore.take() {
            Some(options) => {
                self.wheel.set_options(options);
                self.notify("Restored unsaved options");
            }
            None => self.warn("Nothing to restore"),
        }
    }

    // -----------------------------------------------------------------------
    // Notices
    // -----------------------------------------------------------------------

    fn notify(&mut self, text: &str) {
        self.set_notice(text, false);
    }

    fn warn(&mut self, text: &str) {
        self.set_notice(text, true);
    }

    fn set_notice(&mut self, text: &str, error: bool) {
        self.notice = Some(Notice {
            text: text.to_string(),
            error,
            deadline: Instant::now() + NOTICE_FOR,
        });
        self.dirty = true;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
