#![forbid(unsafe_code)]

//! Saved wheels: named option sets persisted through [`Storage`].
//!
//! Snapshots always capture the **base** option list, never the
//! suspense-expanded duplicates. Loading a wheel re-enables every
//! option, resets suspense to 1, and becomes the reference point for
//! dirty tracking.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use tombola_core::option::WheelOption;
use tombola_core::wheel::Wheel;

use crate::storage::Storage;

/// Storage key for the saved wheel list.
pub const SAVED_WHEELS_KEY: &str = "tombola-saved-wheels";
/// Storage key for the exit-time unsaved-state stash.
pub const UNSAVED_STATE_KEY: &str = "tombola-unsaved-state";

/// A persisted wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWheel {
    pub id: u64,
    pub name: String,
    pub options: Vec<WheelOption>,
}

/// Errors surfaced to the user as messages, never as crashes.
#[derive(Debug)]
pub enum SavedWheelsError {
    /// Saving with existing wheels but none selected.
    NoSelection,
    /// Imported JSON is missing or malformed.
    InvalidFormat(String),
}

impl fmt::Display for SavedWheelsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SavedWheelsError::NoSelection => {
                write!(f, "no wheel selected; pick one from the list or start a new wheel")
            }
            SavedWheelsError::InvalidFormat(msg) => write!(f, "invalid wheel data: {msg}"),
        }
    }
}

impl std::error::Error for SavedWheelsError {}

/// JSON shape for import/export.
#[derive(Serialize, Deserialize)]
struct WheelPayload {
    #[serde(default)]
    name: Option<String>,
    options: Vec<WheelOption>,
}

/// Exit-time stash of an unsaved edit session.
#[derive(Serialize, Deserialize)]
struct UnsavedState {
    options: Vec<WheelOption>,
    timestamp_ms: u64,
}

#[derive(Debug, Default)]
pub struct SavedWheelsManager {
    wheels: Vec<SavedWheel>,
    current_id: Option<u64>,
    /// Serialized base options at the last save/load, for dirty
    /// tracking.
    last_saved: Option<String>,
}

impl SavedWheelsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the saved list from storage. Unreadable data degrades to an
    /// empty list.
    pub fn load(&mut self, storage: &Storage) {
        self.wheels = storage
            .get(SAVED_WHEELS_KEY)
            .and_then(|value| match serde_json::from_value(value) {
                Ok(wheels) => Some(wheels),
                Err(e) => {
                    tracing::warn!(error = %e, "saved wheels unreadable, starting empty");
                    None
                }
            })
            .unwrap_or_default();
    }

    fn persist(&self, storage: &Storage) -> bool {
        storage.set(SAVED_WHEELS_KEY, &self.wheels)
    }

    pub fn wheels(&self) -> &[SavedWheel] {
        &self.wheels
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current_id
    }

    /// 1 + the highest `"Wheel <n>"` already in the list.
    pub fn next_wheel_number(&self) -> u32 {
        self.wheels
            .iter()
            .filter_map(|w| w.name.strip_prefix("Wheel ")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }

    fn fresh_id(&self) -> u64 {
        let mut id = now_ms();
        while self.wheels.iter().any(|w| w.id == id) {
            id += 1;
        }
        id
    }

    /// Capture the wheel's base options as a saved entry, keeping the
    /// selected wheel's id and name when one is selected.
    pub fn snapshot(&self, wheel: &Wheel) -> SavedWheel {
        let (id, name) = match self
            .current_id
            .and_then(|id| self.wheels.iter().find(|w| w.id == id))
        {
            Some(existing) => (existing.id, existing.name.clone()),
            None => (
                self.fresh_id(),
                format!("Wheel {}", self.next_wheel_number()),
            ),
        };
        SavedWheel {
            id,
            name,
            options: wheel.base().to_vec(),
        }
    }

    /// Save the wheel's current options over the selected entry, or as a
    /// first entry when the list is empty.
    pub fn save_current(
        &mut self,
        wheel: &mut Wheel,
        storage: &Storage,
    ) -> Result<(), SavedWheelsError> {
        let snapshot = self.snapshot(wheel);
        let existing = self
            .current_id
            .and_then(|id| self.wheels.iter().position(|w| w.id == id));

        match existing {
            Some(index) => self.wheels[index] = snapshot,
            None => {
                if self.wheels.is_empty() {
                    self.current_id = Some(snapshot.id);
                    self.wheels.push(snapshot);
                } else {
                    return Err(SavedWheelsError::NoSelection);
                }
            }
        }

        self.persist(storage);
        self.mark_saved(wheel);
        wheel.clear_new_option_flag();
        Ok(())
    }

    /// Load a saved wheel into the live state. All loaded options come
    /// back enabled and suspense resets to 1.
    pub fn load_wheel(&mut self, wheel: &mut Wheel, id: u64) -> bool {
        let Some(saved) = self.wheels.iter().find(|w| w.id == id) else {
            return false;
        };
        let options: Vec<WheelOption> = saved
            .options
            .iter()
            .map(|opt| WheelOption {
                enabled: true,
                ..opt.clone()
            })
            .collect();

        self.current_id = Some(id);
        wheel.set_options(options);
        wheel.set_suspense(1);
        self.mark_saved(wheel);
        wheel.clear_new_option_flag();
        true
    }

    /// Create, select, and load a fresh wheel seeded with the
    /// placeholder defaults.
    pub fn add_new(&mut self, wheel: &mut Wheel, storage: &Storage) -> u64 {
        let id = self.fresh_id();
        let entry = SavedWheel {
            id,
            name: format!("Wheel {}", self.next_wheel_number()),
            options: wheel.defaults().to_vec(),
        };
        self.wheels.push(entry);
        self.current_id = Some(id);
        self.persist(storage);

        wheel.reset_to_default();
        wheel.set_suspense(1);
        self.mark_saved(wheel);
        wheel.clear_new_option_flag();
        id
    }

    pub fn delete(&mut self, id: u64, storage: &Storage) -> bool {
        let before = self.wheels.len();
        self.wheels.retain(|w| w.id != id);
        if self.wheels.len() == before {
            return false;
        }
        if self.current_id == Some(id) {
            self.current_id = None;
        }
        self.persist(storage);
        true
    }

    pub fn rename(&mut self, id: u64, name: &str, storage: &Storage) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.wheels.iter_mut().find(|w| w.id == id) {
            Some(saved) => {
                saved.name = name.to_string();
                self.persist(storage);
                true
            }
            None => false,
        }
    }

    /// Whether the live base options differ from the last saved/loaded
    /// state. Always false before anything was saved or loaded.
    pub fn has_unsaved_changes(&self, wheel: &Wheel) -> bool {
        match &self.last_saved {
            Some(saved) => serialize_options(wheel.base()).as_deref() != Some(saved.as_str()),
            None => false,
        }
    }

    fn mark_saved(&mut self, wheel: &Wheel) {
        self.last_saved = serialize_options(wheel.base());
    }

    // -----------------------------------------------------------------------
    // Import / export
    // -----------------------------------------------------------------------

    /// Serialize the live base options (with the selected wheel's name)
    /// as pretty JSON.
    pub fn export_json(&self, wheel: &Wheel) -> Option<String> {
        let name = self
            .current_id
            .and_then(|id| self.wheels.iter().find(|w| w.id == id))
            .map(|w| w.name.clone())
            .unwrap_or_else(|| "Exported wheel".to_string());
        let payload = WheelPayload {
            name: Some(name),
            options: wheel.base().to_vec(),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                None
            }
        }
    }

    /// Import a wheel from JSON: validate, store under a fresh id (name
    /// collisions fall back to `"Wheel N"`), select it, and load it into
    /// the live state. Returns the imported wheel's name.
    pub fn import_json(
        &mut self,
        wheel: &mut Wheel,
        storage: &Storage,
        json: &str,
    ) -> Result<String, SavedWheelsError> {
        let payload: WheelPayload = serde_json::from_str(json)
            .map_err(|e| SavedWheelsError::InvalidFormat(e.to_string()))?;

        let name = match payload.name {
            Some(name)
                if !name.trim().is_empty() && !self.wheels.iter().any(|w| w.name == name) =>
            {
                name
            }
            _ => format!("Wheel {}", self.next_wheel_number()),
        };

        let mut options = payload.options;
        for opt in &mut options {
            opt.normalize();
            opt.enabled = true;
        }

        let id = self.fresh_id();
        self.wheels.push(SavedWheel {
            id,
            name: name.clone(),
            options,
        });
        self.persist(storage);
        self.load_wheel(wheel, id);
        Ok(name)
    }

    // -----------------------------------------------------------------------
    // Unsaved-state stash
    // -----------------------------------------------------------------------

    /// Stash the live options at exit, but only when an edit session is
    /// actually worth recovering: a new option was added, the state is
    /// dirty, and it is not the placeholder set.
    pub fn stash_unsaved(&self, wheel: &Wheel, storage: &Storage) -> bool {
        if !(wheel.has_new_option() && self.has_unsaved_changes(wheel) && !wheel.uses_defaults()) {
            return false;
        }
        storage.set(
            UNSAVED_STATE_KEY,
            &UnsavedState {
                options: wheel.base().to_vec(),
                timestamp_ms: now_ms(),
            },
        )
    }

    /// Pop the stashed options from a previous session, if any. The
    /// stash is cleared either way.
    pub fn take_unsaved(&self, storage: &Storage) -> Option<Vec<WheelOption>> {
        let stashed = storage.get(UNSAVED_STATE_KEY);
        storage.remove(UNSAVED_STATE_KEY);

        let state: UnsavedState = serde_json::from_value(stashed?).ok()?;
        if state.options.is_empty() {
            return None;
        }
        Some(state.options)
    }
}

fn serialize_options(options: &[WheelOption]) -> Option<String> {
    serde_json::to_string(options).ok()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
