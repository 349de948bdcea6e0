#![forbid(unsafe_code)]

//! Last-result log.
//!
//! Remembers the most recent winner across sessions. An earlier release
//! stored a history array; that format is migrated to the single-string
//! form on load.

use serde_json::Value;

use tombola_core::wheel::Wheel;

use crate::storage::Storage;

/// Storage key for the last result.
pub const LAST_RESULT_KEY: &str = "tombola-last-result";

#[derive(Debug, Default)]
pub struct ResultsLog {
    last: Option<String>,
}

impl ResultsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the last result, migrating the legacy array format in
    /// place.
    pub fn load(&mut self, storage: &Storage) {
        self.last = match storage.get(LAST_RESULT_KEY) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Array(entries)) => {
                let migrated = entries
                    .first()
                    .and_then(|e| e.get("text"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if let Some(text) = &migrated {
                    storage.set_string(LAST_RESULT_KEY, text);
                }
                migrated
            }
            _ => None,
        };
    }

    /// Record a winner and persist it.
    pub fn record(&mut self, storage: &Storage, text: &str) {
        self.last = Some(text.to_string());
        storage.set_string(LAST_RESULT_KEY, text);
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// The result counter shows only when there is a result to show and
    /// the wheel holds real options.
    pub fn should_display(&self, wheel: &Wheel) -> bool {
        wheel.has_real_options() && self.last.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tombola_core::option::WheelOption;

    fn real_wheel() -> Wheel {
        let mut wheel = Wheel::new();
        wheel.set_options(vec![WheelOption::new("a")]);
        wheel
    }

    #[test]
    fn record_and_reload() {
        let storage = Storage::in_memory();
        let mut log = ResultsLog::new();
        log.record(&storage, "cake");

        let mut fresh = ResultsLog::new();
        fresh.load(&storage);
        assert_eq!(fresh.last(), Some("cake"));
    }

    #[test]
    fn legacy_array_format_is_migrated() {
        let storage = Storage::in_memory();
        storage.set(LAST_RESULT_KEY, &json!([{"text": "pie", "at": 123}]));

        let mut log = ResultsLog::new();
        log.load(&storage);
        assert_eq!(log.last(), Some("pie"));
        // Re-stored in the new format.
        assert_eq!(storage.get_string(LAST_RESULT_KEY).as_deref(), Some("pie"));
    }

    #[test]
    fn unreadable_value_means_no_result() {
        let storage = Storage::in_memory();
        storage.set(LAST_RESULT_KEY, &json!({"weird": true}));
        let mut log = ResultsLog::new();
        log.load(&storage);
        assert_eq!(log.last(), None);
    }

    #[test]
    fn display_needs_result_and_real_options() {
        let storage = Storage::in_memory();
        let mut log = ResultsLog::new();

        let wheel = real_wheel();
        assert!(!log.should_display(&wheel));

        log.record(&storage, "cake");
        assert!(log.should_display(&wheel));

        let placeholder = Wheel::with_defaults(vec![WheelOption::new("D")]);
        assert!(!log.should_display(&placeholder));
    }
}
