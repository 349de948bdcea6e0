#![forbid(unsafe_code)]

//! Tombola runtime collaborators.
//!
//! Everything the engine treats as external: bounded undo/redo history,
//! key-value storage with memory and JSON-file backends, the saved-wheel
//! library, and the last-result log. The host wires these to the engine
//! by dispatching drained [`WheelEvent`]s — history listens to
//! `StateChanged`, the results log to `SpinEnded`.
//!
//! [`WheelEvent`]: tombola_core::event::WheelEvent

pub mod history;
pub mod results;
pub mod saved;
pub mod storage;

pub use history::{DEFAULT_CAPACITY, HistoryManager, Snapshot};
pub use results::ResultsLog;
pub use saved::{SavedWheel, SavedWheelsError, SavedWheelsManager};
#[cfg(feature = "persistence")]
pub use storage::FileStore;
pub use storage::{MemoryStore, Storage, StorageBackend, StorageError, StorageResult};
