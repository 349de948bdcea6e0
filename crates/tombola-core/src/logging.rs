#![forbid(unsafe_code)]

//! Logging support.
//!
//! Re-exports the tracing macros when the `tracing` feature is enabled,
//! so hosts can instrument through this crate without a direct tracing
//! dependency. Engine-internal instrumentation is compiled out entirely
//! when the feature is off.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};
