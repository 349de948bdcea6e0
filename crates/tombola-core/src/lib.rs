#![forbid(unsafe_code)]

//! Tombola engine: the wheel-of-choices core.
//!
//! Renderer-agnostic and I/O-free. The host owns the frame loop and the
//! terminal; this crate owns the option model, arc geometry, weighted
//! selection, and the spin/auto-rotate state machine. Each frame the
//! host calls [`Wheel::advance`] with the elapsed time, redraws if it
//! returned `true`, and dispatches the drained [`WheelEvent`]s to its
//! collaborators.

pub mod animation;
pub mod arc;
pub mod config;
pub mod event;
pub mod logging;
pub mod option;
pub mod pick;
pub mod spin;
pub mod wheel;

pub use config::{SpinConfig, WheelConfig};
pub use event::{StateChange, WheelEvent};
pub use option::WheelOption;
pub use wheel::Wheel;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
