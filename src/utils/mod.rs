// Utils compartidos

pub mod constants;
pub mod timers;

#[cfg(target_arch = "wasm32")]
pub mod leaflet_ffi;

pub use constants::*;
pub use timers::{IntervalHandle, LocalFuture, Scheduler};
