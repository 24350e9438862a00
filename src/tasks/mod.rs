//! Background Tasks Module
//!
//! Long-running maintenance tasks spawned at startup.

mod sweep;

pub use sweep::spawn_sweep_task;
