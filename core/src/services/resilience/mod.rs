//! Power-down resilience: health monitoring, fallback mode, dump/replay

mod monitor;
mod service;

#[cfg(test)]
mod tests;

pub use monitor::{HealthMonitor, ResilienceState, Transition};
pub use service::{restore_on_startup, RecoveryOutcome, ResilienceService};
