//! Hot-path sync worker logic and the external backend seam

mod service;
mod traits;

#[cfg(test)]
mod tests;

pub use service::{SyncOutcome, SyncService};
pub use traits::SyncBackend;
