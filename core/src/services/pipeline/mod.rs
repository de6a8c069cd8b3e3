//! Inbound SMS validation pipeline

mod checks;
mod service;

#[cfg(test)]
mod tests;

pub use checks::{stage_plan, CheckKind, CheckStatus, PipelineReport, StageOutcome};
pub use service::{ProcessSms, SmsService};
