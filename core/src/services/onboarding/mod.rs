//! Challenge issuance service

mod hash;
mod service;

#[cfg(test)]
mod tests;

pub use hash::{derive_token, hash_pin, is_valid_token_format};
pub use service::{ChallengeGrant, OnboardingService};
