//! # Core Domain Layer
//!
//! Business logic for the SMS Bridge reverse-verification service:
//! challenge issuance, the inbound SMS validation pipeline, one-time
//! credential submission, the hot-path sync and cold-path audit worker
//! logic, and the power-down resilience state machine.
//!
//! The core crate is storage-agnostic: the fast store (Redis) and the
//! durable store (MySQL) are reached exclusively through the traits in
//! [`stores`] and [`repositories`], which the infrastructure crate
//! implements.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod settings;
pub mod stores;
