//! Shared utilities and common types for the SMS Bridge server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Utility functions (phone validation, masking, etc.)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AppConfig, CacheConfig, DatabaseConfig, Environment, ServerConfig};
pub use utils::phone;
