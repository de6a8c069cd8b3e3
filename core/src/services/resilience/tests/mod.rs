//! Unit tests for the power-down resilience manager

mod monitor_tests;
mod service_tests;
