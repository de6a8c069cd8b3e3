//! Unit tests for the sync worker service

mod mocks;
mod service_tests;
