//! Unit tests for the validation pipeline
