//! Unit tests for credential submission
