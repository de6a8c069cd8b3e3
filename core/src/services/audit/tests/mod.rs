//! Unit tests for the cold-path audit worker
