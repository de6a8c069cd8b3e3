//! Unit tests for the challenge issuance service
