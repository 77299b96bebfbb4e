//! Unit tests for the ansible-provision CLI
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod mocks;
