//! Unit tests for sidekick CLI
//!
//! These tests use simulated hosts and in-memory stores and run fast
//! without network or filesystem I/O.

mod mocks;
mod provision_flow;
