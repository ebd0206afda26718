//! kube-e2e - End-to-end test runner for services on Kubernetes
//!
//! This library renders manifest templates, applies them to a cluster,
//! verifies the deployed service over HTTP, and tears everything down
//! again.

pub mod cli;
pub mod cluster;
pub mod commands;
pub mod common;
pub mod manifest;
pub mod testing;
pub mod verify;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{RunSummary, Runner, TestCase};
