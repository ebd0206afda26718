//! E2E Test Runner
//!
//! Loads the rendered test-case list and runs each case against the
//! cluster: apply its manifests, probe the service until the response
//! matches, then delete the manifests again.

mod config;
pub mod report;
mod runner;

pub use config::*;
pub use runner::{Deployment, RunSummary, Runner};
