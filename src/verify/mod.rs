//! Response verification
//!
//! A probe sends one request and compares the response against an
//! expectation. Mismatches and transport errors are ordinary results, not
//! errors: the runner retries them.

mod http;
mod include;

use async_trait::async_trait;

use crate::testing::{ExpectedResponse, RequestSpec};

pub use http::HttpProbe;
pub use include::{included, kind_of, mismatch, Mismatch};

/// Outcome of one verification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub passed: bool,
    pub message: String,
}

impl Verification {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

/// Something that can check a request against an expected response
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run one verification attempt for test case `name`
    async fn verify(
        &self,
        name: &str,
        request: &RequestSpec,
        expected: &ExpectedResponse,
    ) -> Verification;
}
