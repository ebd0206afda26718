//! Cluster access
//!
//! The runner only needs two operations on the cluster: create the
//! resources described by a rendered manifest, and delete them again.

mod kubectl;

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use crate::common::Result;

pub use kubectl::Kubectl;

/// Operation applied to a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Apply,
    Delete,
}

impl Action {
    /// kubectl subcommand for this action
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Apply => "apply",
            Action::Delete => "delete",
        }
    }

    /// Progress verb shown before the command runs
    fn progress(self) -> &'static str {
        match self {
            Action::Apply => "Deploying",
            Action::Delete => "Deleting",
        }
    }

    /// Verb used in failure lines
    fn failure(self) -> &'static str {
        match self {
            Action::Apply => "deploy",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can create and delete manifest resources
///
/// `name` is the test case on whose behalf the call is made; it labels the
/// report lines.
#[async_trait]
pub trait Cluster: Send + Sync {
    /// Create or update the resources in `manifest`
    async fn apply(&self, name: &str, manifest: &Path) -> Result<()>;

    /// Delete the resources in `manifest`
    async fn delete(&self, name: &str, manifest: &Path) -> Result<()>;
}
