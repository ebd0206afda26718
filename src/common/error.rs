//! Error types for the test runner
//!
//! Only fatal conditions live here. A response that does not match its
//! expectation is not an error: it is a failed [`Verification`] that the
//! runner retries.
//!
//! [`Verification`]: crate::verify::Verification

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the test runner
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Rendering Errors ===
    #[error("Failed to render template '{identifier}': {message}")]
    Template { identifier: String, message: String },

    // === Cluster Errors ===
    #[error("kubectl not found: '{0}' is not an executable on PATH")]
    KubectlNotFound(String),

    #[error("Failed to {action} '{manifest}': {stderr}")]
    ClusterCommand {
        action: String,
        manifest: String,
        stderr: String,
    },

    // === Test Errors ===
    #[error("Timeout for testing '{name}' after {attempts} attempts... quit.")]
    Timeout { name: String, attempts: u32 },

    #[error("No test case named '{0}'")]
    CaseNotFound(String),

    // === HTTP Errors ===
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a template error for the given identifier
    pub fn template<S: Into<String>>(identifier: &str, message: S) -> Self {
        Self::Template {
            identifier: identifier.to_string(),
            message: message.into(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a cluster command failure
    pub fn cluster_command(action: &str, manifest: &std::path::Path, stderr: &str) -> Self {
        Self::ClusterCommand {
            action: action.to_string(),
            manifest: manifest.display().to_string(),
            stderr: stderr.trim_end().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cluster_command_keeps_stderr_verbatim() {
        let err = Error::cluster_command(
            "apply",
            Path::new("deps/app.yaml"),
            "error: the server doesn't have a resource type \"foo\"\n",
        );
        assert_eq!(
            err.to_string(),
            "Failed to apply 'deps/app.yaml': error: the server doesn't have a resource type \"foo\""
        );
    }

    #[test]
    fn test_timeout_names_case() {
        let err = Error::Timeout {
            name: "basic-route".to_string(),
            attempts: 50,
        };
        assert!(err.to_string().contains("basic-route"));
        assert!(err.to_string().contains("50 attempts"));
    }
}
