//! CLI command definitions
//!
//! Defines the clap commands for the test runner.

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the test suite
    Run(RunArgs),

    /// List the test cases of the suite
    List,

    /// Render templates into deps/ without applying them
    Render {
        /// Template identifiers (e.g. testcases, deployment)
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
}

/// Options for a suite run
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Only run the named test case (can be given multiple times)
    #[arg(long = "case", short = 'c')]
    pub cases: Vec<String>,

    /// Verification attempts per test case (default: 50)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Seconds between verification attempts (default: 2)
    #[arg(long)]
    pub interval: Option<u64>,

    /// HTTP request timeout in seconds (default: 2)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates from the service under test
    #[arg(long)]
    pub insecure: bool,

    /// kubectl program name or path (default: kubectl)
    #[arg(long)]
    pub kubectl: Option<String>,
}
