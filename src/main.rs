//! kube-e2e - End-to-end tests for services on Kubernetes
//!
//! Renders manifest templates, applies them with kubectl, probes the
//! deployed service over HTTP until the response matches, then deletes the
//! manifests again.

use clap::Parser;
use kube_e2e::commands::{Commands, RunArgs};
use kube_e2e::common::{logging, paths::HomeDir};
use kube_e2e::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kube-e2e", about = "End-to-end test runner for Kubernetes services")]
#[command(version, long_about = None)]
struct Cli {
    /// Test home holding config.yaml, templates/ and deps/
    /// (default: the directory of this executable)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Show debug diagnostics on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write diagnostics to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose, cli.log_file.as_deref());

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));

    let result = match HomeDir::resolve(cli.home) {
        Ok(home) => cli::dispatch(home, command).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
