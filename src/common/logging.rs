//! Logging and tracing configuration
//!
//! Tracing carries diagnostics (commands run, request attempts) to stderr
//! and optionally to a log file. The test report itself is printed by
//! `testing::report` and does not go through tracing.

use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for a CLI run
///
/// Logs are controlled by the `RUST_LOG` environment variable. Default
/// level is WARN; `verbose` raises this crate to DEBUG. When `log_file` is
/// given, a detailed copy of every event is appended to it.
pub fn init_cli(verbose: bool, log_file: Option<&Path>) {
    let default_directives = if verbose {
        "kube_e2e=debug,warn"
    } else {
        "kube_e2e=warn,warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let file_layer = log_file.and_then(|path| {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            ),
            Err(e) => {
                eprintln!("Warning: Could not open log file: {}", e);
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
