//! CLI command handling
//!
//! Builds the runner stages from the home directory and settings, then
//! dispatches the parsed command.

use colored::Colorize;

use crate::cluster::Kubectl;
use crate::commands::{Commands, RunArgs};
use crate::common::config::{Overrides, Settings};
use crate::common::paths::HomeDir;
use crate::common::Result;
use crate::manifest::Renderer;
use crate::testing::{self, report, Runner, TestCase};
use crate::verify::HttpProbe;

/// Name shown in report lines that belong to no test case
const SETUP: &str = "test setup";

/// Dispatch a CLI command
pub async fn dispatch(home: HomeDir, command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run(home, args).await,
        Commands::List => list(home),
        Commands::Render { identifiers } => render(home, &identifiers),
    }
}

/// Run the suite
pub async fn run(home: HomeDir, args: RunArgs) -> Result<()> {
    let settings = Settings::load()?.with_overrides(Overrides {
        retries: args.retries,
        retry_interval_secs: args.interval,
        request_timeout_secs: args.timeout,
        insecure: args.insecure,
        kubectl: args.kubectl,
    })?;
    tracing::debug!(?settings, home = %home.root().display(), "Starting run");

    let renderer = Renderer::load(home)?;
    let cases = load_cases(&renderer)?;
    let cases = testing::filter_cases(cases, &args.cases)?;

    let cluster = Kubectl::from_env(&settings.kubectl)?;
    let probe = HttpProbe::new(settings.request_timeout(), settings.insecure)?;

    Runner::new(renderer, cluster, probe, &settings)
        .run(&cases)
        .await
        .map(|_| ())
}

/// Print the name and context of every test case
fn list(home: HomeDir) -> Result<()> {
    let renderer = Renderer::load(home)?;
    let cases = load_cases(&renderer)?;

    for case in &cases {
        println!("{}", case.name.white().bold());
        if !case.context.is_empty() {
            println!("    context: {}", case.context.join(", ").dimmed());
        }
        println!(
            "    {} {}",
            case.request.method.to_ascii_uppercase().cyan(),
            case.request.url
        );
    }
    Ok(())
}

/// Render templates without touching the cluster
fn render(home: HomeDir, identifiers: &[String]) -> Result<()> {
    let renderer = Renderer::load(home)?;
    for identifier in identifiers {
        let path = renderer.render(identifier)?;
        report::ok(identifier, &format!("Generated {}", path.display()));
    }
    Ok(())
}

fn load_cases(renderer: &Renderer) -> Result<Vec<TestCase>> {
    report::note(SETUP, "Loading test cases...");
    let (path, cases) = testing::load_test_cases(renderer)?;
    report::ok(
        SETUP,
        &format!("Loaded {} test cases from {}", cases.len(), path.display()),
    );
    Ok(cases)
}
