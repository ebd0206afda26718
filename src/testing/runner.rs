//! Test runner implementation
//!
//! Each test case goes through setup (render and apply every context
//! manifest), a verification loop with a fixed retry budget, and teardown
//! (delete every context manifest). Teardown runs whenever setup
//! succeeded, whatever the verification outcome. The first error ends the
//! whole run.

use std::path::PathBuf;
use std::time::Duration;

use crate::cluster::Cluster;
use crate::common::config::Settings;
use crate::common::{Error, Result};
use crate::manifest::Renderer;
use crate::verify::Probe;

use super::config::TestCase;
use super::report;

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
}

/// Resources applied for one test case
///
/// Returned by a successful setup; consumed by [`Deployment::teardown`].
#[derive(Debug)]
#[must_use = "an applied deployment must be torn down"]
pub struct Deployment {
    name: String,
    manifests: Vec<PathBuf>,
}

impl Deployment {
    pub fn manifests(&self) -> &[PathBuf] {
        &self.manifests
    }

    /// Delete every manifest, in the order they were applied
    pub async fn teardown<C: Cluster + ?Sized>(self, cluster: &C) -> Result<()> {
        for manifest in &self.manifests {
            cluster.delete(&self.name, manifest).await?;
        }
        Ok(())
    }
}

/// Runs test cases one after another against a cluster and a probe
pub struct Runner<C, P> {
    renderer: Renderer,
    cluster: C,
    probe: P,
    retries: u32,
    retry_interval: Duration,
}

impl<C: Cluster, P: Probe> Runner<C, P> {
    pub fn new(renderer: Renderer, cluster: C, probe: P, settings: &Settings) -> Self {
        Self {
            renderer,
            cluster,
            probe,
            retries: settings.retries.max(1),
            retry_interval: settings.retry_interval(),
        }
    }

    /// Run every case in order, stopping at the first failure
    pub async fn run(&self, cases: &[TestCase]) -> Result<RunSummary> {
        let mut summary = RunSummary {
            total: cases.len(),
            passed: 0,
        };

        for case in cases {
            self.run_case(case).await?;
            summary.passed += 1;
        }

        report::ok(
            "test summary",
            &format!("{} of {} test cases passed", summary.passed, summary.total),
        );
        Ok(summary)
    }

    /// Run a single case: setup, verification loop, teardown
    pub async fn run_case(&self, case: &TestCase) -> Result<()> {
        report::note(&case.name, &format!("Testing {}", case.name));

        let deployment = self.setup(case).await?;
        let verified = self.verify_with_retries(case).await;
        let torn_down = deployment.teardown(&self.cluster).await;

        if let (Err(_), Err(e)) = (&verified, &torn_down) {
            tracing::warn!(case = %case.name, error = %e, "Teardown failed after verification failure");
        }
        verified.and(torn_down)
    }

    /// Render and apply each context manifest in declared order
    ///
    /// On failure nothing is torn down.
    pub async fn setup(&self, case: &TestCase) -> Result<Deployment> {
        let mut manifests = Vec::with_capacity(case.context.len());

        for identifier in &case.context {
            report::warn(&case.name, &format!("Generating ... {}", identifier));
            let manifest = self.renderer.render(identifier)?;
            report::ok(&case.name, &format!("Generated {}", manifest.display()));

            self.cluster.apply(&case.name, &manifest).await?;
            manifests.push(manifest);
        }

        Ok(Deployment {
            name: case.name.clone(),
            manifests,
        })
    }

    /// Verify until the probe passes or the retry budget is spent
    pub async fn verify_with_retries(&self, case: &TestCase) -> Result<()> {
        for attempt in 1..=self.retries {
            tracing::debug!(case = %case.name, attempt, "Verifying");
            let outcome = self
                .probe
                .verify(&case.name, &case.request, &case.response)
                .await;

            if outcome.passed {
                report::ok(&case.name, &outcome.message);
                return Ok(());
            }
            report::fail(&case.name, &outcome.message);

            if attempt == self.retries {
                break;
            }
            tokio::time::sleep(self.retry_interval).await;
            // counts down from the full budget
            let remaining = self.retries - attempt + 1;
            report::warn(&case.name, &format!("Another retry: {}", remaining));
        }

        report::fail(&case.name, "Timeout for testing... quit.");
        Err(Error::Timeout {
            name: case.name.clone(),
            attempts: self.retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::paths::HomeDir;
    use crate::testing::config::parse_test_cases;
    use crate::verify::Verification;
    use crate::testing::{ExpectedResponse, RequestSpec};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every call; fails the calls whose manifest stem is listed
    #[derive(Default)]
    struct MockCluster {
        calls: Mutex<Vec<String>>,
        fail_apply: Vec<&'static str>,
        fail_delete: Vec<&'static str>,
    }

    impl MockCluster {
        fn record(&self, action: &str, manifest: &Path, failing: &[&str]) -> Result<()> {
            let stem = manifest.file_stem().unwrap().to_string_lossy().into_owned();
            self.calls.lock().unwrap().push(format!("{} {}", action, stem));
            if failing.contains(&stem.as_str()) {
                return Err(Error::cluster_command(action, manifest, "boom"));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Cluster for MockCluster {
        async fn apply(&self, _name: &str, manifest: &Path) -> Result<()> {
            self.record("apply", manifest, &self.fail_apply)
        }

        async fn delete(&self, _name: &str, manifest: &Path) -> Result<()> {
            self.record("delete", manifest, &self.fail_delete)
        }
    }

    /// Fails the first `failures` attempts, then passes
    struct MockProbe {
        failures: usize,
        attempts: AtomicUsize,
    }

    impl MockProbe {
        fn failing(failures: usize) -> Self {
            Self {
                failures,
                attempts: AtomicUsize::new(0),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Probe for MockProbe {
        async fn verify(
            &self,
            _name: &str,
            _request: &RequestSpec,
            _expected: &ExpectedResponse,
        ) -> Verification {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                Verification::fail("Status code unexpected: expected: 200, actually: 404")
            } else {
                Verification::pass("verified")
            }
        }
    }

    fn suite_home() -> (tempfile::TempDir, Renderer) {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(templates.join("gateway.yaml.j2"), "name: {{ gateway }}\n").unwrap();
        std::fs::write(templates.join("route.yaml.j2"), "kind: HTTPRoute\n").unwrap();
        std::fs::write(dir.path().join("config.yaml"), "gateway: gw\n").unwrap();
        let renderer = Renderer::load(HomeDir::new(dir.path())).unwrap();
        (dir, renderer)
    }

    fn cases() -> Vec<TestCase> {
        parse_test_cases(
            r#"
- name: first
  context: [gateway, route]
  request: {url: "http://127.0.0.1:1/"}
- name: second
  context: [gateway]
  request: {url: "http://127.0.0.1:1/"}
"#,
        )
        .unwrap()
    }

    fn settings(retries: u32) -> Settings {
        Settings {
            retries,
            retry_interval_secs: 0,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_case_passes_after_retries() {
        let (_dir, renderer) = suite_home();
        let runner = Runner::new(renderer, MockCluster::default(), MockProbe::failing(2), &settings(5));

        runner.run_case(&cases()[0]).await.unwrap();

        assert_eq!(runner.probe.attempts(), 3);
        assert_eq!(
            runner.cluster.calls(),
            vec!["apply gateway", "apply route", "delete gateway", "delete route"]
        );
    }

    #[tokio::test]
    async fn test_run_counts_cases() {
        let (_dir, renderer) = suite_home();
        let runner = Runner::new(renderer, MockCluster::default(), MockProbe::failing(0), &settings(5));

        let summary = runner.run(&cases()).await.unwrap();
        assert_eq!(summary, RunSummary { total: 2, passed: 2 });
        assert_eq!(runner.probe.attempts(), 2);
    }

    #[tokio::test]
    async fn test_timeout_tears_down_and_aborts_run() {
        let (_dir, renderer) = suite_home();
        let runner = Runner::new(
            renderer,
            MockCluster::default(),
            MockProbe::failing(usize::MAX),
            &settings(3),
        );

        let err = runner.run(&cases()).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { ref name, attempts: 3 } if name == "first"));

        assert_eq!(runner.probe.attempts(), 3);
        // the second case never starts
        assert_eq!(
            runner.cluster.calls(),
            vec!["apply gateway", "apply route", "delete gateway", "delete route"]
        );
    }

    #[tokio::test]
    async fn test_apply_failure_skips_verification_and_teardown() {
        let (_dir, renderer) = suite_home();
        let cluster = MockCluster {
            fail_apply: vec!["route"],
            ..Default::default()
        };
        let runner = Runner::new(renderer, cluster, MockProbe::failing(0), &settings(3));

        let err = runner.run(&cases()).await.unwrap_err();
        assert!(matches!(err, Error::ClusterCommand { .. }));

        assert_eq!(runner.probe.attempts(), 0);
        assert_eq!(runner.cluster.calls(), vec!["apply gateway", "apply route"]);
    }

    #[tokio::test]
    async fn test_render_failure_applies_nothing() {
        let (_dir, renderer) = suite_home();
        let runner = Runner::new(renderer, MockCluster::default(), MockProbe::failing(0), &settings(3));
        let case = parse_test_cases("- name: broken\n  context: [missing]\n  request: {url: \"http://x/\"}\n")
            .unwrap()
            .remove(0);

        assert!(runner.run_case(&case).await.is_err());
        assert!(runner.cluster.calls().is_empty());
        assert_eq!(runner.probe.attempts(), 0);
    }

    #[tokio::test]
    async fn test_teardown_failure_after_pass_is_error() {
        let (_dir, renderer) = suite_home();
        let cluster = MockCluster {
            fail_delete: vec!["gateway"],
            ..Default::default()
        };
        let runner = Runner::new(renderer, cluster, MockProbe::failing(0), &settings(3));

        let err = runner.run_case(&cases()[0]).await.unwrap_err();
        assert!(matches!(err, Error::ClusterCommand { ref action, .. } if action == "delete"));
        assert_eq!(
            runner.cluster.calls(),
            vec!["apply gateway", "apply route", "delete gateway"]
        );
    }

    #[tokio::test]
    async fn test_verification_error_wins_over_teardown_error() {
        let (_dir, renderer) = suite_home();
        let cluster = MockCluster {
            fail_delete: vec!["gateway"],
            ..Default::default()
        };
        let runner = Runner::new(renderer, cluster, MockProbe::failing(usize::MAX), &settings(2));

        let err = runner.run_case(&cases()[0]).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_case_without_context() {
        let (_dir, renderer) = suite_home();
        let runner = Runner::new(renderer, MockCluster::default(), MockProbe::failing(0), &settings(1));
        let case = parse_test_cases("- name: bare\n  request: {url: \"http://x/\"}\n")
            .unwrap()
            .remove(0);

        runner.run_case(&case).await.unwrap();
        assert!(runner.cluster.calls().is_empty());
    }
}
