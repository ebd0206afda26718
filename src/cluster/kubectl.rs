//! kubectl-backed cluster access

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{Action, Cluster};
use crate::common::paths::kubeconfig_path;
use crate::common::{Error, Result};
use crate::testing::report;

/// Runs `kubectl --kubeconfig <path> apply|delete -f <manifest>`
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: PathBuf,
    kubeconfig: PathBuf,
}

impl Kubectl {
    pub fn new(program: impl Into<PathBuf>, kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            kubeconfig: kubeconfig.into(),
        }
    }

    /// Resolve `program` on PATH and take the kubeconfig from
    /// `KUBE_CONFIG_FILEPATH` (default `~/.kube/config`)
    pub fn from_env(program: &str) -> Result<Self> {
        let resolved =
            which::which(program).map_err(|_| Error::KubectlNotFound(program.to_string()))?;
        let kubeconfig = kubeconfig_path();
        tracing::debug!(
            program = %resolved.display(),
            kubeconfig = %kubeconfig.display(),
            "Using kubectl"
        );
        Ok(Self::new(resolved, kubeconfig))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn kubeconfig(&self) -> &Path {
        &self.kubeconfig
    }

    /// Human-readable command line for `action` on `manifest`
    pub fn command_line(&self, action: Action, manifest: &Path) -> String {
        format!(
            "{} --kubeconfig {} {} -f {}",
            self.program.display(),
            self.kubeconfig.display(),
            action,
            manifest.display()
        )
    }

    async fn run(&self, action: Action, name: &str, manifest: &Path) -> Result<()> {
        let cmd = self.command_line(action, manifest);
        report::warn(name, &format!("{} ... {}", action.progress(), cmd));
        tracing::debug!(%cmd, "Running kubectl");

        let output = Command::new(&self.program)
            .arg("--kubeconfig")
            .arg(&self.kubeconfig)
            .arg(action.as_str())
            .arg("-f")
            .arg(manifest)
            .stdin(Stdio::null())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::debug!(code = ?output.status.code(), "kubectl failed");
            report::fail(
                name,
                &format!("Failed to {}: {}", action.failure(), stderr.trim_end()),
            );
            return Err(Error::cluster_command(action.as_str(), manifest, &stderr));
        }

        report::ok(name, stdout.trim_end());
        Ok(())
    }
}

#[async_trait]
impl Cluster for Kubectl {
    async fn apply(&self, name: &str, manifest: &Path) -> Result<()> {
        self.run(Action::Apply, name, manifest).await
    }

    async fn delete(&self, name: &str, manifest: &Path) -> Result<()> {
        self.run(Action::Delete, name, manifest).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable shell script standing in for kubectl
    fn fake_kubectl(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("kubectl");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_command_line() {
        let kubectl = Kubectl::new("kubectl", "/home/u/.kube/config");
        assert_eq!(
            kubectl.command_line(Action::Apply, Path::new("/suite/deps/app.yaml")),
            "kubectl --kubeconfig /home/u/.kube/config apply -f /suite/deps/app.yaml"
        );
    }

    #[tokio::test]
    async fn test_apply_passes_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("args.log");
        let program = fake_kubectl(
            dir.path(),
            &format!("echo \"$@\" >> {}\necho created", log.display()),
        );

        let kubectl = Kubectl::new(program, "/tmp/kubeconfig");
        kubectl.apply("case", Path::new("deps/app.yaml")).await.unwrap();
        kubectl.delete("case", Path::new("deps/app.yaml")).await.unwrap();

        assert_eq!(
            fs::read_to_string(log).unwrap(),
            "--kubeconfig /tmp/kubeconfig apply -f deps/app.yaml\n\
             --kubeconfig /tmp/kubeconfig delete -f deps/app.yaml\n"
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_kubectl(dir.path(), "echo 'error: no objects passed to apply' >&2\nexit 1");

        let kubectl = Kubectl::new(program, "/tmp/kubeconfig");
        let err = kubectl
            .apply("case", Path::new("deps/app.yaml"))
            .await
            .unwrap_err();

        match err {
            Error::ClusterCommand { action, stderr, .. } => {
                assert_eq!(action, "apply");
                assert_eq!(stderr, "error: no objects passed to apply");
            }
            other => panic!("Expected ClusterCommand error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_env_missing_program() {
        let err = Kubectl::from_env("kubectl-that-does-not-exist-anywhere").unwrap_err();
        assert!(matches!(err, Error::KubectlNotFound(_)));
    }
}
