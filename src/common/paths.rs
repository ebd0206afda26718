//! Test home and configuration paths
//!
//! A test home directory holds everything one suite needs:
//!
//! ```text
//! <home>/config.yaml              template values
//! <home>/templates/<id>.yaml.j2   manifest and test-case templates
//! <home>/deps/<id>.yaml           rendered output, overwritten each run
//! ```

use std::path::{Path, PathBuf};

/// Name used for the platform configuration directory
const APP_NAME: &str = "kube-e2e";

/// Environment variable naming the kubeconfig passed to kubectl
pub const KUBECONFIG_ENV: &str = "KUBE_CONFIG_FILEPATH";

/// Kubeconfig used when `KUBE_CONFIG_FILEPATH` is unset
pub const DEFAULT_KUBECONFIG: &str = "~/.kube/config";

/// Layout of a test home directory
#[derive(Debug, Clone)]
pub struct HomeDir {
    root: PathBuf,
}

impl HomeDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the home directory: an explicit path wins, otherwise the
    /// directory containing the running executable.
    pub fn resolve(explicit: Option<PathBuf>) -> std::io::Result<Self> {
        if let Some(root) = explicit {
            return Ok(Self::new(root));
        }
        let exe = std::env::current_exe()?;
        let root = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the template values document
    pub fn values_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    /// Path of the template for an identifier
    pub fn template_file(&self, identifier: &str) -> PathBuf {
        self.root
            .join("templates")
            .join(format!("{}.yaml.j2", identifier))
    }

    /// Directory receiving rendered manifests
    pub fn deps_dir(&self) -> PathBuf {
        self.root.join("deps")
    }

    /// Path of the rendered manifest for an identifier
    pub fn rendered_file(&self, identifier: &str) -> PathBuf {
        self.deps_dir().join(format!("{}.yaml", identifier))
    }
}

/// Expand a leading `~` to the current user's home directory
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, directories::BaseDirs::new()) {
        (Some(rest), Some(dirs)) if rest.is_empty() => dirs.home_dir().to_path_buf(),
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(path),
    }
}

/// Kubeconfig path from `KUBE_CONFIG_FILEPATH`, defaulting to `~/.kube/config`
pub fn kubeconfig_path() -> PathBuf {
    let raw = std::env::var(KUBECONFIG_ENV).unwrap_or_else(|_| DEFAULT_KUBECONFIG.to_string());
    expand_tilde(&raw)
}

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/kube-e2e/`
/// - macOS: `~/Library/Application Support/kube-e2e/`
/// - Windows: `%APPDATA%\kube-e2e\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the runner settings file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
