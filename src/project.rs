//! Project layout and precondition checks.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{OpsError, OpsResult};

/// Paths every deployable project must carry. One list checked
/// by one utility, replacing a per-script exists-or-fail copy.
pub const REQUIRED_FILES: &[&str] = &[
    "ansible/playbooks/site.yml",
    "ansible/inventories/hosts.yml",
    "ansible/roles/caddy/tasks/main.yml",
    "ansible/roles/docker/tasks/main.yml",
    "ansible/roles/monitoring/tasks/main.yml",
    "ansible/roles/caddy/templates/Caddyfile.j2",
];

/// Root of a managed project: the directory holding `ansible/`.
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Locate the project root by walking up from the current
    /// directory.
    pub fn discover() -> OpsResult<Self> {
        Self::discover_from(&env::current_dir()?)
    }

    /// Walk up from `start` until a directory containing
    /// `ansible/` is found.
    pub fn discover_from(start: &Path) -> OpsResult<Self> {
        let mut dir = start.to_path_buf();
        loop {
            if dir.join("ansible").is_dir() {
                return Ok(Self { root: dir });
            }
            if !dir.pop() {
                return Err(OpsError::FileNotFound(format!(
                    "ansible directory (searched upward from {})",
                    start.display()
                )));
            }
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn ansible_dir(&self) -> PathBuf {
        self.root.join("ansible")
    }

    /// Compose directory of the local test environment.
    #[must_use]
    pub fn test_env_dir(&self) -> PathBuf {
        self.root.join("docker").join("test-environment")
    }

    #[must_use]
    pub fn monitoring_templates_dir(&self) -> PathBuf {
        self.root
            .join("ansible")
            .join("roles")
            .join("monitoring")
            .join("templates")
    }

    /// Required paths that are missing, in declaration order.
    #[must_use]
    pub fn missing_files(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|path| !self.root.join(path).exists())
            .map(|path| (*path).to_string())
            .collect()
    }

    /// Fail on the first missing required path.
    pub fn require_files(&self, required: &[&str]) -> OpsResult<()> {
        self.missing_files(required)
            .into_iter()
            .next()
            .map_or(Ok(()), |missing| Err(OpsError::FileNotFound(missing)))
    }
}
