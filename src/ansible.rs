//! Ansible CLI wrapper.
//!
//! The orchestration tool is consumed as a black box: build the
//! argument list, run it, propagate the exit status. Playbook
//! semantics (idempotence, dependency ordering) stay entirely on
//! the Ansible side.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cmd;
use crate::error::{OpsError, OpsResult};

/// `ansible` / `ansible-playbook` invocations scoped to one
/// ansible directory and one inventory environment.
pub struct Ansible {
    dir: PathBuf,
    environment: String,
    timeout: Option<Duration>,
}

impl Ansible {
    #[must_use]
    pub fn new(dir: &Path, environment: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            environment: environment.to_string(),
            timeout: None,
        }
    }

    /// Wall-clock budget applied to every invocation. A run that
    /// exceeds it is killed and reported as a timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Inventory selector relative to the ansible directory.
    #[must_use]
    pub fn inventory(&self) -> String {
        format!("inventories/{}.yml", self.environment)
    }

    #[must_use]
    pub fn inventory_path(&self) -> PathBuf {
        self.dir.join(self.inventory())
    }

    /// Every invocation starts here: a run against a missing
    /// inventory would target nothing.
    pub fn require_inventory(&self) -> OpsResult<()> {
        let path = self.inventory_path();
        if path.exists() {
            Ok(())
        } else {
            Err(OpsError::FileNotFound(path.display().to_string()))
        }
    }

    /// Whether a playbook file exists under the ansible directory.
    #[must_use]
    pub fn has_playbook(&self, playbook: &str) -> bool {
        self.dir.join(playbook).exists()
    }

    /// Run a playbook with extra CLI flags, inheriting the
    /// terminal so Ansible's own task output stays visible.
    pub fn playbook(&self, playbook: &str, extra: &[&str]) -> OpsResult<()> {
        self.require_inventory()?;
        let inventory = self.inventory();
        let mut args = vec![playbook, "-i", inventory.as_str()];
        args.extend_from_slice(extra);
        self.invoke("ansible-playbook", &args)
    }

    pub fn syntax_check(&self) -> OpsResult<()> {
        self.playbook("playbooks/site.yml", &["--syntax-check"])
    }

    /// Dry run (`--check`): report what would change.
    pub fn dry_run(&self) -> OpsResult<()> {
        self.playbook("playbooks/site.yml", &["--check"])
    }

    pub fn apply(&self) -> OpsResult<()> {
        self.playbook("playbooks/site.yml", &[])
    }

    /// Run an ad hoc module against a host pattern.
    pub fn ad_hoc(
        &self,
        pattern: &str,
        module: &str,
        module_args: Option<&str>,
        extra: &[&str],
    ) -> OpsResult<()> {
        self.require_inventory()?;
        let inventory = self.inventory();
        let mut args = vec![pattern, "-i", inventory.as_str(), "-m", module];
        if let Some(module_args) = module_args {
            args.push("-a");
            args.push(module_args);
        }
        args.extend_from_slice(extra);
        self.invoke("ansible", &args)
    }

    /// Reachability ping against a host pattern.
    pub fn ping(&self, pattern: &str) -> OpsResult<()> {
        self.ad_hoc(pattern, "ping", None, &[])
    }

    /// Run a shell command on all hosts.
    pub fn shell(&self, pattern: &str, command: &str) -> OpsResult<()> {
        self.ad_hoc(pattern, "shell", Some(command), &[])
    }

    /// Assert a service is started on all hosts.
    pub fn service_started(&self, unit: &str) -> OpsResult<()> {
        let module_args = format!("name={unit} state=started");
        self.ad_hoc("all", "service", Some(&module_args), &[])
    }

    /// Probe an HTTP endpoint from the hosts themselves.
    pub fn uri(&self, url: &str, timeout_secs: u64) -> OpsResult<()> {
        let module_args = format!("url={url} timeout={timeout_secs}");
        self.ad_hoc("all", "uri", Some(&module_args), &[])
    }

    fn invoke(&self, program: &str, args: &[&str]) -> OpsResult<()> {
        match self.timeout {
            Some(timeout) => cmd::run_interactive_timeout(Some(&self.dir), program, args, timeout),
            None => cmd::run_interactive_in(Some(&self.dir), program, args),
        }
    }
}
