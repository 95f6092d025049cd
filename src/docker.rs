//! Docker CLI collaborators: the container state probe consumed
//! by the readiness poller, plus log, exec, and compose helpers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cmd::{self, Captured};
use crate::error::{OpsError, OpsResult};
use crate::poll::ProbeReport;

/// One line of `docker ps --format json` output.
#[derive(Debug, Deserialize)]
pub struct PsEntry {
    #[serde(rename = "Names")]
    pub names: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Probe the state of a container by name.
///
/// Probe invocation failures (daemon unreachable, CLI missing)
/// classify as `Absent` rather than erroring: a transient probe
/// failure during startup must not abort a readiness wait.
#[must_use]
pub fn probe(name: &str) -> ProbeReport {
    let filter = format!("name=^{name}$");
    let args = ["ps", "-a", "--filter", &filter, "--format", "json"];

    match cmd::capture("docker", &args) {
        Ok(captured) if captured.success() => classify(name, &parse_ps(&captured.stdout)),
        Ok(captured) => ProbeReport::absent(captured.stderr),
        Err(e) => ProbeReport::absent(e.to_string()),
    }
}

/// Classify `docker ps -a` entries for one container name.
#[must_use]
pub fn classify(name: &str, entries: &[PsEntry]) -> ProbeReport {
    let Some(entry) = entries.iter().find(|e| e.names == name) else {
        return ProbeReport::absent("no such container");
    };

    match entry.state.as_str() {
        "running" => ProbeReport::ready(entry.status.clone()),
        "exited" | "dead" => ProbeReport::exited(entry.status.clone()),
        // created, restarting, paused
        _ => ProbeReport::starting(entry.status.clone()),
    }
}

fn parse_ps(stdout: &str) -> Vec<PsEntry> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Fetch the last `tail` log lines of a container. Docker splits
/// container output across both streams, so they are merged.
pub fn logs(name: &str, tail: u32) -> OpsResult<String> {
    let tail = tail.to_string();
    let captured = cmd::capture("docker", &["logs", name, "--tail", &tail])?;
    Ok(format!("{}\n{}", captured.stdout, captured.stderr)
        .trim()
        .to_string())
}

/// Run a command inside a container and capture output. Fails on
/// a non-zero exit.
pub fn exec(name: &str, command: &[&str]) -> OpsResult<String> {
    let mut args = vec!["exec", name];
    args.extend_from_slice(command);
    cmd::run("docker", &args)
}

/// Run a command inside a container, bounded by a timeout, and
/// capture the result whatever its exit code.
pub fn exec_timeout(name: &str, command: &[&str], timeout: Duration) -> OpsResult<Captured> {
    let mut args = vec!["exec", name];
    args.extend_from_slice(command);
    cmd::capture_timeout("docker", &args, timeout)
}

/// Pipe `data` into a shell command inside a container.
pub fn exec_stdin(name: &str, shell_command: &str, data: &[u8]) -> OpsResult<()> {
    cmd::run_with_stdin(
        "docker",
        &["exec", "-i", name, "sh", "-c", shell_command],
        data,
    )?;
    Ok(())
}

/// systemd readiness inside a container. Exit code 0 is running
/// and 1 is degraded; degraded is accepted - one noisy unit must
/// not hold up the whole wait.
#[must_use]
pub fn systemd_ready(name: &str) -> bool {
    exec_timeout(
        name,
        &["systemctl", "is-system-running", "--wait"],
        Duration::from_secs(10),
    )
    .is_ok_and(|c| matches!(c.code(), Some(0 | 1)))
}

/// Whether a systemd unit reports active inside a container.
#[must_use]
pub fn service_active(name: &str, unit: &str) -> bool {
    exec_timeout(
        name,
        &["systemctl", "is-active", unit],
        Duration::from_secs(5),
    )
    .is_ok_and(|c| c.success() && c.stdout.contains("active"))
}

/// Attempt to start a systemd unit inside a container. Best
/// effort; the next poll observes the result.
pub fn start_service(name: &str, unit: &str) {
    let _ = exec_timeout(name, &["systemctl", "start", unit], Duration::from_secs(10));
}

/// Whether something inside the container listens on a TCP port.
#[must_use]
pub fn port_listening(name: &str, port: u16) -> bool {
    let pipeline = format!("netstat -tlnp | grep :{port}");
    exec_timeout(name, &["sh", "-c", &pipeline], Duration::from_secs(5))
        .is_ok_and(|c| c.success())
}

/// Check that the Docker daemon is reachable.
pub fn daemon_reachable() -> OpsResult<()> {
    let ok = cmd::capture_timeout("docker", &["info"], Duration::from_secs(10))
        .is_ok_and(|c| c.success());
    if ok {
        Ok(())
    } else {
        Err(OpsError::PrerequisiteMissing(
            "Docker daemon is not reachable (is Docker/Colima running?)".to_string(),
        ))
    }
}

/// Whether the docker client answers on this machine.
#[must_use]
pub fn client_ok() -> bool {
    cmd::capture_timeout(
        "docker",
        &["version", "--format", "{{.Client.Version}}"],
        Duration::from_secs(10),
    )
    .is_ok_and(|c| c.success())
}

/// Pull an image, reporting success as a boolean. Registries can
/// hang on a dead connection, so the pull carries its own budget.
#[must_use]
pub fn pull(image: &str) -> bool {
    cmd::capture_timeout("docker", &["pull", image], Duration::from_secs(300))
        .is_ok_and(|c| c.success())
}

/// `docker compose` scoped to one project directory.
pub struct Compose {
    dir: PathBuf,
    timeout: Option<Duration>,
}

impl Compose {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            timeout: None,
        }
    }

    /// Wall-clock budget applied to every compose invocation.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build and start the stack detached.
    pub fn up_build(&self) -> OpsResult<()> {
        self.invoke(&["compose", "up", "-d", "--build"])
    }

    /// Stop the stack and remove orphans.
    pub fn down(&self) -> OpsResult<()> {
        self.invoke(&["compose", "down", "--remove-orphans"])
    }

    /// Show the last `tail` lines of stack logs.
    pub fn logs_tail(&self, tail: u32) -> OpsResult<()> {
        let tail = tail.to_string();
        self.invoke(&["compose", "logs", "--tail", &tail])
    }

    fn invoke(&self, args: &[&str]) -> OpsResult<()> {
        match self.timeout {
            Some(timeout) => cmd::run_interactive_timeout(Some(&self.dir), "docker", args, timeout),
            None => cmd::run_interactive_in(Some(&self.dir), "docker", args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::ProbeStatus;

    fn entry(names: &str, state: &str, status: &str) -> PsEntry {
        PsEntry {
            names: names.to_string(),
            state: state.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn classify_running_is_ready() {
        let report = classify("test-vps", &[entry("test-vps", "running", "Up 3 seconds")]);

        assert_eq!(report.status, ProbeStatus::Ready);
        assert_eq!(report.detail, "Up 3 seconds");
    }

    #[test]
    fn classify_exited_is_terminal() {
        let report = classify(
            "test-vps",
            &[entry("test-vps", "exited", "Exited (1) 5 seconds ago")],
        );

        assert_eq!(report.status, ProbeStatus::Exited);
    }

    #[test]
    fn classify_created_is_starting() {
        let report = classify("test-vps", &[entry("test-vps", "created", "Created")]);

        assert_eq!(report.status, ProbeStatus::Starting);
    }

    #[test]
    fn classify_missing_is_absent() {
        let report = classify("test-vps", &[entry("other", "running", "Up 2 minutes")]);

        assert_eq!(report.status, ProbeStatus::Absent);
    }

    #[test]
    fn parse_ps_reads_json_lines() {
        let stdout = concat!(
            r#"{"Names":"test-vps","State":"running","Status":"Up 3 seconds"}"#,
            "\n",
            r#"{"Names":"grafana","State":"exited","Status":"Exited (0) 2 hours ago"}"#,
        );

        let entries = parse_ps(stdout);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].names, "test-vps");
        assert_eq!(entries[1].state, "exited");
    }
}
