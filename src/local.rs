//! Local end-to-end test driver.
//!
//! Boots a systemd container standing in for a VPS, waits for
//! the container and for sshd with the readiness poller,
//! installs an SSH key, runs the playbook against the test
//! inventory, then probes the published service ports.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::ansible::Ansible;
use crate::cmd;
use crate::docker::{self, Compose};
use crate::error::{OpsError, OpsResult};
use crate::http::HttpProbe;
use crate::poll::{Poller, ProbeReport, ProbeStatus, ReadyOutcome};
use crate::project::{ProjectLayout, REQUIRED_FILES};
use crate::report::Reporter;

/// Container backing the local test VPS. The compose file
/// publishes 2222→22, 3001→3000, 9091→9090, and 3101→3100.
pub const TEST_CONTAINER: &str = "test-vps";

/// Budget for individual compose and ad hoc Ansible commands.
const COMMAND_BUDGET: Duration = Duration::from_secs(300);

/// The full playbook run gets a larger budget than single commands.
const PLAYBOOK_BUDGET: Duration = Duration::from_secs(600);

/// Best-effort diagnostics must never stall a failing run.
const DIAGNOSTIC_BUDGET: Duration = Duration::from_secs(30);

const ENDPOINTS: &[(&str, &str, Option<&str>)] = &[
    ("Grafana", "https://localhost:3001", Some("grafana")),
    ("Prometheus", "https://localhost:9091", Some("prometheus")),
    ("Loki", "https://localhost:3101", None),
];

/// Run the full pipeline against the local test environment.
/// Stages run in fixed order; the first failure halts the run.
pub fn run(ui: &dyn Reporter, layout: &ProjectLayout) -> OpsResult<()> {
    ui.section("Starting local testing environment...");

    docker::daemon_reachable()?;
    ui.success("Docker CLI is working");

    layout.require_files(REQUIRED_FILES)?;

    let compose = Compose::new(&layout.test_env_dir()).timeout(COMMAND_BUDGET);

    // Leftovers from a previous run are fine to lose.
    let _ = compose.down();

    ui.section("Building test environment...");
    compose.up_build()?;

    wait_for_container(ui, &compose)?;
    wait_for_ssh(ui)?;
    setup_ssh_access(ui)?;

    ui.step("Waiting for services to stabilize...");
    thread::sleep(Duration::from_secs(5));

    let ansible = Ansible::new(&layout.ansible_dir(), "test").timeout(COMMAND_BUDGET);

    ui.section("Testing Ansible connectivity...");
    if let Err(e) = ansible.ad_hoc("vps", "ping", None, &["-vvv"]) {
        dump_connectivity_diagnostics(ui);
        return Err(e);
    }
    ui.success("Connectivity test passed");

    ui.section("Deploying configuration...");
    Ansible::new(&layout.ansible_dir(), "test")
        .timeout(PLAYBOOK_BUDGET)
        .playbook("playbooks/site.yml", &["-v"])?;
    ui.success("Deployment successful");

    ui.step("Waiting for services to start...");
    thread::sleep(Duration::from_secs(30));

    ui.section("Checking Docker containers...");
    ansible.shell("all", "docker ps --format 'table {{.Names}}\\t{{.Status}}'")?;

    check_endpoints(ui)?;

    ui.success("Local testing completed");
    ui.section("Services:");
    ui.step("Grafana:    https://localhost:3001 (admin/admin)");
    ui.step("Prometheus: https://localhost:9091");
    ui.step("Loki:       https://localhost:3101");
    ui.step("Clean up with: docker compose down (in docker/test-environment)");

    Ok(())
}

/// Wait for the test container to run and for systemd inside it
/// to finish booting. The probe is layered: the container can be
/// `Up` while systemd is still starting units.
fn wait_for_container(ui: &dyn Reporter, compose: &Compose) -> OpsResult<()> {
    ui.step(&format!("Waiting for {TEST_CONTAINER} to be ready..."));

    let poller = Poller::new(
        TEST_CONTAINER,
        Duration::from_secs(180),
        Duration::from_secs(3),
    )
    .starting_interval(Duration::from_secs(2));

    let outcome = poller.wait(
        ui,
        || {
            let report = docker::probe(TEST_CONTAINER);
            if report.status == ProbeStatus::Ready && !docker::systemd_ready(TEST_CONTAINER) {
                return ProbeReport::starting("systemd still initializing");
            }
            report
        },
        |_| {
            if let Ok(logs) = docker::logs(TEST_CONTAINER, 30) {
                ui.warn("Container logs:");
                eprintln!("{logs}");
            }
        },
    );

    match outcome {
        ReadyOutcome::Ready => {
            ui.success(&format!("{TEST_CONTAINER} systemd is ready"));
            Ok(())
        }
        ReadyOutcome::Exited { detail } => {
            let _ = compose.logs_tail(50);
            let _ = cmd::run_interactive_timeout(
                None,
                "docker",
                &["ps", "-a", "--filter", &format!("name={TEST_CONTAINER}")],
                DIAGNOSTIC_BUDGET,
            );
            Err(OpsError::ContainerExited {
                name: TEST_CONTAINER.to_string(),
                status: detail,
            })
        }
        ReadyOutcome::TimedOut { waited } => {
            let _ = compose.logs_tail(50);
            Err(OpsError::ReadinessTimeout {
                target: TEST_CONTAINER.to_string(),
                waited,
            })
        }
    }
}

/// Wait for sshd inside the container: unit active AND port 22
/// listening. An inactive unit gets a start request; the next
/// poll observes the result.
fn wait_for_ssh(ui: &dyn Reporter) -> OpsResult<()> {
    ui.step("Waiting for SSH service...");

    let poller = Poller::new("ssh", Duration::from_secs(60), Duration::from_secs(3));

    let outcome = poller.wait(
        ui,
        || {
            if !docker::service_active(TEST_CONTAINER, "ssh") {
                docker::start_service(TEST_CONTAINER, "ssh");
                return ProbeReport::starting("ssh not active, start requested");
            }
            if docker::port_listening(TEST_CONTAINER, 22) {
                ProbeReport::ready("active and listening")
            } else {
                ProbeReport::starting("ssh active but not listening yet")
            }
        },
        |_| {},
    );

    match outcome {
        ReadyOutcome::Ready => {
            ui.success("SSH service is active and listening");
            Ok(())
        }
        ReadyOutcome::Exited { detail } => {
            dump_ssh_diagnostics(ui);
            Err(OpsError::Other(format!("ssh probe reported exit: {detail}")))
        }
        ReadyOutcome::TimedOut { waited } => {
            dump_ssh_diagnostics(ui);
            Err(OpsError::ReadinessTimeout {
                target: "ssh".to_string(),
                waited,
            })
        }
    }
}

/// Install the local SSH public key as the container root's
/// authorized key so Ansible can connect over the published
/// port. Generates a key first if none exists.
fn setup_ssh_access(ui: &dyn Reporter) -> OpsResult<()> {
    ui.step("Setting up SSH access...");

    let home = std::env::var("HOME").map_err(|_| OpsError::EnvMissing("HOME".to_string()))?;
    let key_path = PathBuf::from(home).join(".ssh").join("id_rsa");

    if !key_path.exists() {
        ui.step("Generating SSH key...");
        let key = key_path.display().to_string();
        cmd::run("ssh-keygen", &["-t", "rsa", "-b", "2048", "-f", &key, "-N", ""])?;
    }

    let public_key = std::fs::read_to_string(key_path.with_extension("pub"))?;

    docker::exec(TEST_CONTAINER, &["mkdir", "-p", "/root/.ssh"])?;
    docker::exec_stdin(
        TEST_CONTAINER,
        "cat > /root/.ssh/authorized_keys",
        public_key.trim().as_bytes(),
    )?;
    docker::exec(TEST_CONTAINER, &["chmod", "600", "/root/.ssh/authorized_keys"])?;
    docker::exec(
        TEST_CONTAINER,
        &["chown", "root:root", "/root/.ssh/authorized_keys"],
    )?;

    ui.success("SSH access configured");
    Ok(())
}

/// The monitoring endpoints may still be warming up right after
/// the playbook finishes; unreachable is inconclusive, not a
/// failure.
fn check_endpoints(ui: &dyn Reporter) -> OpsResult<()> {
    ui.section("Testing HTTP endpoints...");

    let probe = HttpProbe::insecure(Duration::from_secs(15))?;

    for (name, url, expected) in ENDPOINTS {
        if probe.reachable(url, *expected) {
            ui.success(&format!("{name} is responding"));
        } else {
            ui.warn(&format!(
                "{name} test inconclusive (might need more startup time)"
            ));
        }
    }
    Ok(())
}

fn dump_ssh_diagnostics(ui: &dyn Reporter) {
    ui.warn("SSH service diagnostics:");

    let probes: &[&[&str]] = &[
        &["systemctl", "status", "ssh", "--no-pager", "-l"],
        &["journalctl", "-u", "ssh", "--no-pager", "-n", "20"],
        &["which", "sshd"],
        &["ls", "-la", "/etc/ssh/"],
    ];

    for probe in probes {
        if let Ok(captured) = docker::exec_timeout(TEST_CONTAINER, probe, Duration::from_secs(10))
        {
            if !captured.stdout.is_empty() {
                eprintln!("{}", captured.stdout);
            }
            if !captured.stderr.is_empty() {
                eprintln!("{}", captured.stderr);
            }
        }
    }
}

fn dump_connectivity_diagnostics(ui: &dyn Reporter) {
    ui.warn("Debugging SSH connection...");

    let _ = cmd::run_interactive_timeout(
        None,
        "ssh",
        &[
            "-o",
            "StrictHostKeyChecking=no",
            "-o",
            "UserKnownHostsFile=/dev/null",
            "-p",
            "2222",
            "root@localhost",
            "echo SSH connection works",
        ],
        DIAGNOSTIC_BUDGET,
    );
    let _ = cmd::run_interactive_timeout(
        None,
        "docker",
        &["exec", TEST_CONTAINER, "cat", "/root/.ssh/authorized_keys"],
        DIAGNOSTIC_BUDGET,
    );
    let _ = cmd::run_interactive_timeout(
        None,
        "docker",
        &["port", TEST_CONTAINER],
        DIAGNOSTIC_BUDGET,
    );
    let _ = cmd::run_interactive_timeout(
        None,
        "docker",
        &["exec", TEST_CONTAINER, "sh", "-c", "netstat -tlnp | grep :22"],
        DIAGNOSTIC_BUDGET,
    );
}
