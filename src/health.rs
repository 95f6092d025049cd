//! Health-check driver: connectivity, system resources,
//! services, containers, and (optionally) monitoring endpoints,
//! run through Ansible against a deployed environment.

use crate::ansible::Ansible;
use crate::error::{OpsError, OpsResult};
use crate::project::ProjectLayout;
use crate::report::Reporter;

type Check = fn(&dyn Reporter, &Ansible) -> bool;

/// Run the health checks for one environment. Endpoint probes
/// are skippable and never fail the run on their own.
pub fn run(
    ui: &dyn Reporter,
    layout: &ProjectLayout,
    environment: &str,
    skip_endpoints: bool,
) -> OpsResult<()> {
    ui.section(&format!(
        "Running health checks for environment: {environment}"
    ));

    let ansible = Ansible::new(&layout.ansible_dir(), environment);
    ansible.require_inventory()?;

    let mut checks: Vec<(&str, Check)> = vec![
        ("connectivity", connectivity),
        ("system resources", system_resources),
        ("services", services),
        ("docker containers", containers),
    ];
    if !skip_endpoints {
        checks.push(("monitoring endpoints", endpoints));
    }

    let mut failed = Vec::new();
    for (name, check) in checks {
        ui.section(&format!("--- Running {name} check ---"));
        if !check(ui, &ansible) {
            failed.push(name);
        }
    }

    ui.section("Health check summary:");
    if failed.is_empty() {
        ui.success("All health checks passed");
        return Ok(());
    }

    ui.fail(&format!("{} health check(s) failed:", failed.len()));
    for name in &failed {
        ui.fail(&format!("  {name}"));
    }
    ui.warn("Tips:");
    ui.warn("  check server connectivity and SSH access");
    ui.warn("  verify services are running: systemctl status <service>");
    ui.warn("  check logs: journalctl -u <service> --tail 50");

    Err(OpsError::ChecksFailed(failed.len()))
}

fn connectivity(ui: &dyn Reporter, ansible: &Ansible) -> bool {
    ui.step("Checking server connectivity...");
    ansible.ping("all").is_ok()
}

fn system_resources(ui: &dyn Reporter, ansible: &Ansible) -> bool {
    let commands = [
        ("disk usage", "df -h | head -5"),
        ("memory usage", "free -h"),
        ("system uptime", "uptime"),
        ("load average", "cat /proc/loadavg"),
    ];

    let mut ok = true;
    for (name, command) in commands {
        ui.step(&format!("Checking {name}..."));
        if ansible.shell("all", command).is_err() {
            ok = false;
        }
    }
    ok
}

fn services(ui: &dyn Reporter, ansible: &Ansible) -> bool {
    let mut ok = true;
    for unit in ["ssh", "docker"] {
        ui.step(&format!("Checking {unit} service..."));
        if ansible.service_started(unit).is_err() {
            ok = false;
        }
    }
    ok
}

fn containers(ui: &dyn Reporter, ansible: &Ansible) -> bool {
    let commands = [
        (
            "container status",
            "docker ps --format 'table {{.Names}}\\t{{.Status}}\\t{{.Ports}}'",
        ),
        (
            "container health",
            "docker ps --filter health=healthy --format 'table {{.Names}}\\t{{.Status}}'",
        ),
    ];

    let mut ok = true;
    for (name, command) in commands {
        ui.step(&format!("Checking {name}..."));
        if ansible.shell("all", command).is_err() {
            ok = false;
        }
    }
    ok
}

/// Endpoints may still be warming up after a deploy, so a failed
/// probe is logged as a warning only.
fn endpoints(ui: &dyn Reporter, ansible: &Ansible) -> bool {
    let endpoints = [
        ("Grafana (port 3000)", "http://localhost:3000/api/health"),
        ("Prometheus (port 9090)", "http://localhost:9090/-/ready"),
        ("Loki (port 3100)", "http://localhost:3100/ready"),
    ];

    for (name, url) in endpoints {
        ui.step(&format!("Checking {name}..."));
        if ansible.uri(url, 10).is_err() {
            ui.warn(&format!("{name} may not be responding"));
        }
    }
    true
}
