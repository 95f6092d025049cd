//! Deployment driver: check, plan, apply, or clean up one
//! inventory environment.

use clap::ValueEnum;

use crate::ansible::Ansible;
use crate::cmd;
use crate::error::OpsResult;
use crate::project::ProjectLayout;
use crate::report::Reporter;

/// What to run against the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Playbook syntax check only.
    Check,
    /// Dry run reporting what would change.
    Plan,
    /// Apply the configuration.
    Apply,
    /// Run the cleanup playbook if the project has one.
    Cleanup,
}

/// Run one deployment action. Every stage failure propagates;
/// only the optional cleanup playbook is best effort.
pub fn run(
    ui: &dyn Reporter,
    layout: &ProjectLayout,
    environment: &str,
    action: Action,
) -> OpsResult<()> {
    ui.section(&format!(
        "Starting deployment for environment: {environment}"
    ));

    cmd::require_tools(&["ansible-playbook"])?;

    let ansible = Ansible::new(&layout.ansible_dir(), environment);

    match action {
        Action::Check => {
            ui.section("Checking Ansible syntax...");
            ansible.syntax_check()?;
        }
        Action::Plan => {
            ui.section("Running Ansible dry-run...");
            ansible.dry_run()?;
        }
        Action::Apply => {
            ui.section("Deploying configuration with Ansible...");
            ansible.apply()?;
        }
        Action::Cleanup => {
            ui.section("Running cleanup playbook...");
            if ansible.has_playbook("playbooks/cleanup.yml") {
                // Cleanup is optional; a failed cleanup must not
                // fail the run.
                if let Err(e) = ansible.playbook("playbooks/cleanup.yml", &[]) {
                    ui.warn(&format!("cleanup did not finish cleanly: {e}"));
                }
            } else {
                ui.warn("No cleanup playbook found, skipping cleanup");
            }
        }
    }

    ui.success("Operation completed successfully");
    Ok(())
}
