use clap::{Parser, Subcommand};

use crate::deploy::{self, Action};
use crate::error::OpsResult;
use crate::health;
use crate::local;
use crate::project::ProjectLayout;
use crate::report::Console;
use crate::validate;

/// CLI entry point dispatching the operational drivers against
/// one project layout.
pub struct Pipeline {
    layout: ProjectLayout,
}

impl Pipeline {
    #[must_use]
    pub const fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    /// Build a pipeline for the project containing the current
    /// directory.
    pub fn from_current_dir() -> OpsResult<Self> {
        Ok(Self::new(ProjectLayout::discover()?))
    }

    /// Parse CLI arguments and dispatch the appropriate
    /// command.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatched command fails.
    pub fn run(&self) -> OpsResult<()> {
        let cli = Cli::parse();
        let ui = Console;

        match &cli.command {
            Command::Deploy {
                environment,
                action,
            } => deploy::run(&ui, &self.layout, environment, *action),
            Command::Validate { skip_docker_pull } => {
                validate::run(&ui, &self.layout, *skip_docker_pull)
            }
            Command::Health {
                environment,
                skip_endpoints,
            } => health::run(&ui, &self.layout, environment, *skip_endpoints),
            Command::TestLocal => local::run(&ui, &self.layout),
        }
    }
}

#[derive(Parser)]
#[command(name = "atalaia")]
#[command(about = "Deploy, validate, and health-check a VPS monitoring stack")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an Ansible action against an environment
    Deploy {
        /// Inventory environment
        #[arg(default_value = "production")]
        environment: String,

        /// Action to perform
        #[arg(value_enum, default_value = "check")]
        action: Action,
    },

    /// Validate configuration before deploying
    Validate {
        /// Skip the slow Docker image pulls
        #[arg(long, env = "SKIP_DOCKER_PULL")]
        skip_docker_pull: bool,
    },

    /// Check the health of a deployed environment
    Health {
        /// Inventory environment
        #[arg(default_value = "dev")]
        environment: String,

        /// Skip monitoring endpoint checks
        #[arg(long)]
        skip_endpoints: bool,
    },

    /// Run the full deployment against a local test container
    TestLocal,
}
