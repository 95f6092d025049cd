//! Operations CLI for a self-hosted VPS monitoring stack.
//!
//! Atalaia wraps `ansible-playbook` and the Docker CLI to
//! deploy, validate, and health-check a small monitoring stack
//! (Caddy reverse proxy, Prometheus, Grafana, Loki). It invents
//! no orchestration of its own: playbooks stay the source of
//! truth, and this crate is the sequential glue that runs them,
//! checks preconditions, and decides when a freshly started
//! container is safe to depend on.
//!
//! The name comes from Portuguese for *watchtower*: keep watch
//! over the stack that keeps watch over everything else.
//!
//! # Overview
//!
//! The one piece with real logic is the readiness poller in
//! [`poll`]: probe an external resource, classify the result
//! into `Absent` / `Starting` / `Exited` / `Ready`, and sleep or
//! stop accordingly. `Exited` fails fast with container logs
//! instead of burning the timeout budget on a crashed container;
//! only exhausting the deadline reports a timeout. The same
//! skeleton serves both the container wait and the layered
//! SSH-service wait, parameterized by the probe closure.
//!
//! Everything else is a thin driver behind one subcommand each:
//!
//! - `deploy <env> <check|plan|apply|cleanup>` - syntax check,
//!   dry run, apply, or cleanup via `ansible-playbook`
//! - `validate` - prerequisites, file structure, playbook
//!   syntax, image availability, config template sanity
//! - `health <env>` - connectivity, resources, services,
//!   containers, monitoring endpoints
//! - `test-local` - full end-to-end run against a local systemd
//!   container standing in for a VPS
//!
//! # Example
//!
//! ```rust,no_run
//! use atalaia::Pipeline;
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::from_current_dir()?;
//!     pipeline.run()?;
//!     Ok(())
//! }
//! ```

// Allow noisy pedantic lints that don't add value for an
// operations tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ansible;
pub mod cmd;
pub mod deploy;
pub mod docker;
pub mod error;
pub mod health;
pub mod http;
pub mod local;
pub mod pipeline;
pub mod poll;
pub mod project;
pub mod report;
pub mod validate;

pub use ansible::Ansible;
pub use error::OpsError;
pub use error::OpsResult;
pub use http::HttpProbe;
pub use pipeline::Pipeline;
pub use poll::Poller;
pub use poll::ProbeReport;
pub use poll::ProbeStatus;
pub use poll::ReadyOutcome;
pub use project::ProjectLayout;
pub use report::Console;
pub use report::Reporter;
