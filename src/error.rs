use std::process::ExitStatus;
use std::time::Duration;

pub type OpsResult<T> = Result<T, OpsError>;

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("command failed: {command}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("command timed out after {}s: {command}", timeout.as_secs())]
    CommandTimeout { command: String, timeout: Duration },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("environment variable missing: {0}")]
    EnvMissing(String),

    #[error("container '{name}' exited: {status}")]
    ContainerExited { name: String, status: String },

    #[error("'{target}' not ready after {}s", waited.as_secs())]
    ReadinessTimeout { target: String, waited: Duration },

    #[error("{0} check(s) failed")]
    ChecksFailed(usize),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tls(#[from] native_tls::Error),
}
