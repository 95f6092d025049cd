use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{OpsError, OpsResult};

/// Outcome of an external invocation that is allowed to fail.
/// Probes inspect the exit status instead of erroring on it.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }

    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Run a command and capture its output. Fails if the command
/// returns a non-zero exit code.
pub fn run(program: &str, args: &[&str]) -> OpsResult<String> {
    run_in(None, program, args)
}

/// Same as [`run`], from a working directory.
pub fn run_in(dir: Option<&Path>, program: &str, args: &[&str]) -> OpsResult<String> {
    let captured = capture_in(dir, program, args)?;

    if captured.success() {
        Ok(captured.stdout)
    } else {
        eprintln!("stderr: {}", captured.stderr);
        Err(OpsError::CommandFailed {
            command: format_command(program, args),
            status: captured.status,
        })
    }
}

/// Run a command with stdin/stdout/stderr inherited (interactive),
/// optionally from a working directory.
pub fn run_interactive_in(dir: Option<&Path>, program: &str, args: &[&str]) -> OpsResult<()> {
    let mut command = Command::new(program);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    let status = command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| not_found(e, program))?;

    if status.success() {
        Ok(())
    } else {
        Err(OpsError::CommandFailed {
            command: format_command(program, args),
            status,
        })
    }
}

/// Same as [`run_interactive_in`], bounded by a wall-clock timeout.
/// The child is killed when the deadline passes and the invocation
/// is reported as [`OpsError::CommandTimeout`].
pub fn run_interactive_timeout(
    dir: Option<&Path>,
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> OpsResult<()> {
    let mut command = Command::new(program);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    let mut child = command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| not_found(e, program))?;

    let status = wait_with_deadline(&mut child, program, args, timeout)?;

    if status.success() {
        Ok(())
    } else {
        Err(OpsError::CommandFailed {
            command: format_command(program, args),
            status,
        })
    }
}

/// Run a command that pipes its stdin from a byte slice.
pub fn run_with_stdin(program: &str, args: &[&str], stdin_data: &[u8]) -> OpsResult<String> {
    use std::io::Write;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| not_found(e, program))?;

    if let Some(stdin) = &mut child.stdin {
        stdin.write_all(stdin_data)?;
    }
    drop(child.stdin.take());

    let output = child.wait_with_output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        eprintln!("stderr: {stderr}");
        Err(OpsError::CommandFailed {
            command: format_command(program, args),
            status: output.status,
        })
    }
}

/// Run a command and capture output without treating a non-zero
/// exit code as an error.
pub fn capture(program: &str, args: &[&str]) -> OpsResult<Captured> {
    capture_in(None, program, args)
}

/// Same as [`capture`], from a working directory.
pub fn capture_in(dir: Option<&Path>, program: &str, args: &[&str]) -> OpsResult<Captured> {
    let mut command = Command::new(program);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    let output = command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| not_found(e, program))?;

    Ok(Captured {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Capture a command bounded by a wall-clock timeout. The child
/// is killed when the deadline passes and the invocation is
/// reported as [`OpsError::CommandTimeout`], which callers treat
/// as a failed attempt rather than a crash.
pub fn capture_timeout(program: &str, args: &[&str], timeout: Duration) -> OpsResult<Captured> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| not_found(e, program))?;

    // Drain pipes on separate threads so a chatty child cannot
    // block on a full pipe buffer while we poll for exit.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = wait_with_deadline(&mut child, program, args, timeout)?;

    Ok(Captured {
        status,
        stdout: join_drained(stdout),
        stderr: join_drained(stderr),
    })
}

/// Poll a child for exit until `timeout` passes, then kill it.
fn wait_with_deadline(
    child: &mut Child,
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> OpsResult<ExitStatus> {
    const POLL: Duration = Duration::from_millis(50);

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(OpsError::CommandTimeout {
                command: format_command(program, args),
                timeout,
            });
        }
        thread::sleep(POLL);
    }
}

/// Check if a command exists on PATH.
#[must_use]
pub fn command_exists(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Fail with [`OpsError::PrerequisiteMissing`] for the first tool
/// not found on PATH.
pub fn require_tools(tools: &[&str]) -> OpsResult<()> {
    for tool in tools {
        if !command_exists(tool) {
            return Err(OpsError::PrerequisiteMissing((*tool).to_string()));
        }
    }
    Ok(())
}

fn drain(mut reader: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn join_drained(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default()
}

fn not_found(e: std::io::Error, program: &str) -> OpsError {
    if e.kind() == std::io::ErrorKind::NotFound {
        OpsError::CommandNotFound(program.to_string())
    } else {
        OpsError::Io(e)
    }
}

fn format_command(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| (*a).to_string()));
    parts.join(" ")
}
