use std::time::{Duration, Instant};

use atalaia::cmd;
use atalaia::error::OpsError;

#[test]
fn interactive_run_is_killed_at_the_deadline() {
    let started = Instant::now();
    let err = cmd::run_interactive_timeout(None, "sleep", &["5"], Duration::from_millis(200))
        .unwrap_err();

    assert!(matches!(err, OpsError::CommandTimeout { .. }));
    // Killed near the 200ms budget, nowhere near the child's 5s.
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn interactive_run_within_budget_succeeds() {
    cmd::run_interactive_timeout(None, "true", &[], Duration::from_secs(5)).unwrap();
}

#[test]
fn interactive_run_reports_nonzero_exit_as_failure() {
    let err = cmd::run_interactive_timeout(None, "false", &[], Duration::from_secs(5)).unwrap_err();

    assert!(matches!(err, OpsError::CommandFailed { .. }));
}

#[test]
fn capture_is_killed_at_the_deadline() {
    let err = cmd::capture_timeout("sleep", &["5"], Duration::from_millis(200)).unwrap_err();

    let OpsError::CommandTimeout { command, timeout } = err else {
        panic!("expected a timeout");
    };
    assert_eq!(command, "sleep 5");
    assert_eq!(timeout, Duration::from_millis(200));
}

#[test]
fn capture_within_budget_keeps_output_and_status() {
    let captured = cmd::capture_timeout("sh", &["-c", "echo out; exit 3"], Duration::from_secs(5))
        .unwrap();

    assert!(!captured.success());
    assert_eq!(captured.code(), Some(3));
    assert_eq!(captured.stdout, "out");
}

#[test]
fn missing_program_is_not_a_timeout() {
    let err = cmd::run_interactive_timeout(
        None,
        "definitely-not-a-real-program",
        &[],
        Duration::from_secs(1),
    )
    .unwrap_err();

    assert!(matches!(err, OpsError::CommandNotFound(_)));
}
