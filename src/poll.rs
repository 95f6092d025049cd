//! Readiness polling.
//!
//! Deciding when a freshly started container (and a service
//! inside it) is usable follows the same skeleton everywhere:
//! probe, classify, sleep, repeat until a terminal state or a
//! deadline. [`Poller`] implements that skeleton once; the
//! classification function and the cadence are the only parts
//! that vary per resource type.
//!
//! Terminal states are [`ProbeStatus::Ready`] and
//! [`ProbeStatus::Exited`]. An exited target fails fast - a
//! stopped container will not self-heal, so burning the rest of
//! the timeout budget on it only delays the diagnostics.

use std::thread;
use std::time::{Duration, Instant};

use crate::report::Reporter;

/// Classification of one probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The target does not exist yet.
    Absent,
    /// The target exists but is not usable yet.
    Starting,
    /// The target stopped. Terminal failure.
    Exited,
    /// The target is usable. Terminal success.
    Ready,
}

/// One probe attempt: a classification plus whatever diagnostic
/// text the probe captured. Produced fresh on every poll, never
/// mutated.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub status: ProbeStatus,
    pub detail: String,
}

impl ProbeReport {
    #[must_use]
    pub fn absent(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Absent,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn starting(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Starting,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn exited(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Exited,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn ready(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Ready,
            detail: detail.into(),
        }
    }
}

/// Result of one wait call. Exhausting the timeout is distinct
/// from an explicit exit so callers can give different
/// diagnostics.
#[derive(Debug)]
pub enum ReadyOutcome {
    Ready,
    Exited { detail: String },
    TimedOut { waited: Duration },
}

impl ReadyOutcome {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// One wait operation: the target label, the polling cadence,
/// and the deadline budget. Owned by the calling routine for the
/// lifetime of a single [`Poller::wait`] call.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use atalaia::poll::{Poller, ProbeReport};
/// use atalaia::report::Console;
///
/// let poller = Poller::new(
///     "web",
///     Duration::from_secs(30),
///     Duration::from_secs(3),
/// )
/// .starting_interval(Duration::from_secs(2));
///
/// let outcome = poller.wait(
///     &Console,
///     || ProbeReport::ready("Up 2 seconds"),
///     |_| {},
/// );
/// assert!(outcome.is_ready());
/// ```
pub struct Poller {
    target: String,
    timeout: Duration,
    interval: Duration,
    starting_interval: Duration,
}

impl Poller {
    #[must_use]
    pub fn new(target: &str, timeout: Duration, interval: Duration) -> Self {
        Self {
            target: target.to_string(),
            timeout,
            interval,
            starting_interval: interval,
        }
    }

    /// Shorter sleep used while the target is `Starting`, when a
    /// state change is expected sooner than a fresh appearance.
    #[must_use]
    pub const fn starting_interval(mut self, interval: Duration) -> Self {
        self.starting_interval = interval;
        self
    }

    /// Poll `probe` until a terminal state or the deadline.
    ///
    /// `on_exited` is invoked exactly once, with the final probe
    /// report, when the target reaches `Exited` - the hook for
    /// fetching extended diagnostics (container logs) from a
    /// secondary collaborator.
    ///
    /// Probes must classify their own invocation failures as
    /// `Absent`: a transient probe error during startup is
    /// expected and must not abort the wait.
    pub fn wait<P, D>(&self, ui: &dyn Reporter, mut probe: P, mut on_exited: D) -> ReadyOutcome
    where
        P: FnMut() -> ProbeReport,
        D: FnMut(&ProbeReport),
    {
        let started = Instant::now();
        let deadline = started + self.timeout;

        loop {
            let report = probe();
            match report.status {
                ProbeStatus::Ready => return ReadyOutcome::Ready,
                ProbeStatus::Exited => {
                    ui.fail(&format!("{} exited: {}", self.target, report.detail));
                    on_exited(&report);
                    return ReadyOutcome::Exited {
                        detail: report.detail,
                    };
                }
                ProbeStatus::Absent => {
                    ui.step(&format!("{} not found yet, waiting...", self.target));
                }
                ProbeStatus::Starting => {
                    ui.step(&format!("{}: {}", self.target, report.detail));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return ReadyOutcome::TimedOut {
                    waited: now - started,
                };
            }

            let step = if report.status == ProbeStatus::Absent {
                self.interval
            } else {
                self.starting_interval
            };
            thread::sleep(step.min(deadline - now));
        }
    }
}
