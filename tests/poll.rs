use std::time::{Duration, Instant};

use atalaia::poll::{Poller, ProbeReport, ReadyOutcome};
use atalaia::report::Reporter;

struct Silent;

impl Reporter for Silent {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn fail(&self, _: &str) {}
    fn section(&self, _: &str) {}
}

/// Probe returning a scripted sequence of reports, then
/// repeating the last one.
fn scripted(steps: Vec<ProbeReport>) -> impl FnMut() -> ProbeReport {
    let mut steps = steps.into_iter();
    let mut last = ProbeReport::absent("script exhausted");
    move || {
        if let Some(step) = steps.next() {
            last = step;
        }
        last.clone()
    }
}

#[test]
fn ready_before_deadline_returns_success_early() {
    let poller = Poller::new("web", Duration::from_secs(2), Duration::from_millis(20))
        .starting_interval(Duration::from_millis(10));
    let probe = scripted(vec![
        ProbeReport::absent("no such container"),
        ProbeReport::absent("no such container"),
        ProbeReport::starting("Created"),
        ProbeReport::starting("Up 1 second (health: starting)"),
        ProbeReport::ready("Up 2 seconds"),
    ]);

    let started = Instant::now();
    let outcome = poller.wait(&Silent, probe, |_| {});
    let elapsed = started.elapsed();

    assert!(outcome.is_ready());
    // Two absent polls at the full interval, two starting polls
    // at the sub-interval.
    assert!(elapsed >= Duration::from_millis(60));
    assert!(elapsed < Duration::from_secs(2));
}

#[test]
fn exited_fails_fast_without_waiting_for_timeout() {
    let poller = Poller::new("web", Duration::from_secs(10), Duration::from_millis(20));
    let probe = scripted(vec![
        ProbeReport::starting("Created"),
        ProbeReport::starting("Restarting (1) 1 second ago"),
        ProbeReport::exited("Exited (1) 0 seconds ago"),
    ]);

    let mut diagnostic_fetches = 0;
    let started = Instant::now();
    let outcome = poller.wait(&Silent, probe, |report| {
        diagnostic_fetches += 1;
        assert_eq!(report.detail, "Exited (1) 0 seconds ago");
    });
    let elapsed = started.elapsed();

    match outcome {
        ReadyOutcome::Exited { detail } => {
            assert_eq!(detail, "Exited (1) 0 seconds ago");
        }
        other => panic!("expected Exited, got {other:?}"),
    }
    assert_eq!(diagnostic_fetches, 1);
    // Roughly two intervals, nowhere near the 10s budget.
    assert!(elapsed >= Duration::from_millis(40));
    assert!(elapsed < Duration::from_secs(1));
}

#[test]
fn never_ready_times_out_at_the_deadline() {
    let poller = Poller::new("web", Duration::from_millis(100), Duration::from_millis(30));

    let started = Instant::now();
    let outcome = poller.wait(&Silent, || ProbeReport::absent("no such container"), |_| {});
    let elapsed = started.elapsed();

    match outcome {
        ReadyOutcome::TimedOut { waited } => {
            assert!(waited >= Duration::from_millis(100));
        }
        other => panic!("expected TimedOut, got {other:?}"),
    }
    assert!(elapsed >= Duration::from_millis(100));
    // At, not well past, the deadline: less than one extra
    // interval (plus scheduler slack).
    assert!(elapsed < Duration::from_millis(100 + 30 + 60));
}

#[test]
fn already_ready_target_returns_immediately_and_repeatedly() {
    let poller = Poller::new("web", Duration::from_secs(5), Duration::from_millis(50));

    for _ in 0..2 {
        let mut polls = 0;
        let started = Instant::now();
        let outcome = poller.wait(
            &Silent,
            || {
                polls += 1;
                ProbeReport::ready("Up 4 hours")
            },
            |_| {},
        );

        assert!(outcome.is_ready());
        assert_eq!(polls, 1);
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}

#[test]
fn exited_skips_the_diagnostic_hook_when_ready() {
    let poller = Poller::new("web", Duration::from_secs(1), Duration::from_millis(10));

    let mut diagnostic_fetches = 0;
    let outcome = poller.wait(
        &Silent,
        || ProbeReport::ready("Up 1 second"),
        |_| diagnostic_fetches += 1,
    );

    assert!(outcome.is_ready());
    assert_eq!(diagnostic_fetches, 0);
}
