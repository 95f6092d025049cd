use std::cell::RefCell;

use atalaia::report::Reporter;
use atalaia::validate::{STACK_IMAGES, Summary, file_test_name};

/// Reporter recording every line it is given.
#[derive(Default)]
struct Recording {
    lines: RefCell<Vec<String>>,
}

impl Reporter for Recording {
    fn step(&self, message: &str) {
        self.lines.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.lines.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.lines.borrow_mut().push(format!("warn: {message}"));
    }
    fn fail(&self, message: &str) {
        self.lines.borrow_mut().push(format!("fail: {message}"));
    }
    fn section(&self, message: &str) {
        self.lines.borrow_mut().push(format!("section: {message}"));
    }
}

#[test]
fn summary_counts_passes_and_failures() {
    let ui = Recording::default();
    let mut summary = Summary::default();

    summary.record(&ui, "Ansible installation", true);
    summary.record(&ui, "Docker installation", false);
    summary.record(&ui, "Docker CLI access", true);

    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.all_passed());

    let lines = ui.lines.borrow();
    assert_eq!(lines[0], "ok: Testing Ansible installation... ok");
    assert_eq!(lines[1], "fail: Testing Docker installation... failed");
}

#[test]
fn empty_summary_passes() {
    let summary = Summary::default();

    assert!(summary.all_passed());
    assert_eq!(summary.passed, 0);
}

#[test]
fn file_structure_tests_are_named_by_basename() {
    assert_eq!(
        file_test_name("ansible/playbooks/site.yml"),
        "site.yml exists"
    );
    assert_eq!(
        file_test_name("ansible/roles/caddy/templates/Caddyfile.j2"),
        "Caddyfile.j2 exists"
    );
    assert_eq!(file_test_name("hosts.yml"), "hosts.yml exists");
}

#[test]
fn the_stack_pulls_the_six_monitoring_images() {
    assert_eq!(STACK_IMAGES.len(), 6);
    assert!(STACK_IMAGES.contains(&"caddy:2-alpine"));
    assert!(STACK_IMAGES.contains(&"grafana/loki:latest"));
}
