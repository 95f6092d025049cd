//! Colored status output.
//!
//! The original shell-era scripts hard-coded ANSI color
//! constants next to every print. Status reporting lives behind
//! [`Reporter`] instead so the readiness poller can be exercised
//! in tests without writing to a terminal.

use owo_colors::OwoColorize as _;

/// Status line sink injected into the poller and the drivers.
pub trait Reporter {
    /// A step in progress.
    fn step(&self, message: &str);

    /// A completed step.
    fn success(&self, message: &str);

    /// A non-fatal problem.
    fn warn(&self, message: &str);

    /// A fatal problem. Does not itself abort anything.
    fn fail(&self, message: &str);

    /// A section header.
    fn section(&self, message: &str);
}

/// Terminal reporter used by the CLI.
pub struct Console;

impl Reporter for Console {
    fn step(&self, message: &str) {
        println!("  {} {message}", "→".cyan());
    }

    fn success(&self, message: &str) {
        println!("{} {message}", "✓".green());
    }

    fn warn(&self, message: &str) {
        println!("{} {message}", "!".yellow());
    }

    fn fail(&self, message: &str) {
        println!("{} {message}", "✗".red());
    }

    fn section(&self, message: &str) {
        println!("{}", message.blue());
    }
}
