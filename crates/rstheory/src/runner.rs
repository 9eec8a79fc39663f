//! Runs the expanded cases of one theory with per-case output:
//!
//! ```text
//! Calc::adds
//!   ✓ adds(1, 2, 3)
//!   ✗ adds [overflow]
//!     Error: attempt to add with overflow
//!   - adds(0, 0, 0) (skipped: flaky on CI)
//! ```
//!
//! Every case runs even when an earlier one fails; [`CaseReport::assert_passed`]
//! then fails the enclosing `#[test]` with the list of failures.

use crate::expansion::TestCase;
use crate::provider::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

fn use_color() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

fn paint(code: &str, s: &str) -> String {
    if use_color() {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn green(s: &str) -> String {
    paint("32", s)
}

fn red(s: &str) -> String {
    paint("31", s)
}

fn yellow(s: &str) -> String {
    paint("33", s)
}

fn dim(s: &str) -> String {
    paint("2", s)
}

/// Outcome of running the cases of one theory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// `display name: panic message`, in case order.
    pub failures: Vec<String>,
}

impl CaseReport {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// Panic with every recorded failure if any case failed.
    pub fn assert_passed(&self) {
        if self.failed == 0 {
            return;
        }
        let mut msg = format!("{} of {} cases failed:", self.failed, self.total());
        for (i, failure) in self.failures.iter().enumerate() {
            msg.push_str(&format!("\n  {}. {failure}", i + 1));
        }
        panic!("{msg}");
    }
}

/// Run `body` once per case, catching panics so the remaining cases still
/// run. Rows carrying an unconditional `skip` reason are reported and not
/// run.
pub fn run_cases<M>(
    title: &str,
    cases: &[TestCase<M>],
    mut body: impl FnMut(&TestCase<M>),
) -> CaseReport {
    let mut report = CaseReport::default();
    eprintln!("{title}");

    for case in cases {
        let name = case.display_name();

        if let Some(reason) = &case.metadata.skip {
            eprintln!("  {} {} {}", yellow("-"), dim(&name), dim(&format!("(skipped: {reason})")));
            report.skipped += 1;
            continue;
        }

        let start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| body(case)));
        let ms = start.elapsed().as_millis();
        let time_str = if ms > 100 {
            format!(" {}", dim(&format!("({ms}ms)")))
        } else {
            String::new()
        };

        match outcome {
            Ok(()) => {
                eprintln!("  {} {name}{time_str}", green("✓"));
                report.passed += 1;
            }
            Err(e) => {
                let msg = panic_message(e.as_ref());
                eprintln!("  {} {}{time_str}", red("✗"), red(&name));
                eprintln!("    {}", red(&format!("Error: {msg}")));
                report.failed += 1;
                report.failures.push(format!("{name}: {msg}"));
            }
        }
    }

    report
}
