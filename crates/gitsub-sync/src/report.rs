use std::fmt::Write as _;

use console::style;
use serde::Serialize;

use gitsub_core::models::outcome::{SyncOutcome, SyncStatus};

/// Outcomes sorted by submodule path, ready to print.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    /// Sort by path. Completion order never leaks into the report.
    pub fn from_outcomes(mut outcomes: Vec<SyncOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.submodule.cmp(&b.submodule));
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[SyncOutcome] {
        &self.outcomes
    }

    pub fn successes(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == SyncStatus::Success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == SyncStatus::Failure)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Text summary: one line per success, then an error block if anything failed.
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();

        for outcome in self.successes() {
            let message = one_line(&outcome.message);
            let path = style(outcome.submodule.as_str()).green().force_styling(color);
            if message.is_empty() {
                let _ = writeln!(out, "{path}");
            } else {
                let _ = writeln!(out, "{path}: {message}");
            }
        }

        let failed = self.failures().count();
        if failed > 0 {
            let header = style("\t=== ERRORS ===").red().underlined().force_styling(color);
            let _ = writeln!(out, "\n{header}");
            for outcome in self.failures() {
                let entry = format!("{}:\n{}", outcome.submodule, outcome.message);
                let _ = writeln!(out, "{}", style(entry).red().force_styling(color));
            }
        }

        let _ = writeln!(
            out,
            "\n{} synced | {} failed",
            self.len() - failed,
            failed
        );
        out
    }

    /// Print to stdout.
    pub fn print(&self, color: bool) {
        print!("{}", self.render(color));
    }
}

/// Collapse multi-line git output into one line.
fn one_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gitsub_core::models::outcome::FailureKind;

    fn ok(path: &str) -> SyncOutcome {
        SyncOutcome::success(path.into(), "Already up to date.", Utc::now())
    }

    fn bad(path: &str, message: &str) -> SyncOutcome {
        SyncOutcome::failure(path.into(), FailureKind::Checkout, message, Utc::now())
    }

    #[test]
    fn test_sorted_regardless_of_input_order() {
        let report = SyncReport::from_outcomes(vec![ok("libs/foo"), bad("app", "x"), ok("libs/bar")]);
        let paths: Vec<&str> = report
            .outcomes()
            .iter()
            .map(|o| o.submodule.as_str())
            .collect();
        assert_eq!(paths, vec!["app", "libs/bar", "libs/foo"]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_render_without_failures() {
        let report = SyncReport::from_outcomes(vec![ok("libs/foo"), ok("libs/bar")]);
        let text = report.render(false);
        assert_eq!(
            text,
            "libs/bar: Already up to date.\nlibs/foo: Already up to date.\n\n2 synced | 0 failed\n"
        );
        assert!(!text.contains("ERRORS"));
        assert!(!report.has_failures());
    }

    #[test]
    fn test_render_error_block() {
        let report = SyncReport::from_outcomes(vec![
            bad("libs/bar", "fatal: invalid reference: main"),
            ok("libs/foo"),
            bad("libs/baz", "fatal: Authentication failed\nfor 'https://example.com'"),
        ]);
        let text = report.render(false);
        let errors_at = text.find("=== ERRORS ===").unwrap();
        assert!(text[..errors_at].contains("libs/foo: Already up to date."));
        let block = &text[errors_at..];
        let bar = block.find("libs/bar:\nfatal: invalid reference: main").unwrap();
        let baz = block.find("libs/baz:\nfatal: Authentication failed\nfor").unwrap();
        assert!(bar < baz);
        assert!(text.ends_with("1 synced | 2 failed\n"));
    }

    #[test]
    fn test_multiline_success_collapses() {
        let outcome = SyncOutcome::success(
            "libs/foo".into(),
            "From example.com:foo\n   1a2b..3c4d  main -> origin/main\n",
            Utc::now(),
        );
        let text = SyncReport::from_outcomes(vec![outcome]).render(false);
        assert!(text.starts_with("libs/foo: From example.com:foo; 1a2b..3c4d  main -> origin/main\n"));
    }

    #[test]
    fn test_empty_report() {
        let report = SyncReport::from_outcomes(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.render(false), "\n0 synced | 0 failed\n");
    }
}
