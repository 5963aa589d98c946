//! Styled terminal output on stderr.

use std::fmt::Display;

use console::{Term, style};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, line: impl Display) {
        let _ = self.term.write_line(&line.to_string());
    }

    /// Plain line.
    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    /// Completed step, with a green check mark.
    pub(crate) fn success(&self, msg: &str) {
        self.line(format_args!("{} {msg}", style("✓").green()));
    }

    /// Non-fatal problem, in yellow.
    pub(crate) fn warning(&self, msg: &str) {
        self.line(style(msg).yellow());
    }

    /// Failure, in red.
    pub(crate) fn error(&self, msg: &str) {
        self.line(style(msg).red());
    }

    /// Bold cyan heading.
    pub(crate) fn highlight(&self, msg: &str) {
        self.line(style(msg).cyan().bold());
    }

    /// Indented `label: value` line with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: &str) {
        self.line(format_args!("  {} {value}", style(format!("{label}:")).dim()));
    }

    /// Empty line.
    pub(crate) fn blank(&self) {
        self.line("");
    }
}
