//! Severity-prefixed status lines.

use serde::{Deserialize, Serialize};

/// Severity of a reported status line.
///
/// Ordered so that `max()` over a run yields its overall outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The checked thing is fine.
    Ok,
    /// Worth a look, does not affect the exit status.
    Warn,
    /// The run fails.
    Fail,
}

impl Severity {
    /// Bracketed prefix used in text output.
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Ok => "[ok]",
            Severity::Warn => "[warn]",
            Severity::Fail => "[fail]",
        }
    }

    pub fn is_failure(self) -> bool {
        self == Severity::Fail
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One human-readable status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub severity: Severity,
    pub message: String,
}

impl StatusLine {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Severity::Fail, message)
    }
}

impl std::fmt::Display for StatusLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.severity, self.message)
    }
}

/// Ordered collection of status lines produced by one check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLog {
    pub lines: Vec<StatusLine>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: StatusLine) {
        self.lines.push(line);
    }

    pub fn ok(&mut self, message: impl Into<String>) {
        self.push(StatusLine::ok(message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(StatusLine::warn(message));
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.push(StatusLine::fail(message));
    }

    /// Append every line of another log.
    pub fn extend(&mut self, other: StatusLog) {
        self.lines.extend(other.lines);
    }

    /// Worst severity seen, `Ok` for an empty log.
    pub fn worst(&self) -> Severity {
        self.lines
            .iter()
            .map(|l| l.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    pub fn has_failures(&self) -> bool {
        self.worst().is_failure()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.lines.iter().filter(|l| l.severity == severity).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusLine> {
        self.lines.iter()
    }
}
