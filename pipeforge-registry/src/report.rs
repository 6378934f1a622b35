//! Validity reports.
//!
//! Registries and the scheduler describe their problems (pending tasks,
//! definitions referring to unknown entities) as structured entries. A UI or
//! CLI renders them; nothing here formats for display beyond `Display`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One finding, addressed by a context path such as `["Nodes", "imaging:blur"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub context: Vec<String>,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity.as_str(), self.context.join(" / "), self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityReport {
    entries: Vec<ReportEntry>,
}

impl ValidityReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a context below the report root.
    pub fn resolve(&mut self, segment: impl Into<String>) -> ReportContext<'_> {
        ReportContext {
            report: self,
            path: vec![segment.into()],
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// True when no entry has [`Severity::Error`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.entries.iter().any(|e| e.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.severity == Severity::Warning)
    }

    /// Entries whose context starts with `prefix`.
    pub fn under<'a>(&'a self, prefix: &'a [&'a str]) -> impl Iterator<Item = &'a ReportEntry> + 'a {
        self.entries.iter().filter(move |e| {
            e.context.len() >= prefix.len() && e.context.iter().zip(prefix).all(|(a, b)| a == b)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A mutable view of a report rooted at a context path.
pub struct ReportContext<'a> {
    report: &'a mut ValidityReport,
    path: Vec<String>,
}

impl ReportContext<'_> {
    /// Opens a child context.
    pub fn resolve(&mut self, segment: impl Into<String>) -> ReportContext<'_> {
        let mut path = self.path.clone();
        path.push(segment.into());
        ReportContext {
            report: &mut *self.report,
            path,
        }
    }

    pub fn report(&mut self, severity: Severity, message: impl Into<String>, details: Vec<String>) {
        self.report.push(ReportEntry {
            context: self.path.clone(),
            severity,
            message: message.into(),
            details,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.report(Severity::Error, message, Vec::new());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.report(Severity::Warning, message, Vec::new());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.report(Severity::Info, message, Vec::new());
    }

    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }
}
