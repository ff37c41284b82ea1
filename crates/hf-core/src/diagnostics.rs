//! Diagnostic reporting: `(severity, category, message)` tuples.
//!
//! Batch operations (topology recompute, interaction step, cascade) skip the
//! offending unit of work and report it here instead of failing the batch.
//! Every entry is also forwarded to `tracing` at the matching level.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DIAGNOSTIC_HISTORY;
use crate::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Memory,
    Math,
    Logic,
    User,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Memory => "memory",
            Category::Math => "math",
            Category::Logic => "logic",
            Category::User => "user",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
        }
    }
}

impl From<&FieldError> for Diagnostic {
    fn from(err: &FieldError) -> Self {
        Self::new(err.severity(), err.category(), err.to_string())
    }
}

/// Receiver for diagnostics emitted by the engine.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn report_error(&mut self, err: &FieldError) {
        self.report(Diagnostic::from(err));
    }
}

/// Bounded diagnostic history. The oldest entry is dropped once full.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
    limit: usize,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(DIAGNOSTIC_HISTORY)
    }
}

impl DiagnosticLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of retained entries at or above `severity`.
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity >= severity).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn report(&mut self, diagnostic: Diagnostic) {
        let Diagnostic {
            severity,
            category,
            message,
        } = &diagnostic;
        match severity {
            Severity::Info => tracing::info!(%category, "{message}"),
            Severity::Warning => tracing::warn!(%category, "{message}"),
            Severity::Error | Severity::Fatal => tracing::error!(%category, %severity, "{message}"),
        }

        if self.limit == 0 {
            return;
        }
        if self.entries.len() == self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut log = DiagnosticLog::new(3);
        for i in 0..5 {
            log.report(Diagnostic::new(
                Severity::Info,
                Category::Logic,
                format!("entry {i}"),
            ));
        }
        assert_eq!(log.len(), 3);
        let messages: Vec<&str> = log.history().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["entry 2", "entry 3", "entry 4"]);
    }

    #[test]
    fn test_count_at_least() {
        let mut log = DiagnosticLog::default();
        log.report(Diagnostic::new(Severity::Info, Category::User, "a"));
        log.report(Diagnostic::new(Severity::Warning, Category::Math, "b"));
        log.report_error(&FieldError::AllocationFailure("c".into()));
        assert_eq!(log.count_at_least(Severity::Warning), 2);
        assert_eq!(log.count_at_least(Severity::Fatal), 1);
        assert_eq!(log.last().map(|d| d.category), Some(Category::Memory));
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut log = DiagnosticLog::new(0);
        log.report(Diagnostic::new(Severity::Error, Category::Memory, "dropped"));
        assert!(log.is_empty());
    }
}
