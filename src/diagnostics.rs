// src/diagnostics.rs
//! Leveled diagnostics channel.
//!
//! Every item, component and folder reports degraded-but-recoverable conditions here.
//! Reports go straight to the `log` facade and are also kept in a bounded history so a
//! debug overlay (or a test) can inspect what happened.

use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Information,
    Warning,
    Error,
    /// Aborts the requested operation, never the process.
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Information,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Information => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Critical => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Information => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// `item/Component`, `Root`, `Folder 'Menu'`...
    pub source: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.source, self.message)
    }
}

#[derive(Debug)]
pub struct Diagnostics {
    history: VecDeque<Diagnostic>,
    capacity: usize,
    counts: [usize; 4],
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl Diagnostics {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            counts: [0; 4],
        }
    }

    pub fn report(&mut self, severity: Severity, source: &str, message: impl Into<String>) {
        let message = message.into();
        if severity == Severity::Critical {
            log::log!(severity.log_level(), "critical: [{}] {}", source, message);
        } else {
            log::log!(severity.log_level(), "[{}] {}", source, message);
        }

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(Diagnostic {
            severity,
            source: source.to_owned(),
            message,
        });
        self.counts[severity.index()] += 1;
    }

    #[inline]
    pub fn information(&mut self, source: &str, message: impl Into<String>) {
        self.report(Severity::Information, source, message);
    }

    #[inline]
    pub fn warning(&mut self, source: &str, message: impl Into<String>) {
        self.report(Severity::Warning, source, message);
    }

    #[inline]
    pub fn error(&mut self, source: &str, message: impl Into<String>) {
        self.report(Severity::Error, source, message);
    }

    #[inline]
    pub fn critical(&mut self, source: &str, message: impl Into<String>) {
        self.report(Severity::Critical, source, message);
    }

    /// Total reports of this severity since creation (not bounded by the history).
    #[inline]
    pub fn count(&self, severity: Severity) -> usize {
        self.counts[severity.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = &Diagnostic> {
        self.history.iter()
    }

    pub fn entries_of(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.history.iter().filter(move |d| d.severity == severity)
    }

    pub fn last(&self) -> Option<&Diagnostic> {
        self.history.back()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.counts = [0; 4];
    }
}
