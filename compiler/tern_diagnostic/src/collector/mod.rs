//! Collector for non-fatal diagnostics.
//!
//! Fatal errors abort sequencing and travel as `Result` errors; everything a
//! session reports without stopping (warnings, compile-time notes) lands
//! here in emission order. Exact duplicates are dropped so a warning raised
//! once per token of a file is reported once.

use std::fmt;

use crate::{Diagnostic, ErrorCode, Severity};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Returns `false` if an identical one was already
    /// recorded.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.items.contains(&diagnostic) {
            return false;
        }
        self.items.push(diagnostic);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Note)
    }

    /// Number of recorded diagnostics carrying `code`.
    pub fn count(&self, code: ErrorCode) -> usize {
        self.items.iter().filter(|d| d.code == code).count()
    }

    pub fn has(&self, code: ErrorCode) -> bool {
        self.count(code) > 0
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}
