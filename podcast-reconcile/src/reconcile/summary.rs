//! Batch run totals

use serde::Serialize;
use std::fmt;

/// Totals for one operation run
///
/// `acted + skipped + missing + errored + not_processed == scanned`;
/// `not_processed` is only non-zero when the batch aborted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub operation: String,
    pub dry_run: bool,
    pub scanned: usize,
    pub acted: usize,
    pub skipped: usize,
    pub missing: usize,
    pub errored: usize,
    pub not_processed: usize,
    /// Reason the batch stopped early
    pub aborted: Option<String>,
}

impl RunSummary {
    pub fn new(operation: &str, scanned: usize, dry_run: bool) -> Self {
        Self {
            operation: operation.to_string(),
            dry_run,
            scanned,
            ..Self::default()
        }
    }

    pub fn accounted(&self) -> usize {
        self.acted + self.skipped + self.missing + self.errored + self.not_processed
    }

    /// No record errored and the batch ran to completion
    pub fn is_success(&self) -> bool {
        self.errored == 0 && self.aborted.is_none()
    }

    pub fn display_string(&self) -> String {
        format!(
            "{}: {} acted, {} skipped, {} missing, {} errored of {}",
            self.operation, self.acted, self.skipped, self.missing, self.errored, self.scanned
        )
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        if self.dry_run {
            writeln!(f, "{} (dry run, no files modified)", self.operation)?;
        } else {
            writeln!(f, "{}", self.operation)?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "  Scanned:  {}", self.scanned)?;
        writeln!(f, "  Acted:    {}", self.acted)?;
        writeln!(f, "  Skipped:  {}", self.skipped)?;
        writeln!(f, "  Missing:  {}", self.missing)?;
        writeln!(f, "  Errored:  {}", self.errored)?;
        if let Some(reason) = &self.aborted {
            writeln!(f, "  Aborted:  {} ({} not processed)", reason, self.not_processed)?;
        }
        write!(f, "{rule}")
    }
}
