//! Diagnostic collection and emission.
//!
//! Grounded on `ori_diagnostic::diagnostic`/`queue`, reduced to what spec §6
//! asks for: a sink that accumulates one entry per violation, in source
//! order, and can write each as `<filename>:<line>: <message>` (or just
//! `<message>` for a program-level diagnostic with no locus, e.g. a missing
//! `Main`). No severity levels, error codes, or suggested fixes — those are
//! real `ori_diagnostic` features this analyzer has no use for: spec §7
//! is explicit that there is no recovery beyond emission and poisoning.

use std::fmt;
use std::io::{self, Write};

/// A single reported violation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// `(filename, line)` of the offending construct, or `None` for a
    /// program-level diagnostic with no locus (e.g. "Class Main is not defined.").
    pub locus: Option<(String, u32)>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.locus {
            Some((filename, line)) => write!(f, "{filename}:{line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Accumulates diagnostics and tracks the error count the driver inspects
/// at each phase boundary (spec §6/§7).
#[derive(Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Report a diagnostic located at `filename:line`.
    pub fn report_at(&mut self, filename: impl Into<String>, line: u32, message: impl Into<String>) {
        self.errors.push(Diagnostic {
            locus: Some((filename.into(), line)),
            message: message.into(),
        });
    }

    /// Report a program-level diagnostic with no source locus.
    pub fn report(&mut self, message: impl Into<String>) {
        self.errors.push(Diagnostic {
            locus: None,
            message: message.into(),
        });
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Write every accumulated diagnostic, one per line, to `sink`.
    pub fn write_to(&self, sink: &mut impl Write) -> io::Result<()> {
        for diag in &self.errors {
            writeln!(sink, "{diag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn located_diagnostic_formats_with_locus() {
        let mut diags = Diagnostics::new();
        diags.report_at("a.cl", 12, "undeclared identifier x");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.errors()[0].to_string(), "a.cl:12: undeclared identifier x");
    }

    #[test]
    fn global_diagnostic_formats_without_locus() {
        let mut diags = Diagnostics::new();
        diags.report("Class Main is not defined.");
        assert_eq!(diags.errors()[0].to_string(), "Class Main is not defined.");
    }

    #[test]
    fn write_to_emits_one_line_per_diagnostic() {
        let mut diags = Diagnostics::new();
        diags.report_at("a.cl", 1, "first");
        diags.report("second");
        let mut buf = Vec::new();
        diags.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a.cl:1: first\nsecond\n");
    }
}
