//! Diagnostics for a compilation.
//!
//! User-facing failures are never propagated as panics; they are recorded
//! on an [`ErrorReporter`] which the driver consults once per phase.
//! Warnings do not fail a build, errors do, and fatal diagnostics
//! short-circuit the remaining phases.

use std::{collections::HashMap, error::Error, fmt::Display};

use colored::Colorize;

use crate::ast::Span;

/// Synthetic unit name used for diagnostics that are not tied to a source
/// file (I/O, verifier and target-machine failures).
pub const COMPILATION_UNIT: &str = "compilation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "{}", "warning".yellow().bold()),
            Severity::Error => write!(f, "{}", "error".red().bold()),
            Severity::Fatal => write!(f, "{}", "fatal".red().bold()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub unit: String,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub message: String,
    pub cause: Option<String>,
}

impl CompileError {
    pub fn new(
        severity: Severity,
        unit: impl ToString,
        span: Span,
        message: impl ToString,
    ) -> Self {
        CompileError {
            unit: unit.to_string(),
            line: span.line(),
            column: span.column(),
            severity,
            message: message.to_string(),
            cause: None,
        }
    }

    pub fn warning(unit: impl ToString, span: Span, message: impl ToString) -> Self {
        CompileError::new(Severity::Warning, unit, span, message)
    }

    pub fn error(unit: impl ToString, span: Span, message: impl ToString) -> Self {
        CompileError::new(Severity::Error, unit, span, message)
    }

    pub fn fatal(unit: impl ToString, span: Span, message: impl ToString) -> Self {
        CompileError::new(Severity::Fatal, unit, span, message)
    }

    /// A fatal diagnostic carried by the synthetic "compilation" unit.
    pub fn internal(message: impl ToString) -> Self {
        CompileError::fatal(COMPILATION_UNIT, Span::default(), message)
    }

    pub fn with_cause(mut self, cause: impl ToString) -> Self {
        self.cause = Some(cause.to_string());
        self
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}:{}:{}: {}",
            self.severity, self.unit, self.line, self.column, self.message
        )?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

impl Error for CompileError {}

/// Collects diagnostics per compilation unit plus a global bucket.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    by_unit: HashMap<String, Vec<CompileError>>,
    global: Vec<CompileError>,
    saw_error: bool,
    saw_fatal: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        ErrorReporter::default()
    }

    pub fn report(&mut self, error: CompileError) {
        match error.severity {
            Severity::Warning => {}
            Severity::Error => self.saw_error = true,
            Severity::Fatal => {
                self.saw_error = true;
                self.saw_fatal = true;
            }
        }

        if error.unit == COMPILATION_UNIT {
            self.global.push(error);
        } else {
            self.by_unit
                .entry(error.unit.clone())
                .or_default()
                .push(error);
        }
    }

    /// True iff no `Error` or `Fatal` diagnostic was reported.
    pub fn is_clean(&self) -> bool {
        !self.saw_error
    }

    pub fn saw_fatal(&self) -> bool {
        self.saw_fatal
    }

    pub fn diagnostics(&self) -> Vec<CompileError> {
        let mut all = self.global.clone();
        for errors in self.by_unit.values() {
            all.extend(errors.iter().cloned());
        }
        all.sort_by(|a, b| {
            (&a.unit, a.line, a.column)
                .cmp(&(&b.unit, b.line, b.column))
                .then(b.severity.cmp(&a.severity))
        });
        all
    }

    pub fn unit_diagnostics(&self, unit: &str) -> &[CompileError] {
        self.by_unit.get(unit).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_fail_the_build() {
        let mut reporter = ErrorReporter::new();
        reporter.report(CompileError::warning("a.reso", Span::default(), "unused"));

        assert!(reporter.is_clean());
        assert!(!reporter.saw_fatal());
    }

    #[test]
    fn errors_mark_the_build_failed() {
        let mut reporter = ErrorReporter::new();
        reporter.report(CompileError::error(
            "a.reso",
            Span::new((3, 7), (3, 9)),
            "Unknown type: Foo",
        ));

        assert!(!reporter.is_clean());
        assert!(!reporter.saw_fatal());
        assert_eq!(reporter.unit_diagnostics("a.reso").len(), 1);
    }

    #[test]
    fn internal_errors_land_in_the_global_bucket() {
        let mut reporter = ErrorReporter::new();
        reporter.report(CompileError::internal("verification failed"));

        assert!(reporter.saw_fatal());
        assert!(reporter.unit_diagnostics(COMPILATION_UNIT).is_empty());
        assert_eq!(reporter.diagnostics().len(), 1);
    }

    #[test]
    fn diagnostics_sort_by_unit_and_position() {
        let mut reporter = ErrorReporter::new();
        reporter.report(CompileError::error(
            "b.reso",
            Span::new((1, 1), (1, 2)),
            "second",
        ));
        reporter.report(CompileError::error(
            "a.reso",
            Span::new((9, 1), (9, 2)),
            "first",
        ));

        let all = reporter.diagnostics();
        assert_eq!(all[0].unit, "a.reso");
        assert_eq!(all[1].unit, "b.reso");
    }
}
