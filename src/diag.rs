//! Diagnostic model shared by the lexer, the parser and validation.
//!
//! Lexing and parsing problems are collected as [`Diag`]s while scanning;
//! validation errors convert into the same shape via
//! `ValidationError::to_diag`. Either way, rendering goes through miette.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, Report, Severity};
use std::fmt;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagSeverity {
    /// The document cannot be executed.
    Error,
    /// Suspicious but executable input.
    Warning,
}

impl fmt::Display for DiagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagSeverity::Error => "error",
            DiagSeverity::Warning => "warning",
        })
    }
}

/// Whether a label marks the offending location or supporting context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Primary,
    Secondary,
}

/// A labeled span within a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    pub span: Span,
    /// Text shown next to the span; may be empty.
    pub message: String,
    pub role: LabelRole,
}

/// A structured diagnostic message.
///
/// Codes are `L001`-style for lexer errors, `P001`-style for parse errors
/// and the rule code, e.g. `KNOWN_TYPE_NAMES`, for validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub severity: DiagSeverity,
    pub message: String,
    /// Labeled spans, primary first.
    pub labels: Vec<DiagLabel>,
    pub help: Option<String>,
    pub code: Option<String>,
}

impl Diag {
    pub fn new(severity: DiagSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Error, message)
    }

    pub fn with_primary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.with_label(span, message, LabelRole::Primary)
    }

    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.with_label(span, message, LabelRole::Secondary)
    }

    fn with_label(mut self, span: Span, message: impl Into<String>, role: LabelRole) -> Self {
        self.labels.push(DiagLabel {
            span,
            message: message.into(),
            role,
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagSeverity::Error
    }
}

/// Returns true if any diagnostic in the slice is an error.
pub fn has_errors(diagnostics: &[Diag]) -> bool {
    diagnostics.iter().any(Diag::is_error)
}

/// Source text attached to rendered reports.
///
/// Validation spans may come from a different revision of the document than
/// the text being rendered, so every span is clamped to the source.
#[derive(Debug, Clone)]
pub struct SourceFile {
    content: String,
}

impl SourceFile {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Clamps a span into the source, turning inverted spans empty.
    pub fn clamp_span(&self, span: &Span) -> Span {
        let len = self.content.len();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        start..end
    }
}

/// Converts diagnostics to miette reports carrying the source text.
pub fn convert_diagnostics_to_reports(diagnostics: &[Diag], source: &SourceFile) -> Vec<Report> {
    diagnostics
        .iter()
        .map(|diag| {
            Report::new(RenderedDiag::new(diag, source))
                .with_source_code(source.content().to_string())
        })
        .collect()
}

/// A [`Diag`] resolved against its source, ready for miette.
#[derive(Debug)]
struct RenderedDiag {
    message: String,
    severity: Severity,
    code: Option<String>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
}

impl RenderedDiag {
    fn new(diag: &Diag, source: &SourceFile) -> Self {
        let labels = diag
            .labels
            .iter()
            .map(|label| {
                let span = source.clamp_span(&label.span);
                let span = (span.start, span.end - span.start);
                let text = (!label.message.is_empty()).then(|| label.message.clone());
                match label.role {
                    LabelRole::Primary => LabeledSpan::new_primary_with_span(text, span),
                    LabelRole::Secondary => LabeledSpan::new_with_span(text, span),
                }
            })
            .collect();

        Self {
            message: diag.message.clone(),
            severity: match diag.severity {
                DiagSeverity::Error => Severity::Error,
                DiagSeverity::Warning => Severity::Warning,
            },
            code: diag.code.clone(),
            help: diag.help.clone(),
            labels,
        }
    }
}

impl fmt::Display for RenderedDiag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RenderedDiag {}

impl Diagnostic for RenderedDiag {
    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.iter().cloned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_label_order() {
        let diag = Diag::error("There can be only one fragment named 'frag'.")
            .with_primary_label(20..25, "")
            .with_secondary_label(5..10, "first defined here")
            .with_code("UNIQUE_FRAGMENT_NAMES");

        assert!(diag.is_error());
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[0].role, LabelRole::Primary);
        assert_eq!(diag.labels[1].message, "first defined here");
        assert_eq!(diag.code.as_deref(), Some("UNIQUE_FRAGMENT_NAMES"));
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let warning = Diag::new(DiagSeverity::Warning, "field 'Dog.barks' is deprecated");
        assert!(!has_errors(std::slice::from_ref(&warning)));
        assert!(has_errors(&[warning, Diag::error("boom")]));
        assert_eq!(DiagSeverity::Warning.to_string(), "warning");
    }

    #[test]
    fn clamp_span() {
        let source = SourceFile::new("hello");
        assert_eq!(source.clamp_span(&(0..10)), 0..5);
        assert_eq!(source.clamp_span(&(2..4)), 2..4);
        assert_eq!(source.clamp_span(&(10..20)), 5..5);
        let inverted = std::ops::Range { start: 3, end: 2 };
        assert_eq!(source.clamp_span(&inverted), 3..3);
    }

    #[test]
    fn reports_keep_message_code_and_labels() {
        let source = SourceFile::new("fragment a on Dog { name }\nfragment a on Dog { name }");
        let diag = Diag::error("There can be only one fragment named 'a'.")
            .with_primary_label(9..10, "")
            .with_secondary_label(36..37, "")
            .with_code("UNIQUE_FRAGMENT_NAMES")
            .with_help("rename one of the fragments");

        let reports = convert_diagnostics_to_reports(&[diag], &source);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.to_string(), "There can be only one fragment named 'a'.");
        assert_eq!(
            report.code().map(|code| code.to_string()),
            Some("UNIQUE_FRAGMENT_NAMES".to_string())
        );
        assert_eq!(
            report.help().map(|help| help.to_string()),
            Some("rename one of the fragments".to_string())
        );
        let labels: Vec<_> = report.labels().expect("labels").collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[1].offset(), 36);
    }

    #[test]
    fn out_of_range_spans_are_clamped() {
        let source = SourceFile::new("{ a }");
        let diag = Diag::error("unexpected end of input").with_primary_label(3..40, "here");
        let reports = convert_diagnostics_to_reports(&[diag], &source);
        let label = reports[0].labels().expect("labels").next().expect("one label");
        assert_eq!((label.offset(), label.len()), (3, 2));
    }
}
