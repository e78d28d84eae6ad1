//! Error and diagnostic types

use miette::{LabeledSpan, SourceSpan};
use serde::{Deserialize, Serialize};

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset from start of source
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Span {
    /// Create a span covering a whole source line
    pub fn line(line: usize, offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            line,
            column: 1,
        }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.offset.into(), span.length)
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Types of diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A lint rule found a convention mismatch
    RuleViolation,
    /// The parser rejected the script
    ParseError,
}

impl DiagnosticKind {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::RuleViolation => "rule-violation",
            DiagnosticKind::ParseError => "parse-error",
        }
    }
}

/// A single lint diagnostic.
///
/// Rule violations carry the id of the rule that produced them. A violation
/// whose offending text could not be found in the source keeps its message
/// but has no `span`; see [`LintError::is_located`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct LintError {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Rule identifier, e.g. `boolean-field`. `parse-error` for parse failures.
    pub rule: String,
    pub message: String,
    /// Name of the script the diagnostic was raised against
    pub script: String,
    /// Text of the AST node that was being inspected
    pub snippet: String,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl LintError {
    pub fn violation(
        rule: impl Into<String>,
        script: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticKind::RuleViolation,
            severity: Severity::Error,
            rule: rule.into(),
            message: message.into(),
            script: script.into(),
            snippet: String::new(),
            span: None,
            help: None,
        }
    }

    pub fn parse_error(script: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::ParseError,
            severity: Severity::Error,
            rule: DiagnosticKind::ParseError.name().to_string(),
            message: message.into(),
            script: script.into(),
            snippet: String::new(),
            span: None,
            help: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Resolved line number (1-indexed), if the location was found
    pub fn line(&self) -> Option<usize> {
        self.span.map(|s| s.line)
    }

    pub fn is_located(&self) -> bool {
        self.span.is_some()
    }

    /// Get the code string reported to users (the rule id)
    pub fn code(&self) -> &str {
        &self.rule
    }
}

impl miette::Diagnostic for LintError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.rule))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some("here".to_string()),
            SourceSpan::from(span),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_without_span_is_unlocated() {
        let err = LintError::violation("boolean-field", "a.sql", "bad");
        assert!(!err.is_located());
        assert_eq!(err.line(), None);
        assert_eq!(err.to_string(), "bad");
    }

    #[test]
    fn test_parse_error_code() {
        let err = LintError::parse_error("a.sql", "unexpected token");
        assert_eq!(err.kind, DiagnosticKind::ParseError);
        assert_eq!(err.code(), "parse-error");
    }

    #[test]
    fn test_span_into_source_span() {
        let span = Span::line(3, 20, 12);
        let source: SourceSpan = span.into();
        assert_eq!(source.offset(), 20);
        assert_eq!(source.len(), 12);
    }
}
