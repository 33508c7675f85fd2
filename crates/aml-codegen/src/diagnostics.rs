//! Problems reported while compiling a document.
//!
//! Compilation never aborts: every problem becomes a `Diagnostic` attached to
//! its source span, and the offending subtree is skipped or kept as-is.

use aml_parser::{Span, StructuralError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("Unsupported command '{name}' at line {}, column {}", span.line, span.column)]
    UnsupportedCommand { name: String, span: Span },

    #[error("Macro '{name}' is defined but cannot be expanded (line {}, column {})", span.line, span.column)]
    UnexpandedMacro { name: String, span: Span },

    #[error("Invalid arguments for '{name}' at line {}, column {}: expected {expected}", span.line, span.column)]
    InvalidArguments {
        name: String,
        expected: &'static str,
        span: Span,
    },

    #[error("Unterminated block at line {}, column {}: missing close for '{open}'", span.line, span.column)]
    UnterminatedBlock { open: String, span: Span },

    #[error("Unterminated string at line {}, column {}", span.line, span.column)]
    UnterminatedString { span: Span },

    #[error("Unmatched '{text}' at line {}, column {}", span.line, span.column)]
    UnmatchedClose { text: String, span: Span },

    #[error("'{text}' at line {}, column {} is nested too deeply and was kept as text", span.line, span.column)]
    NestingTooDeep { text: String, span: Span },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::UnterminatedString { .. } | Diagnostic::UnmatchedClose { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn span(&self) -> Span {
        match self {
            Diagnostic::UnsupportedCommand { span, .. }
            | Diagnostic::UnexpandedMacro { span, .. }
            | Diagnostic::InvalidArguments { span, .. }
            | Diagnostic::UnterminatedBlock { span, .. }
            | Diagnostic::UnterminatedString { span }
            | Diagnostic::UnmatchedClose { span, .. }
            | Diagnostic::NestingTooDeep { span, .. } => *span,
        }
    }

    /// Short machine-readable name of the diagnostic kind.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::UnsupportedCommand { .. } => "unsupported-command",
            Diagnostic::UnexpandedMacro { .. } => "unexpanded-macro",
            Diagnostic::InvalidArguments { .. } => "invalid-arguments",
            Diagnostic::UnterminatedBlock { .. } => "unterminated-block",
            Diagnostic::UnterminatedString { .. } => "unterminated-string",
            Diagnostic::UnmatchedClose { .. } => "unmatched-close",
            Diagnostic::NestingTooDeep { .. } => "nesting-too-deep",
        }
    }
}

impl From<StructuralError> for Diagnostic {
    fn from(error: StructuralError) -> Self {
        match error {
            StructuralError::UnterminatedBlock { open, span } => {
                Diagnostic::UnterminatedBlock { open, span }
            }
            StructuralError::UnterminatedString { span } => Diagnostic::UnterminatedString { span },
            StructuralError::UnmatchedClose { text, span } => {
                Diagnostic::UnmatchedClose { text, span }
            }
            StructuralError::NestingTooDeep { text, span } => {
                Diagnostic::NestingTooDeep { text, span }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_severity() {
        let span = Span::new(0, 2, 1, 1);
        assert_eq!(
            Diagnostic::UnsupportedCommand {
                name: "\\foo".into(),
                span
            }
            .severity(),
            Severity::Error
        );
        assert_eq!(Diagnostic::UnterminatedString { span }.severity(), Severity::Warning);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::InvalidArguments {
            name: "\\h1".into(),
            expected: "one {…} argument",
            span: Span::new(4, 7, 2, 1),
        };
        assert_eq!(
            diagnostic.to_string(),
            "Invalid arguments for '\\h1' at line 2, column 1: expected one {…} argument"
        );
        assert_eq!(diagnostic.code(), "invalid-arguments");
    }

    #[test]
    fn test_from_structural_error() {
        let span = Span::new(3, 9, 1, 4);
        let diagnostic: Diagnostic = StructuralError::UnterminatedBlock {
            open: "{".into(),
            span,
        }
        .into();
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.span(), span);

        let diagnostic: Diagnostic = StructuralError::NestingTooDeep {
            text: "{".into(),
            span,
        }
        .into();
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.code(), "nesting-too-deep");
    }
}
