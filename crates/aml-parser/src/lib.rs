//! AML Parser
//!
//! Parses the token stream from `aml-lexer` into a concrete syntax tree,
//! normalizes it for lowering and extracts highlight spans for editors.
//!
//! ```
//! use aml_parser::{normalize, Node, Parser};
//!
//! let nodes = Parser::parse_source("\\p{ Hello }");
//! let normalized = normalize(nodes);
//! assert!(matches!(normalized.nodes[0], Node::Command(_)));
//! assert!(normalized.errors.is_empty());
//! ```

pub mod cst;
pub mod highlight;
pub mod macros;
pub mod normalize;
pub mod parser;
pub mod scope;
pub mod visit;

pub use aml_lexer::Span;
pub use cst::{Argument, Block, Command, MacroRules, Node, ScriptOp, StringLiteral};
pub use highlight::{extract_highlights, Color, HighlightSpan};
pub use macros::MacroTable;
pub use normalize::{normalize, Normalized};
pub use parser::{Parser, MAX_NESTING};
pub use scope::Scope;
pub use visit::Visit;

/// Structural problem found while normalizing a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("Unterminated block at line {}, column {}: missing close for '{open}'", span.line, span.column)]
    UnterminatedBlock { open: String, span: Span },

    #[error("Unterminated string at line {}, column {}", span.line, span.column)]
    UnterminatedString { span: Span },

    #[error("Unmatched '{text}' at line {}, column {}", span.line, span.column)]
    UnmatchedClose { text: String, span: Span },

    #[error("'{text}' at line {}, column {} is nested too deeply", span.line, span.column)]
    NestingTooDeep { text: String, span: Span },
}

impl StructuralError {
    pub fn span(&self) -> Span {
        match self {
            StructuralError::UnterminatedBlock { span, .. }
            | StructuralError::UnterminatedString { span }
            | StructuralError::UnmatchedClose { span, .. }
            | StructuralError::NestingTooDeep { span, .. } => *span,
        }
    }
}
