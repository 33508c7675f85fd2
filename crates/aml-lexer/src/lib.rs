//! AML Lexer
//!
//! Tokenizes AML source into a flat stream of tokens. Tokenization is total:
//! any text produces a token stream, and the token texts concatenate back to
//! the source text.
//!
//! # Example
//!
//! ```
//! use aml_lexer::Scanner;
//!
//! let tokens = Scanner::tokenize("\\p{Hello}");
//! assert_eq!(tokens.len(), 4);
//! assert!(tokens[0].is_identifier());
//! ```

pub mod scanner;
pub mod token;

pub use scanner::{CharClass, Scanner};
pub use token::{EnclosureKind, Span, Token, MACRO_RULES_KEYWORD, WHERE_KEYWORD};
