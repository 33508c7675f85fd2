//! AML Code Generator
//!
//! Lowers the normalized syntax tree to Core IR and renders it as a standalone
//! HTML document. Math is emitted as LaTeX and typeset by KaTeX in the browser.
//!
//! ```text
//! source → tokenize → parse → normalize → lower → to_html → package
//! ```
//!
//! ```
//! let compilation = aml_codegen::compile("\\h1{Intro}\\p{Let \\{x^2} be given.}");
//! assert!(compilation.is_complete());
//! assert!(compilation.body.contains("<h1 id=\"UID"));
//! assert!(compilation.document.contains("renderInlineMath([\"aml-math-0\"])"));
//! ```

pub mod diagnostics;
pub mod document;
pub mod html;
pub mod ir;
pub mod latex;
pub mod lower;
pub mod options;

pub use aml_parser::{HighlightSpan, MacroTable};
pub use diagnostics::{Diagnostic, Severity};
pub use html::RenderState;
pub use lower::{Lowerer, MacroExpander};
pub use options::CompileOptions;

use aml_parser::{extract_highlights, normalize, Parser};

/// Everything produced by compiling one document.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// The complete HTML page.
    pub document: String,
    /// The rendered body alone, without table of contents or page shell.
    pub body: String,
    /// Structural problems first, then lowering problems, each in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// Macro definitions recorded while normalizing.
    pub macros: MacroTable,
}

impl Compilation {
    /// True when nothing was dropped or left unlowered.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Compile an AML document with default options.
pub fn compile(source: &str) -> Compilation {
    compile_with(source, &CompileOptions::default())
}

/// Compile an AML document.
pub fn compile_with(source: &str, options: &CompileOptions) -> Compilation {
    let normalized = normalize(Parser::parse_source(source));
    let mut diagnostics: Vec<Diagnostic> =
        normalized.errors.into_iter().map(Diagnostic::from).collect();

    let mut lowerer = Lowerer::new(&normalized.macros);
    let nodes = lowerer.lower_document(&normalized.nodes);
    diagnostics.extend(lowerer.into_diagnostics());

    let mut state = RenderState::new();
    let body = html::to_html(&ir::Node::Fragment(nodes), &mut state);
    let document = document::package(&body, &mut state, options);
    log::debug!(
        "compiled {} byte(s) of source into {} byte(s) of HTML, {} diagnostic(s)",
        source.len(),
        document.len(),
        diagnostics.len()
    );

    Compilation {
        document,
        body,
        diagnostics,
        macros: normalized.macros,
    }
}

/// Highlight spans for an editor, taken from the tree as parsed.
pub fn highlight(source: &str) -> Vec<HighlightSpan> {
    extract_highlights(&Parser::parse_source(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_empty() {
        let compilation = compile("");
        assert_eq!(compilation.body, "");
        assert!(compilation.diagnostics.is_empty());
        assert!(compilation.macros.is_empty());
        assert!(compilation.is_complete());
        assert!(compilation.document.contains("<ul toc-entries></ul>"));
    }

    #[test]
    fn test_structural_errors_come_first() {
        let compilation = compile("\\nope (a");
        let codes: Vec<_> = compilation.diagnostics.iter().map(Diagnostic::code).collect();
        assert_eq!(codes, vec!["unterminated-block", "unsupported-command"]);
        assert!(!compilation.is_complete());
    }

    #[test]
    fn test_warnings_keep_compilation_complete() {
        let compilation = compile("\\p{\"open\n}");
        assert_eq!(compilation.diagnostics.len(), 1);
        assert_eq!(compilation.diagnostics[0].severity(), Severity::Warning);
        assert!(compilation.is_complete());
    }

    #[test]
    fn test_macros_are_recorded() {
        let compilation = compile("\\macroRules![\\v]{ [\\x] => {\\x} }");
        assert!(compilation.macros.contains("\\v"));
        assert_eq!(compilation.body, "");
    }

    #[test]
    fn test_custom_options() {
        let options = CompileOptions {
            toc: false,
            title: Some("Notes".into()),
            ..CompileOptions::default()
        };
        let compilation = compile_with("\\h1{A}", &options);
        assert!(!compilation.document.contains("<div toc>"));
        assert!(compilation.document.contains("<title>Notes</title>"));
    }

    #[test]
    fn test_highlight_facade() {
        let spans = highlight("\\p{\"s\"}");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind(), "command");
        assert_eq!(spans[1].kind(), "string");
    }
}
