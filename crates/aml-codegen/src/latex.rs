//! LaTeX emitter for math subtrees.
//!
//! Math is taken from the syntax tree as written, not from the lowered IR:
//! commands and blocks inside `\{…}` and `\math{…}` are LaTeX, not AML.

use aml_lexer::EnclosureKind;
use aml_parser::{Argument, Block, Node};

/// LaTeX for inline math.
pub fn to_latex_inline(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

/// LaTeX for display math, wrapped in a split equation environment.
pub fn to_latex_equation(nodes: &[Node]) -> String {
    format!(
        "\\begin{{equation*}}\\begin{{split}}{}\\end{{split}}\\end{{equation*}}",
        to_latex_inline(nodes)
    )
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(token) | Node::Error(token) => out.push_str(&token.text),
        Node::String(string) => out.push_str(&string.text()),
        Node::Block(block) => write_block(block, out),
        Node::Command(cmd) => {
            out.push_str(cmd.name());
            for argument in &cmd.arguments {
                match argument {
                    Argument::Block(block) => write_block(block, out),
                    Argument::Script(script) => {
                        out.push_str(&script.op.text);
                        write_node(&script.operand, out);
                    }
                }
            }
        }
        Node::MacroRules(_) => {}
    }
}

/// Parens and brackets become auto-sized delimiters.
fn write_block(block: &Block, out: &mut String) {
    let sized = matches!(
        block.kind(),
        Some(EnclosureKind::Paren | EnclosureKind::Bracket)
    );
    if sized {
        out.push_str("\\left");
    }
    out.push_str(&block.open.text);
    for child in &block.children {
        write_node(child, out);
    }
    if let Some(close) = &block.close {
        if sized {
            out.push_str("\\right");
        }
        out.push_str(&close.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aml_parser::{normalize, Parser};
    use pretty_assertions::assert_eq;

    fn inline(source: &str) -> String {
        to_latex_inline(&normalize(Parser::parse_source(source)).nodes)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(inline("x + y"), "x + y");
    }

    #[test]
    fn test_commands_and_scripts() {
        assert_eq!(inline("\\frac{a}{b}^2_{i}"), "\\frac{a}{b}^2_{i}");
    }

    #[test]
    fn test_sized_delimiters() {
        assert_eq!(inline("(a[b]{c})"), "\\left(a\\left[b\\right]{c}\\right)");
    }

    #[test]
    fn test_equation_wrapper() {
        let nodes = normalize(Parser::parse_source("x^2")).nodes;
        assert_eq!(
            to_latex_equation(&nodes),
            "\\begin{equation*}\\begin{split}x^2\\end{split}\\end{equation*}"
        );
    }

    #[test]
    fn test_macro_definitions_are_skipped() {
        assert_eq!(inline("\\macroRules![\\v]{} a"), " a");
    }

    #[test]
    fn test_unterminated_block_without_normalizing() {
        let nodes = Parser::parse_source("(a");
        assert_eq!(to_latex_inline(&nodes), "(a");
    }
}
