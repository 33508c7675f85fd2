//! Normalization pass.
//!
//! Trims whitespace at the edges of every block, drops blocks that were never
//! closed and records macro definitions. The output tree is what lowering
//! consumes; the highlighter works on the raw tree instead.

use crate::cst::{Argument, Block, Command, Node, ScriptOp};
use crate::macros::MacroTable;
use crate::scope::Scope;
use crate::StructuralError;

/// The normalized tree together with what the pass collected on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub nodes: Vec<Node>,
    pub macros: MacroTable,
    pub errors: Vec<StructuralError>,
}

/// Normalize a parsed document.
pub fn normalize(nodes: Vec<Node>) -> Normalized {
    let mut normalizer = Normalizer::default();
    let scope = Scope::root();
    let nodes = nodes
        .into_iter()
        .filter_map(|node| normalizer.node(node, scope))
        .collect();

    log::debug!(
        "normalized document: {} macro definition(s), {} structural error(s)",
        normalizer.macros.len(),
        normalizer.errors.len()
    );

    Normalized {
        nodes,
        macros: normalizer.macros,
        errors: normalizer.errors,
    }
}

#[derive(Default)]
struct Normalizer {
    macros: MacroTable,
    errors: Vec<StructuralError>,
}

impl Normalizer {
    fn node(&mut self, node: Node, scope: Scope<'_>) -> Option<Node> {
        match node {
            Node::Block(block) => self.block(block, scope).map(Node::Block),
            Node::Command(cmd) => Some(Node::Command(self.command(cmd, scope))),
            Node::MacroRules(rules) => {
                self.macros.insert(rules.clone());
                Some(Node::MacroRules(rules))
            }
            leaf => {
                self.check_leaf(&leaf);
                Some(leaf)
            }
        }
    }

    fn check_leaf(&mut self, leaf: &Node) {
        match leaf {
            Node::String(string) if !string.is_terminated() => {
                self.errors.push(StructuralError::UnterminatedString {
                    span: string.span(),
                });
            }
            Node::Error(token) if token.is_close_enclosure() => {
                self.errors.push(StructuralError::UnmatchedClose {
                    text: token.text.clone(),
                    span: token.span,
                });
            }
            Node::Error(token) => {
                self.errors.push(StructuralError::NestingTooDeep {
                    text: token.text.clone(),
                    span: token.span,
                });
            }
            _ => {}
        }
    }

    /// Unterminated blocks disappear here, contents included.
    fn block(&mut self, block: Block, scope: Scope<'_>) -> Option<Block> {
        if !block.is_well_formed() {
            self.errors.push(StructuralError::UnterminatedBlock {
                open: block.open.text.clone(),
                span: block.span(),
            });
            return None;
        }

        let Block {
            open,
            children,
            close,
        } = block.trim_whitespace();
        let children = children
            .into_iter()
            .filter_map(|child| self.node(child, scope))
            .collect();

        Some(Block {
            open,
            children,
            close,
        })
    }

    /// Arguments are normalized one scope deeper. Rewrite-rule clauses are
    /// not carried into the normalized tree.
    fn command(&mut self, cmd: Command, scope: Scope<'_>) -> Command {
        let Command {
            ident, arguments, ..
        } = cmd;
        let inner = scope.push(&ident.text);

        let arguments = arguments
            .into_iter()
            .filter_map(|argument| match argument {
                Argument::Block(block) => self.block(block, inner).map(Argument::Block),
                Argument::Script(ScriptOp { op, operand }) => {
                    self.node(*operand, inner).map(|operand| {
                        Argument::Script(ScriptOp {
                            op,
                            operand: Box::new(operand),
                        })
                    })
                }
            })
            .collect();

        Command {
            ident,
            arguments,
            rewrite_rules: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Normalized {
        normalize(Parser::parse_source(source))
    }

    fn block_texts(block: &Block) -> Vec<String> {
        block.children.iter().filter_map(Node::leaf_text).collect()
    }

    #[test]
    fn test_trims_block_edges() {
        let out = run("{  a b \n}");
        let block = out.nodes[0].as_block().unwrap();
        assert_eq!(block_texts(block), vec!["a", " ", "b"]);
    }

    #[test]
    fn test_top_level_whitespace_is_kept() {
        let out = run(" a ");
        assert_eq!(out.nodes.len(), 3);
    }

    #[test]
    fn test_drops_unterminated_block() {
        let out = run("x{a{b}c");
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(
            out.errors,
            vec![StructuralError::UnterminatedBlock {
                open: "{".into(),
                span: aml_lexer::Span::new(1, 7, 1, 2),
            }]
        );
    }

    #[test]
    fn test_drops_unterminated_argument() {
        let out = run("\\p{a}{b");
        let cmd = out.nodes[0].as_command().unwrap();
        assert_eq!(cmd.arguments.len(), 1);
        assert_eq!(out.errors.len(), 1);
    }

    #[test]
    fn test_normalizes_inside_arguments_and_scripts() {
        let out = run("\\sum^{ n }{ x }");
        let cmd = out.nodes[0].as_command().unwrap();
        match &cmd.arguments[0] {
            Argument::Script(script) => {
                let block = script.operand.as_block().unwrap();
                assert_eq!(block_texts(block), vec!["n"]);
            }
            other => panic!("Expected script, got {other:?}"),
        }
        assert_eq!(block_texts(cmd.arguments[1].as_block().unwrap()), vec!["x"]);
    }

    #[test]
    fn test_drops_rewrite_rules() {
        let out = run("\\x{a}\\where!{ {a} => {b} }");
        let cmd = out.nodes[0].as_command().unwrap();
        assert!(cmd.rewrite_rules.is_none());
    }

    #[test]
    fn test_records_macros_and_keeps_them() {
        let out = run("\\macroRules![\\v]{ [{$x}] => {\\b{$x}} }\n\\macroRules![\\v]{}");
        assert_eq!(out.macros.len(), 2);
        assert_eq!(out.macros.get("\\v").len(), 2);
        assert!(matches!(out.nodes[0], Node::MacroRules(_)));
        assert!(out.errors.is_empty());
    }

    #[test]
    fn test_reports_nesting_past_the_limit() {
        let depth = 3000;
        let out = run(&format!("{}x", "\\a^".repeat(depth)));
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.errors.len(), depth - crate::MAX_NESTING);
        assert!(out.errors.iter().all(|error| matches!(
            error,
            StructuralError::NestingTooDeep { text, .. } if text == "\\a"
        )));
    }

    #[test]
    fn test_reports_unterminated_string_and_stray_close() {
        let out = run("\"open\n}");
        assert!(matches!(out.errors[0], StructuralError::UnterminatedString { .. }));
        assert!(matches!(&out.errors[1], StructuralError::UnmatchedClose { text, .. } if text == "}"));
    }
}
