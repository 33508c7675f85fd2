//! Read-only traversal of the syntax tree.
//!
//! Every `visit_*` method defaults to the matching `walk_*` function, which
//! descends into children. Override a method to act on a node; call the walk
//! function from the override to keep descending. Commands push their
//! identifier onto the scope before their arguments are walked.

use crate::cst::{Argument, Block, Command, MacroRules, Node, RewriteRules, ScriptOp, StringLiteral};
use crate::scope::Scope;
use aml_lexer::Token;

pub trait Visit<'ast> {
    fn visit_node(&mut self, node: &'ast Node, scope: Scope<'_>) {
        walk_node(self, node, scope);
    }

    fn visit_text(&mut self, _token: &'ast Token, _scope: Scope<'_>) {}

    fn visit_string(&mut self, _string: &'ast StringLiteral, _scope: Scope<'_>) {}

    fn visit_error(&mut self, _token: &'ast Token, _scope: Scope<'_>) {}

    fn visit_block(&mut self, block: &'ast Block, scope: Scope<'_>) {
        walk_block(self, block, scope);
    }

    fn visit_command(&mut self, cmd: &'ast Command, scope: Scope<'_>) {
        walk_command(self, cmd, scope);
    }

    fn visit_script(&mut self, script: &'ast ScriptOp, scope: Scope<'_>) {
        walk_script(self, script, scope);
    }

    fn visit_rewrite_rules(&mut self, rules: &'ast RewriteRules, scope: Scope<'_>) {
        walk_rewrite_rules(self, rules, scope);
    }

    fn visit_macro_rules(&mut self, rules: &'ast MacroRules, scope: Scope<'_>) {
        walk_macro_rules(self, rules, scope);
    }
}

/// Visit every node of a document from the root scope.
pub fn visit_document<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, nodes: &'ast [Node]) {
    for node in nodes {
        visitor.visit_node(node, Scope::root());
    }
}

pub fn walk_node<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, node: &'ast Node, scope: Scope<'_>) {
    match node {
        Node::Text(token) => visitor.visit_text(token, scope),
        Node::String(string) => visitor.visit_string(string, scope),
        Node::Error(token) => visitor.visit_error(token, scope),
        Node::Command(cmd) => visitor.visit_command(cmd, scope),
        Node::Block(block) => visitor.visit_block(block, scope),
        Node::MacroRules(rules) => visitor.visit_macro_rules(rules, scope),
    }
}

pub fn walk_block<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, block: &'ast Block, scope: Scope<'_>) {
    for child in &block.children {
        visitor.visit_node(child, scope);
    }
}

pub fn walk_command<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, cmd: &'ast Command, scope: Scope<'_>) {
    let inner = scope.push(cmd.name());
    for argument in &cmd.arguments {
        match argument {
            Argument::Block(block) => visitor.visit_block(block, inner),
            Argument::Script(script) => visitor.visit_script(script, inner),
        }
    }
    if let Some(rules) = &cmd.rewrite_rules {
        visitor.visit_rewrite_rules(rules, inner);
    }
}

pub fn walk_script<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, script: &'ast ScriptOp, scope: Scope<'_>) {
    visitor.visit_node(&script.operand, scope);
}

pub fn walk_rewrite_rules<'ast, V: Visit<'ast> + ?Sized>(
    visitor: &mut V,
    rules: &'ast RewriteRules,
    scope: Scope<'_>,
) {
    for rule in &rules.rules {
        visitor.visit_node(&rule.pattern, scope);
        visitor.visit_node(&rule.target, scope);
    }
}

/// Only rule targets are walked, in the scope of the definition itself.
pub fn walk_macro_rules<'ast, V: Visit<'ast> + ?Sized>(
    visitor: &mut V,
    rules: &'ast MacroRules,
    scope: Scope<'_>,
) {
    for rule in &rules.rules {
        visitor.visit_block(&rule.target, scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct TextCollector {
        seen: Vec<(String, usize)>,
    }

    impl<'ast> Visit<'ast> for TextCollector {
        fn visit_text(&mut self, token: &'ast Token, scope: Scope<'_>) {
            if !token.is_whitespace() {
                self.seen.push((token.text.clone(), scope.depth()));
            }
        }
    }

    fn collect(source: &str) -> Vec<(String, usize)> {
        let nodes = Parser::parse_source(source);
        let mut collector = TextCollector::default();
        visit_document(&mut collector, &nodes);
        collector.seen
    }

    #[test]
    fn test_depth_follows_commands() {
        assert_eq!(
            collect("a \\p{b \\em{c}} {d}"),
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_scripts_and_rewrite_rules_are_walked() {
        assert_eq!(
            collect("\\x^n\\where!{ {a} => {b} }"),
            vec![
                ("n".to_string(), 1),
                ("a".to_string(), 1),
                ("b".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_macro_targets_only() {
        assert_eq!(
            collect("\\macroRules![\\v]{ [{$x}] => {y \\b{z}} }"),
            vec![("y".to_string(), 0), ("z".to_string(), 1)]
        );
    }

    #[test]
    fn test_override_can_stop_descent() {
        struct NoScripts(usize);
        impl<'ast> Visit<'ast> for NoScripts {
            fn visit_script(&mut self, _script: &'ast ScriptOp, _scope: Scope<'_>) {}
            fn visit_text(&mut self, _token: &'ast Token, _scope: Scope<'_>) {
                self.0 += 1;
            }
        }
        let nodes = Parser::parse_source("\\x^n{m}");
        let mut visitor = NoScripts(0);
        visit_document(&mut visitor, &nodes);
        assert_eq!(visitor.0, 1);
    }
}
