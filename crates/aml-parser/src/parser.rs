//! Document parser for AML.
//!
//! Turns the flat token stream from `aml-lexer` into a concrete syntax tree
//! using recursive descent with unlimited backtracking. The token buffer is
//! never mutated: the parser position is a plain index, so saving and
//! restoring it is a copy.
//!
//! The parser never fails. Productions that do not match give the cursor back
//! and the caller tries the next alternative; anything left over becomes a
//! text node.

use crate::cst::{
    Argument, Binder, Block, Command, MacroRule, MacroRules, Node, RewriteRule, RewriteRules,
    ScriptOp, StringLiteral,
};
use aml_lexer::{EnclosureKind, Scanner, Token, MACRO_RULES_KEYWORD, WHERE_KEYWORD};

/// Arrow separating patterns from targets in rule lists.
const ARROW: &str = "=>";

/// Deepest node nesting the parser builds. Past it, tokens that would open a
/// command or block become error leaves, which keeps recursion in this and
/// every later pass bounded.
pub const MAX_NESTING: usize = 64;

/// AML document parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Tokenize and parse a whole document.
    pub fn parse_source(source: &str) -> Vec<Node> {
        Parser::new(Scanner::tokenize(source)).parse(true)
    }

    /// Parse the full token stream. Macro definitions are only recognized
    /// when `top_level` is set.
    pub fn parse(mut self, top_level: bool) -> Vec<Node> {
        let mut nodes = Vec::new();
        while let Some(node) = self.parse_node(top_level, false) {
            nodes.push(node);
        }
        debug_assert!(self.is_at_end(), "parser stopped before end of input");
        log::debug!("parsed {} top-level nodes", nodes.len());
        nodes
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Parse the next node. Nested parses stop at close tokens so the
    /// enclosing block can claim them; outer parses turn them into errors.
    fn parse_node(&mut self, top_level: bool, nested: bool) -> Option<Node> {
        if self.depth >= MAX_NESTING {
            return self.parse_flat_node();
        }
        self.depth += 1;
        let node = self.parse_nested_node(top_level, nested);
        self.depth -= 1;
        node
    }

    fn parse_nested_node(&mut self, top_level: bool, nested: bool) -> Option<Node> {
        if top_level {
            if let Some(rules) = self.parse_macro_rules() {
                return Some(Node::MacroRules(rules));
            }
        }
        if let Some(string) = self.parse_string() {
            return Some(Node::String(string));
        }
        if let Some(cmd) = self.parse_command() {
            return Some(Node::Command(cmd));
        }
        if let Some(block) = self.parse_block(None, false) {
            return Some(Node::Block(block));
        }

        let token = self.peek()?;
        if token.is_close_enclosure() {
            if nested {
                return None;
            }
            return self.bump().map(Node::Error);
        }
        self.bump().map(Node::Text)
    }

    /// A node at the nesting limit. Strings still parse since they do not
    /// recurse; openers and identifiers are kept as error leaves.
    fn parse_flat_node(&mut self) -> Option<Node> {
        if let Some(string) = self.parse_string() {
            return Some(Node::String(string));
        }
        let token = self.peek()?;
        if token.is_close_enclosure() {
            return None;
        }
        if token.is_open_enclosure() || token.is_identifier() {
            log::trace!("nesting limit reached at {:?}", token.span);
            return self.bump().map(Node::Error);
        }
        self.bump().map(Node::Text)
    }

    /// `"…"` or `“…”`. A missing close quote ends the string after the first
    /// token containing a newline; with no newline either, nothing matches.
    fn parse_string(&mut self) -> Option<StringLiteral> {
        let close_quote = match self.peek()?.text.as_str() {
            "\"" => "\"",
            "“" => "”",
            _ => return None,
        };
        let mark = self.save();
        let open = self.bump()?;

        let mut inner = Vec::new();
        while let Some(token) = self.bump() {
            if token.text == close_quote {
                return Some(StringLiteral {
                    open,
                    value: merge_tokens(inner),
                    close: Some(token),
                });
            }
            let newline = token.contains_newline();
            inner.push(token);
            if newline {
                return Some(StringLiteral {
                    open,
                    value: merge_tokens(inner),
                    close: None,
                });
            }
        }

        self.restore(mark);
        None
    }

    /// An enclosure. With `ensure_close`, a block without its close token is
    /// rolled back and reported as no match; otherwise it is returned as an
    /// unterminated block.
    fn parse_block(&mut self, expected: Option<EnclosureKind>, ensure_close: bool) -> Option<Block> {
        let mark = self.save();
        let open_kind = self.peek()?.open_kind()?;
        if expected.is_some_and(|kind| kind != open_kind) {
            return None;
        }
        let open = self.bump()?;

        let mut children = Vec::new();
        while let Some(node) = self.parse_node(false, true) {
            children.push(node);
        }

        let close = match self.peek() {
            Some(token) if open.matches_close(token) => self.bump(),
            _ => None,
        };
        if ensure_close && close.is_none() {
            self.restore(mark);
            return None;
        }

        Some(Block {
            open,
            children,
            close,
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// `\ident` followed by arguments and an optional `\where!` clause.
    fn parse_command(&mut self) -> Option<Command> {
        let token = self.peek()?;
        if !token.is_identifier() || token.text == MACRO_RULES_KEYWORD {
            return None;
        }
        let ident = self.bump()?;

        let mut arguments = Vec::new();
        while let Some(argument) = self.parse_argument() {
            arguments.push(argument);
        }
        let rewrite_rules = self.parse_rewrite_rules();

        Some(Command {
            ident,
            arguments,
            rewrite_rules,
        })
    }

    fn parse_argument(&mut self) -> Option<Argument> {
        if let Some(script) = self.parse_script() {
            return Some(Argument::Script(script));
        }
        self.parse_block(None, false).map(Argument::Block)
    }

    /// `^operand` / `_operand`. The operator is given back when no operand
    /// follows.
    fn parse_script(&mut self) -> Option<ScriptOp> {
        if !self.peek()?.is_prefix_op() {
            return None;
        }
        let mark = self.save();
        let op = self.bump()?;
        match self.parse_node(false, true) {
            Some(operand) => Some(ScriptOp {
                op,
                operand: Box::new(operand),
            }),
            None => {
                self.restore(mark);
                None
            }
        }
    }

    /// `\where!{ pattern => target … }`.
    fn parse_rewrite_rules(&mut self) -> Option<RewriteRules> {
        if self.peek()?.text != WHERE_KEYWORD {
            return None;
        }
        let mark = self.save();
        let keyword = self.bump()?;
        let Some(Block {
            open,
            children,
            close: Some(close),
        }) = self.parse_block(Some(EnclosureKind::Brace), true)
        else {
            self.restore(mark);
            return None;
        };

        let significant: Vec<&Node> = children.iter().filter(|n| !n.is_whitespace()).collect();
        let rules = arrow_triples(&significant)
            .into_iter()
            .map(|(pattern, arrow, target)| RewriteRule {
                pattern: pattern.clone(),
                arrow: arrow.clone(),
                target: target.clone(),
            })
            .collect();

        Some(RewriteRules {
            keyword,
            open,
            rules,
            close,
        })
    }

    // =========================================================================
    // Macro definitions
    // =========================================================================

    /// `\macroRules![\name]{ [binders…] => {target} … }`.
    fn parse_macro_rules(&mut self) -> Option<MacroRules> {
        if self.peek()?.text != MACRO_RULES_KEYWORD {
            return None;
        }
        let mark = self.save();
        let keyword = self.bump()?;

        let Some(header) = self.parse_block(Some(EnclosureKind::Bracket), true) else {
            self.restore(mark);
            return None;
        };
        let Some(ident) = header
            .single_child()
            .and_then(Node::as_command)
            .map(|cmd| cmd.ident.clone())
        else {
            self.restore(mark);
            return None;
        };
        let Some(body) = self.parse_block(Some(EnclosureKind::Brace), true) else {
            self.restore(mark);
            return None;
        };
        let (Some(header_close), Some(body_close)) = (header.close, body.close.clone()) else {
            self.restore(mark);
            return None;
        };

        let significant = body.significant_children();
        let rules = arrow_triples(&significant)
            .into_iter()
            .filter_map(|(pattern, arrow, target)| macro_rule(pattern, arrow, target))
            .collect();

        Some(MacroRules {
            keyword,
            header_open: header.open,
            ident,
            header_close,
            body_open: body.open,
            rules,
            body_close,
        })
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consume and return the current token.
    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    fn save(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

/// `(left, "=>", right)` triples over whitespace-filtered children.
fn arrow_triples<'n>(children: &[&'n Node]) -> Vec<(&'n Node, &'n Token, &'n Node)> {
    children
        .windows(3)
        .filter_map(|window| {
            let arrow = window[1].as_text_matching(ARROW)?;
            Some((window[0], arrow, window[2]))
        })
        .collect()
}

/// A macro rule needs a `[…]` pattern and a `{…}` target.
fn macro_rule(pattern: &Node, arrow: &Token, target: &Node) -> Option<MacroRule> {
    let pattern = pattern.as_block_of(EnclosureKind::Bracket)?;
    let target = target.as_block_of(EnclosureKind::Brace)?;
    let binders = pattern
        .significant_children()
        .into_iter()
        .filter_map(binder)
        .collect();
    Some(MacroRule {
        pattern_open: pattern.open.clone(),
        binders,
        pattern_close: pattern.close.clone()?,
        arrow: arrow.clone(),
        target: target.clone(),
    })
}

/// `{$x}`, `($x)` or `[$x]`.
fn binder(node: &Node) -> Option<Binder> {
    let block = node.as_block().filter(|block| block.kind().is_some())?;
    let var = block.single_token_child().filter(|t| t.is_macro_var())?;
    Some(Binder {
        open: block.open.clone(),
        var: var.clone(),
        close: block.close.clone()?,
    })
}

/// Join consecutive tokens into one covering their whole span.
fn merge_tokens(tokens: Vec<Token>) -> Option<Token> {
    let mut iter = tokens.into_iter();
    let mut merged = iter.next()?;
    for token in iter {
        merged.text.push_str(&token.text);
        merged.span = merged.span.to(token.span);
    }
    Some(merged)
}
