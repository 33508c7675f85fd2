//! Concrete syntax tree for AML.
//!
//! Every node keeps the tokens it was built from, so source spans survive
//! every pass. Error shapes are ordinary nodes: an unterminated block or
//! string simply has no close token.

use aml_lexer::{EnclosureKind, Span, Token};

/// A node in the concrete syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Any token that does not start another production.
    Text(Token),

    /// `"…"` or `“…”`.
    String(StringLiteral),

    /// A close-enclosure token with nothing to close, or an opener or
    /// identifier past the nesting limit.
    Error(Token),

    /// `\ident` with its arguments.
    Command(Command),

    /// `{…}`, `[…]` or `(…)`, possibly unterminated.
    Block(Block),

    /// `\macroRules![\name]{ [binders] => {target} … }`.
    MacroRules(MacroRules),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Text(token) | Node::Error(token) => token.span,
            Node::String(string) => string.span(),
            Node::Command(cmd) => cmd.span(),
            Node::Block(block) => block.span(),
            Node::MacroRules(rules) => rules.span(),
        }
    }

    /// Whitespace-only text.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(token) if token.is_whitespace())
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Node::Text(token) => Some(token),
            _ => None,
        }
    }

    /// The text token if it reads exactly `text`.
    pub fn as_text_matching(&self, text: &str) -> Option<&Token> {
        self.as_token().filter(|token| token.text == text)
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    /// The block if it is well-formed and of the given kind.
    pub fn as_block_of(&self, kind: EnclosureKind) -> Option<&Block> {
        self.as_block().filter(|block| block.is_kind(kind))
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Node::Command(cmd) => Some(cmd),
            _ => None,
        }
    }

    /// Literal source text of leaf nodes.
    pub fn leaf_text(&self) -> Option<String> {
        match self {
            Node::Text(token) | Node::Error(token) => Some(token.text.clone()),
            Node::String(string) => Some(string.text()),
            _ => None,
        }
    }
}

/// A quoted string. `close == None` marks an unterminated string.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub open: Token,
    pub value: Option<Token>,
    pub close: Option<Token>,
}

impl StringLiteral {
    pub fn span(&self) -> Span {
        match (&self.value, &self.close) {
            (_, Some(close)) => self.open.span.to(close.span),
            (Some(value), None) => self.open.span.to(value.span),
            (None, None) => self.open.span,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.close.is_some()
    }

    /// The string as written, quotes included.
    pub fn text(&self) -> String {
        let mut text = self.open.text.clone();
        if let Some(value) = &self.value {
            text.push_str(&value.text);
        }
        if let Some(close) = &self.close {
            text.push_str(&close.text);
        }
        text
    }
}

/// An enclosure and its contents. Well-formed iff `close` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub open: Token,
    pub children: Vec<Node>,
    pub close: Option<Token>,
}

impl Block {
    pub fn span(&self) -> Span {
        if let Some(close) = &self.close {
            return self.open.span.to(close.span);
        }
        match self.children.last() {
            Some(last) => self.open.span.to(last.span()),
            None => self.open.span,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.close.is_some()
    }

    /// `None` for unterminated blocks.
    pub fn kind(&self) -> Option<EnclosureKind> {
        let close = self.close.as_ref()?;
        if self.open.matches_close(close) {
            self.open.open_kind()
        } else {
            None
        }
    }

    pub fn is_kind(&self, kind: EnclosureKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Drop leading and trailing whitespace-only children.
    pub fn trim_whitespace(mut self) -> Block {
        let start = self
            .children
            .iter()
            .position(|child| !child.is_whitespace())
            .unwrap_or(self.children.len());
        let end = self
            .children
            .iter()
            .rposition(|child| !child.is_whitespace())
            .map_or(start, |ix| ix + 1);
        self.children.truncate(end);
        self.children.drain(..start);
        self
    }

    pub fn single_child(&self) -> Option<&Node> {
        match self.children.as_slice() {
            [child] => Some(child),
            _ => None,
        }
    }

    pub fn single_token_child(&self) -> Option<&Token> {
        self.single_child().and_then(Node::as_token)
    }

    /// Children with whitespace-only text filtered out.
    pub fn significant_children(&self) -> Vec<&Node> {
        self.children
            .iter()
            .filter(|child| !child.is_whitespace())
            .collect()
    }
}

/// A command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub ident: Token,
    pub arguments: Vec<Argument>,
    pub rewrite_rules: Option<RewriteRules>,
}

impl Command {
    /// The identifier, escape character included (`\p`).
    pub fn name(&self) -> &str {
        &self.ident.text
    }

    pub fn span(&self) -> Span {
        if let Some(rules) = &self.rewrite_rules {
            return self.ident.span.to(rules.close.span);
        }
        match self.arguments.last() {
            Some(last) => self.ident.span.to(last.span()),
            None => self.ident.span,
        }
    }
}

/// A command argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Block(Block),
    Script(ScriptOp),
}

impl Argument {
    pub fn span(&self) -> Span {
        match self {
            Argument::Block(block) => block.span(),
            Argument::Script(script) => script.span(),
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Argument::Block(block) => Some(block),
            Argument::Script(_) => None,
        }
    }

    pub fn as_block_of(&self, kind: EnclosureKind) -> Option<&Block> {
        self.as_block().filter(|block| block.is_kind(kind))
    }

    /// Flattened text of a `[…]` argument: its text and string children
    /// concatenated. Other children are skipped.
    pub fn attribute_text(&self) -> Option<String> {
        let block = self.as_block_of(EnclosureKind::Bracket)?;
        Some(
            block
                .children
                .iter()
                .filter_map(|child| match child {
                    Node::Text(token) => Some(token.text.clone()),
                    Node::String(string) => Some(string.text()),
                    _ => None,
                })
                .collect(),
        )
    }
}

/// `^operand` or `_operand`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOp {
    pub op: Token,
    pub operand: Box<Node>,
}

impl ScriptOp {
    pub fn span(&self) -> Span {
        self.op.span.to(self.operand.span())
    }
}

/// `\where!{ pattern => target … }` trailing a command.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRules {
    pub keyword: Token,
    pub open: Token,
    pub rules: Vec<RewriteRule>,
    pub close: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRule {
    pub pattern: Node,
    pub arrow: Token,
    pub target: Node,
}

/// A named set of pattern/template pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroRules {
    pub keyword: Token,
    pub header_open: Token,
    pub ident: Token,
    pub header_close: Token,
    pub body_open: Token,
    pub rules: Vec<MacroRule>,
    pub body_close: Token,
}

impl MacroRules {
    /// The macro's identity key.
    pub fn name(&self) -> &str {
        &self.ident.text
    }

    pub fn span(&self) -> Span {
        self.keyword.span.to(self.body_close.span)
    }
}

/// `[binders…] => {target}`.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroRule {
    pub pattern_open: Token,
    pub binders: Vec<Binder>,
    pub pattern_close: Token,
    pub arrow: Token,
    pub target: Block,
}

/// A single `$var` inside `{}`, `()` or `[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binder {
    pub open: Token,
    pub var: Token,
    pub close: Token,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(text: &str, start: usize) -> Token {
        Token::new(text, Span::new(start, start + text.len(), 1, start + 1))
    }

    fn text(text: &str, start: usize) -> Node {
        Node::Text(token(text, start))
    }

    #[test]
    fn test_trim_whitespace() {
        let block = Block {
            open: token("{", 0),
            children: vec![text(" ", 1), text("a", 2), text(" ", 3), text("b", 4), text("\n", 5)],
            close: Some(token("}", 6)),
        };
        let trimmed = block.trim_whitespace();
        let texts: Vec<_> = trimmed.children.iter().filter_map(Node::leaf_text).collect();
        assert_eq!(texts, vec!["a", " ", "b"]);
    }

    #[test]
    fn test_trim_whitespace_all_blank() {
        let block = Block {
            open: token("{", 0),
            children: vec![text("  ", 1)],
            close: Some(token("}", 3)),
        };
        assert!(block.trim_whitespace().children.is_empty());
    }

    #[test]
    fn test_unterminated_block_span() {
        let block = Block {
            open: token("{", 0),
            children: vec![text("abc", 1)],
            close: None,
        };
        assert_eq!(block.span().range(), 0..4);
        assert_eq!(block.kind(), None);
    }

    #[test]
    fn test_string_text_without_close() {
        let string = StringLiteral {
            open: token("\"", 0),
            value: Some(token("abc", 1)),
            close: None,
        };
        assert_eq!(string.text(), "\"abc");
        assert!(!string.is_terminated());
        assert_eq!(string.span().range(), 0..4);
    }
}
