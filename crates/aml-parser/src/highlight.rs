//! Highlight extraction for editors.
//!
//! Walks the raw (unnormalized) tree and records where commands, macro
//! definitions and strings sit in the source. Spans never own text; a caller
//! slices its own buffer. Commands remember how many commands enclose them,
//! which picks their colour.

use crate::cst::{
    Argument, Block, Command, MacroRule, MacroRules, Node, RewriteRules, ScriptOp, StringLiteral,
};
use crate::scope::Scope;
use crate::visit::{self, Visit};
use aml_lexer::Span;

/// One highlighted construct, in pre-order source order.
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightSpan {
    Command(CommandSpan),
    MacroRules(MacroRulesSpan),
    String(StringSpan),
}

/// Colour bucket for a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    String,
    /// Index into the caller's expression palette.
    Expr(usize),
}

impl HighlightSpan {
    /// Source range covered by the whole construct.
    pub fn span(&self) -> Span {
        match self {
            HighlightSpan::Command(cmd) => cmd.span,
            HighlightSpan::MacroRules(rules) => rules.keyword.to(rules.body_close),
            HighlightSpan::String(string) => string.span(),
        }
    }

    /// Scope depth for commands; definitions and strings sit at zero.
    pub fn depth(&self) -> usize {
        match self {
            HighlightSpan::Command(cmd) => cmd.depth,
            _ => 0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HighlightSpan::Command(_) => "command",
            HighlightSpan::MacroRules(_) => "macro-rules",
            HighlightSpan::String(_) => "string",
        }
    }

    pub fn color(&self, palette_len: usize) -> Color {
        match self {
            HighlightSpan::String(_) => Color::String,
            HighlightSpan::MacroRules(_) => Color::Expr(0),
            HighlightSpan::Command(cmd) => {
                Color::Expr(cmd.depth.checked_rem(palette_len).unwrap_or(0))
            }
        }
    }

    /// Identifier ranges carried by this span: the command name plus any
    /// command used directly as a script operand, or the macro name.
    pub fn identifier_spans(&self) -> Vec<Span> {
        match self {
            HighlightSpan::Command(cmd) => cmd.identifier_spans(),
            HighlightSpan::MacroRules(rules) => vec![rules.ident],
            HighlightSpan::String(_) => Vec::new(),
        }
    }
}

/// An open token and, if present, its close token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnclosureSpan {
    pub open: Span,
    pub close: Option<Span>,
}

impl EnclosureSpan {
    fn of(block: &Block) -> Self {
        Self {
            open: block.open.span,
            close: block.close.as_ref().map(|close| close.span),
        }
    }

    /// The open token alone when unterminated.
    pub fn range(&self) -> Span {
        match self.close {
            Some(close) => self.open.to(close),
            None => self.open,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpan {
    pub ident: Span,
    pub arguments: Vec<ArgumentSpan>,
    pub rewrite_rules: Option<RewriteRulesSpan>,
    pub depth: usize,
    pub span: Span,
}

impl CommandSpan {
    fn of(cmd: &Command, depth: usize) -> Self {
        Self {
            ident: cmd.ident.span,
            arguments: cmd
                .arguments
                .iter()
                .map(|argument| match argument {
                    Argument::Block(block) => ArgumentSpan::Block(EnclosureSpan::of(block)),
                    Argument::Script(script) => ArgumentSpan::Script(ScriptSpan::of(script, depth)),
                })
                .collect(),
            rewrite_rules: cmd.rewrite_rules.as_ref().map(RewriteRulesSpan::of),
            depth,
            span: cmd.span(),
        }
    }

    fn identifier_spans(&self) -> Vec<Span> {
        let mut spans = vec![self.ident];
        for argument in &self.arguments {
            if let ArgumentSpan::Script(ScriptSpan {
                operand: OperandSpan::Command(cmd),
                ..
            }) = argument
            {
                spans.extend(cmd.identifier_spans());
            }
        }
        spans
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentSpan {
    Block(EnclosureSpan),
    Script(ScriptSpan),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSpan {
    pub op: Span,
    pub operand: OperandSpan,
}

impl ScriptSpan {
    fn of(script: &ScriptOp, depth: usize) -> Self {
        let operand = match script.operand.as_ref() {
            Node::Command(cmd) => OperandSpan::Command(Box::new(CommandSpan::of(cmd, depth))),
            Node::Block(block) => OperandSpan::Block(EnclosureSpan::of(block)),
            other => OperandSpan::Token(other.span()),
        };
        Self {
            op: script.op.span,
            operand,
        }
    }
}

/// What follows a `^` or `_`. Operands are described, never descended into.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandSpan {
    Token(Span),
    Command(Box<CommandSpan>),
    Block(EnclosureSpan),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRulesSpan {
    pub keyword: Span,
    pub open: Span,
    pub rules: Vec<RewriteRuleSpan>,
    pub close: Span,
}

impl RewriteRulesSpan {
    fn of(rules: &RewriteRules) -> Self {
        Self {
            keyword: rules.keyword.span,
            open: rules.open.span,
            rules: rules
                .rules
                .iter()
                .filter_map(|rule| {
                    Some(RewriteRuleSpan {
                        pattern: EnclosureSpan::of(rule.pattern.as_block()?),
                        arrow: rule.arrow.span,
                        target: EnclosureSpan::of(rule.target.as_block()?),
                    })
                })
                .collect(),
            close: rules.close.span,
        }
    }
}

/// Rules whose pattern or target is not a block are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRuleSpan {
    pub pattern: EnclosureSpan,
    pub arrow: Span,
    pub target: EnclosureSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroRulesSpan {
    pub keyword: Span,
    pub header_open: Span,
    pub ident: Span,
    pub header_close: Span,
    pub body_open: Span,
    pub rules: Vec<MacroRuleSpan>,
    pub body_close: Span,
}

impl MacroRulesSpan {
    fn of(rules: &MacroRules) -> Self {
        Self {
            keyword: rules.keyword.span,
            header_open: rules.header_open.span,
            ident: rules.ident.span,
            header_close: rules.header_close.span,
            body_open: rules.body_open.span,
            rules: rules.rules.iter().map(MacroRuleSpan::of).collect(),
            body_close: rules.body_close.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroRuleSpan {
    pub pattern_open: Span,
    pub binders: Vec<BinderSpan>,
    pub pattern_close: Span,
    pub arrow: Span,
    pub target: EnclosureSpan,
}

impl MacroRuleSpan {
    fn of(rule: &MacroRule) -> Self {
        Self {
            pattern_open: rule.pattern_open.span,
            binders: rule
                .binders
                .iter()
                .map(|binder| BinderSpan {
                    open: binder.open.span,
                    var: binder.var.span,
                    close: binder.close.span,
                })
                .collect(),
            pattern_close: rule.pattern_close.span,
            arrow: rule.arrow.span,
            target: EnclosureSpan::of(&rule.target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderSpan {
    pub open: Span,
    pub var: Span,
    pub close: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringSpan {
    pub open: Span,
    pub value: Option<Span>,
    pub close: Option<Span>,
}

impl StringSpan {
    fn of(string: &StringLiteral) -> Self {
        Self {
            open: string.open.span,
            value: string.value.as_ref().map(|value| value.span),
            close: string.close.as_ref().map(|close| close.span),
        }
    }

    pub fn span(&self) -> Span {
        match (self.value, self.close) {
            (_, Some(close)) => self.open.to(close),
            (Some(value), None) => self.open.to(value),
            (None, None) => self.open,
        }
    }
}

/// Collect highlight spans for a raw parsed document.
pub fn extract_highlights(nodes: &[Node]) -> Vec<HighlightSpan> {
    let mut highlighter = Highlighter::default();
    visit::visit_document(&mut highlighter, nodes);
    log::debug!("extracted {} highlight span(s)", highlighter.spans.len());
    highlighter.spans
}

#[derive(Default)]
struct Highlighter {
    spans: Vec<HighlightSpan>,
}

impl<'ast> Visit<'ast> for Highlighter {
    fn visit_string(&mut self, string: &'ast StringLiteral, _scope: Scope<'_>) {
        self.spans.push(HighlightSpan::String(StringSpan::of(string)));
    }

    fn visit_command(&mut self, cmd: &'ast Command, scope: Scope<'_>) {
        self.spans
            .push(HighlightSpan::Command(CommandSpan::of(cmd, scope.depth())));
        visit::walk_command(self, cmd, scope);
    }

    // Operands and rewrite rules are already described by the command span.
    fn visit_script(&mut self, _script: &'ast ScriptOp, _scope: Scope<'_>) {}

    fn visit_rewrite_rules(&mut self, _rules: &'ast RewriteRules, _scope: Scope<'_>) {}

    fn visit_macro_rules(&mut self, rules: &'ast MacroRules, scope: Scope<'_>) {
        self.spans
            .push(HighlightSpan::MacroRules(MacroRulesSpan::of(rules)));
        visit::walk_macro_rules(self, rules, scope);
    }
}
