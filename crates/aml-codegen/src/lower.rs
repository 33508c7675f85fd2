//! Lowering from the normalized syntax tree to Core IR.
//!
//! Command identifiers are resolved through a fixed registry. Anything the
//! registry does not know is reported and skipped; a known command with the
//! wrong argument shape is reported and skipped too. Lowering itself never
//! fails.

use std::sync::OnceLock;

use aml_lexer::EnclosureKind;
use aml_parser::{Block, Command, MacroRules, MacroTable, Node, Scope};
use fxhash::FxHashMap;

use crate::diagnostics::Diagnostic;
use crate::ir::{self, Attributes, Element};
use crate::latex;

/// Extension point for macro invocation.
///
/// Receives the invocation and every recorded definition of its name, oldest
/// first, and returns the replacement nodes. The replacement is lowered in the
/// scope of the invocation.
pub trait MacroExpander {
    fn expand(&self, cmd: &Command, definitions: &[MacroRules], scope: Scope<'_>) -> Option<Vec<Node>>;
}

/// Expands nothing. Every macro invocation is reported as unexpanded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inert;

impl MacroExpander for Inert {
    fn expand(&self, _cmd: &Command, _definitions: &[MacroRules], _scope: Scope<'_>) -> Option<Vec<Node>> {
        None
    }
}

// =========================================================================
// Registry
// =========================================================================

/// How a registered identifier is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// `\h1`..`\h6`: one `{…}` argument.
    Heading,
    /// `\{…}`: the body becomes inline LaTeX.
    InlineMath,
    /// `\math{…}`: the body becomes a LaTeX equation.
    BlockMath,
    /// `\note{…}`.
    Note,
    /// `\grid[Ncol]{…}`.
    Grid,
    /// `\tag{…}` or `\tag[attrs]{…}`.
    Html,
    /// `\br`, `\hr`, `\img`: optional `[attrs]` and no body.
    VoidHtml,
}

impl Rule {
    fn expected(self) -> &'static str {
        match self {
            Rule::Heading | Rule::InlineMath | Rule::BlockMath | Rule::Note => {
                "one {…} argument"
            }
            Rule::Grid | Rule::Html => "an optional […] argument followed by one {…} argument",
            Rule::VoidHtml => "no arguments or one […] argument",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    rule: Rule,
    tag: &'static str,
}

const HTML_TAGS: [&str; 35] = [
    "blockquote", "dd", "dl", "dt", "figcaption", "figure", "hr", "li", "ol", "p", "pre", "ul", "a",
    "b", "br", "cite", "code", "em", "i", "mark", "q", "s", "small", "strong", "sub", "sup", "time",
    "u", "img", "table", "tbody", "td", "tfoot", "th", "tr",
];

fn registry() -> &'static FxHashMap<String, Entry> {
    static REGISTRY: OnceLock<FxHashMap<String, Entry>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = FxHashMap::default();
        for tag in HTML_TAGS {
            let rule = if ir::is_void_tag(tag) {
                Rule::VoidHtml
            } else {
                Rule::Html
            };
            map.insert(format!("\\{tag}"), Entry { rule, tag });
        }
        for tag in ir::HEADINGS {
            map.insert(
                format!("\\{tag}"),
                Entry {
                    rule: Rule::Heading,
                    tag,
                },
            );
        }
        // Structural commands take precedence over HTML tags of the same name.
        let structural = [
            ("\\", Rule::InlineMath, ir::INLINE_MATH),
            ("\\math", Rule::BlockMath, ir::BLOCK_MATH),
            ("\\note", Rule::Note, ir::NOTE),
            ("\\grid", Rule::Grid, ir::GRID),
        ];
        for (ident, rule, tag) in structural {
            map.insert(ident.to_string(), Entry { rule, tag });
        }
        map
    })
}

/// Whether `ident` (escape included) names a built-in command.
pub fn is_supported(ident: &str) -> bool {
    registry().contains_key(ident)
}

// =========================================================================
// Argument shapes
// =========================================================================

/// A command's arguments split into an optional `[…]` attribute string and
/// an optional `{…}` body.
struct Arguments<'c> {
    attributes: Option<String>,
    body: Option<&'c Block>,
}

impl<'c> Arguments<'c> {
    fn of(cmd: &'c Command) -> Option<Self> {
        match cmd.arguments.as_slice() {
            [] => Some(Arguments {
                attributes: None,
                body: None,
            }),
            [only] => match only.as_block_of(EnclosureKind::Brace) {
                Some(body) => Some(Arguments {
                    attributes: None,
                    body: Some(body),
                }),
                None => Some(Arguments {
                    attributes: Some(only.attribute_text()?),
                    body: None,
                }),
            },
            [attributes, body] => Some(Arguments {
                attributes: Some(attributes.attribute_text()?),
                body: Some(body.as_block_of(EnclosureKind::Brace)?),
            }),
            _ => None,
        }
    }

    /// Exactly one `{…}` argument.
    fn body_only(&self) -> Option<&'c Block> {
        match self.attributes {
            None => self.body,
            Some(_) => None,
        }
    }
}

// =========================================================================
// Lowerer
// =========================================================================

/// Lowers one document, collecting diagnostics as it goes.
pub struct Lowerer<'m> {
    macros: &'m MacroTable,
    expander: &'m dyn MacroExpander,
    diagnostics: Vec<Diagnostic>,
}

impl<'m> Lowerer<'m> {
    pub fn new(macros: &'m MacroTable) -> Self {
        Self::with_expander(macros, &Inert)
    }

    pub fn with_expander(macros: &'m MacroTable, expander: &'m dyn MacroExpander) -> Self {
        Self {
            macros,
            expander,
            diagnostics: Vec::new(),
        }
    }

    /// Lower every top-level node from the root scope.
    pub fn lower_document(&mut self, nodes: &[Node]) -> Vec<ir::Node> {
        let root = Scope::root();
        let lowered: Vec<_> = nodes.iter().filter_map(|node| self.lower(node, root)).collect();
        log::debug!(
            "lowered {} top-level node(s), {} diagnostic(s)",
            lowered.len(),
            self.diagnostics.len()
        );
        lowered
    }

    pub fn lower(&mut self, node: &Node, scope: Scope<'_>) -> Option<ir::Node> {
        match node {
            Node::Text(token) | Node::Error(token) => Some(ir::Node::Text(token.text.clone())),
            Node::String(string) => Some(ir::Node::Text(string.text())),
            Node::Block(block) => Some(ir::Node::Fragment(self.lower_children(block, scope))),
            Node::Command(cmd) => self.lower_command(cmd, scope),
            Node::MacroRules(_) => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn lower_children(&mut self, block: &Block, scope: Scope<'_>) -> Vec<ir::Node> {
        block
            .children
            .iter()
            .filter_map(|child| self.lower(child, scope))
            .collect()
    }

    fn lower_command(&mut self, cmd: &Command, scope: Scope<'_>) -> Option<ir::Node> {
        let Some(entry) = registry().get(cmd.name()).copied() else {
            return self.lower_unknown(cmd, scope);
        };

        let lowered = Arguments::of(cmd).and_then(|args| self.apply(entry, cmd, &args, scope));
        if lowered.is_none() {
            self.diagnostics.push(Diagnostic::InvalidArguments {
                name: cmd.name().to_string(),
                expected: entry.rule.expected(),
                span: cmd.span(),
            });
        }
        lowered
    }

    fn apply(&mut self, entry: Entry, cmd: &Command, args: &Arguments<'_>, scope: Scope<'_>) -> Option<ir::Node> {
        let inner = scope.push(cmd.name());
        let element = match entry.rule {
            Rule::Heading | Rule::Note => {
                let body = args.body_only()?;
                Element::new(entry.tag).with_children(self.lower_children(body, inner))
            }
            Rule::InlineMath => {
                let body = args.body_only()?;
                Element::new(entry.tag)
                    .with_children(vec![ir::Node::Text(latex::to_latex_inline(&body.children))])
            }
            Rule::BlockMath => {
                let body = args.body_only()?;
                Element::new(entry.tag)
                    .with_children(vec![ir::Node::Text(latex::to_latex_equation(&body.children))])
            }
            Rule::Grid => {
                let body = args.body?;
                let mut element = Element::new(entry.tag)
                    .with_attributes(grid_attributes(args.attributes.as_deref().unwrap_or_default()))
                    .with_children(self.lower_children(body, inner));
                if scope.is_descendant_of("\\grid") {
                    element = element.with_attribute("sub-grid", None);
                }
                element
            }
            Rule::Html | Rule::VoidHtml => {
                // Void tags take no body; every other tag needs one.
                if args.body.is_some() == (entry.rule == Rule::VoidHtml) {
                    return None;
                }
                let attributes = args
                    .attributes
                    .as_deref()
                    .map(Attributes::parse)
                    .unwrap_or_default();
                let children = match args.body {
                    Some(body) => self.lower_children(body, inner),
                    None => Vec::new(),
                };
                Element::new(entry.tag)
                    .with_attributes(attributes)
                    .with_children(children)
            }
        };
        Some(ir::Node::Element(element))
    }

    fn lower_unknown(&mut self, cmd: &Command, scope: Scope<'_>) -> Option<ir::Node> {
        let name = cmd.name().to_string();
        if !self.macros.contains(&name) {
            log::trace!("unsupported command {name}");
            self.diagnostics.push(Diagnostic::UnsupportedCommand {
                name,
                span: cmd.span(),
            });
            return None;
        }

        match self.expander.expand(cmd, self.macros.get(&name), scope) {
            Some(replacement) => Some(ir::Node::Fragment(
                replacement
                    .iter()
                    .filter_map(|node| self.lower(node, scope))
                    .collect(),
            )),
            None => {
                self.diagnostics.push(Diagnostic::UnexpandedMacro {
                    name,
                    span: cmd.span(),
                });
                None
            }
        }
    }
}

/// Column count for `\grid[…]`. Whitespace is ignored; unknown values set
/// nothing.
fn grid_attributes(text: &str) -> Attributes {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut attributes = Attributes::new();
    let col = match compact.as_str() {
        "1col" => Some("1"),
        "2col" | "3col" | "4col" => Some("2"),
        _ => None,
    };
    if let Some(col) = col {
        attributes.set("col", Some(col));
    }
    attributes
}
