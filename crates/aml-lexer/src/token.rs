/// A half-open `[start, end)` byte range in source text, plus the line and
/// column of `start` for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Span covering `self` through the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            end: other.end,
            ..self
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// The three enclosure pairs: `{}`, `()` and `[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnclosureKind {
    Brace,
    Paren,
    Bracket,
}

impl EnclosureKind {
    pub fn open(self) -> &'static str {
        match self {
            EnclosureKind::Brace => "{",
            EnclosureKind::Paren => "(",
            EnclosureKind::Bracket => "[",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            EnclosureKind::Brace => "}",
            EnclosureKind::Paren => ")",
            EnclosureKind::Bracket => "]",
        }
    }
}

/// Keyword introducing a macro definition.
pub const MACRO_RULES_KEYWORD: &str = "\\macroRules!";

/// Keyword introducing a rewrite-rules clause after a command.
pub const WHERE_KEYWORD: &str = "\\where!";

/// A token produced by the AML lexer.
///
/// Tokens never own more than their source text; everything else is derived
/// from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// Command identifiers start with the escape character.
    pub fn is_identifier(&self) -> bool {
        self.text.starts_with('\\')
    }

    /// Macro variables (`$x`) appear in macro binder patterns.
    pub fn is_macro_var(&self) -> bool {
        self.text.starts_with('$')
    }

    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    pub fn contains_newline(&self) -> bool {
        self.text.contains(['\n', '\r'])
    }

    /// Superscript/subscript markers.
    pub fn is_prefix_op(&self) -> bool {
        matches!(self.text.as_str(), "^" | "_")
    }

    pub fn open_kind(&self) -> Option<EnclosureKind> {
        match self.text.as_str() {
            "{" => Some(EnclosureKind::Brace),
            "(" => Some(EnclosureKind::Paren),
            "[" => Some(EnclosureKind::Bracket),
            _ => None,
        }
    }

    pub fn close_kind(&self) -> Option<EnclosureKind> {
        match self.text.as_str() {
            "}" => Some(EnclosureKind::Brace),
            ")" => Some(EnclosureKind::Paren),
            "]" => Some(EnclosureKind::Bracket),
            _ => None,
        }
    }

    pub fn is_open_enclosure(&self) -> bool {
        self.open_kind().is_some()
    }

    pub fn is_close_enclosure(&self) -> bool {
        self.close_kind().is_some()
    }

    /// Whether `close` terminates an enclosure opened by `self`.
    pub fn matches_close(&self, close: &Token) -> bool {
        self.open_kind()
            .is_some_and(|kind| close.close_kind() == Some(kind))
    }
}
