use crate::token::{Span, Token};

/// Character classes, in the priority order the scanner checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// `\`, which always starts a new token.
    Escape,
    /// Letters, digits and `! \ , ; . $`.
    Word,
    /// Spaces, tabs and newlines.
    Whitespace,
    /// `=`, `<` and `>`, so that `=>` and `<=` stay together.
    Relational,
    /// Everything else is a single-character token.
    Symbol,
}

impl CharClass {
    pub fn of(c: char) -> CharClass {
        if c == '\\' {
            CharClass::Escape
        } else if CharClass::Word.admits(c) {
            CharClass::Word
        } else if CharClass::Whitespace.admits(c) {
            CharClass::Whitespace
        } else if CharClass::Relational.admits(c) {
            CharClass::Relational
        } else {
            CharClass::Symbol
        }
    }

    /// Whether `c` may appear in a token of this class.
    pub fn admits(self, c: char) -> bool {
        match self {
            CharClass::Escape => c == '\\',
            CharClass::Word => {
                c.is_alphanumeric() || matches!(c, '!' | '\\' | ',' | ';' | '.' | '$')
            }
            CharClass::Whitespace => c.is_whitespace(),
            CharClass::Relational => matches!(c, '=' | '<' | '>'),
            CharClass::Symbol => false,
        }
    }

    /// Classes whose characters may be merged into a longer token.
    fn merges(self) -> bool {
        matches!(
            self,
            CharClass::Word | CharClass::Whitespace | CharClass::Relational
        )
    }
}

/// AML source scanner.
///
/// A single left-to-right pass that never fails: every character lands in
/// exactly one token and concatenating the token texts gives back the source.
///
/// A character extends the previous token when that token consists entirely
/// of characters of the new character's class; `\` always starts a new token,
/// which is what turns `\h1` into an identifier and `a\b` into two tokens.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens();
        log::trace!(
            "tokenized {} bytes into {} tokens",
            source.len(),
            scanner.tokens.len()
        );
        scanner.tokens
    }

    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            self.scan_token();
        }
    }

    fn scan_token(&mut self) {
        let (offset, ch) = self.chars[self.pos];
        let class = CharClass::of(ch);
        let end = offset + ch.len_utf8();

        if self.extends_last(class, ch) {
            if let Some(last) = self.tokens.last_mut() {
                last.text.push(ch);
                last.span.end = end;
            }
        } else {
            let span = Span::new(offset, end, self.line, self.column);
            self.tokens.push(Token::new(&self.source[offset..end], span));
        }

        self.advance(ch);
    }

    /// Merging rule: same class all the way through, and never across `\`.
    fn extends_last(&self, class: CharClass, ch: char) -> bool {
        if !class.merges() {
            return false;
        }
        self.tokens
            .last()
            .is_some_and(|last| last.text.chars().all(|c| class.admits(c)) && class.admits(ch))
    }

    // --- Helpers ---

    fn advance(&mut self, ch: char) {
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}
