//! Core IR: the small element tree the HTML emitter renders.
//!
//! Tags are stored without the leading escape character (`p`, not `\p`).
//! Besides plain HTML tags the tree uses four structural tags: `inline-math`,
//! `math`, `grid` and `note`.

/// Tag for inline math produced by `\{…}`.
pub const INLINE_MATH: &str = "inline-math";
/// Tag for display math produced by `\math{…}`.
pub const BLOCK_MATH: &str = "math";
pub const GRID: &str = "grid";
pub const NOTE: &str = "note";

/// Heading tags, outermost level first.
pub const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Tags rendered without a close tag.
pub fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img")
}

pub fn is_heading(tag: &str) -> bool {
    HEADINGS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn with_attribute(mut self, name: &str, value: Option<&str>) -> Self {
        self.attributes.set(name, value);
        self
    }
}

/// A single `name` or `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// Element attributes in insertion order. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: Option<&str>) {
        let value = value.map(str::to_string);
        match self.entries.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.entries.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.iter().find(|attr| attr.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a flattened `[…]` argument: whitespace-separated entries of the
    /// form `name="value"`, `name=value` or bare `name`. Quoted values may
    /// contain whitespace and are taken verbatim.
    pub fn parse(source: &str) -> Self {
        let mut attributes = Attributes::new();
        let mut chars = source.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            let mut name = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=') {
                name.push(c);
            }
            if name.is_empty() {
                // A stray `=` has no name to attach to.
                if chars.next().is_none() {
                    break;
                }
                continue;
            }

            if chars.next_if_eq(&'=').is_none() {
                attributes.set(&name, None);
                continue;
            }

            let mut value = String::new();
            match chars.peek().copied() {
                Some(quote @ ('"' | '“')) => {
                    chars.next();
                    let close = if quote == '“' { '”' } else { '"' };
                    for c in chars.by_ref() {
                        if c == close {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                        value.push(c);
                    }
                }
            }
            attributes.set(&name, Some(&value));
        }

        attributes
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(attributes: &Attributes) -> Vec<(&str, Option<&str>)> {
        attributes
            .iter()
            .map(|attr| (attr.name.as_str(), attr.value.as_deref()))
            .collect()
    }

    #[test]
    fn test_set_keeps_position() {
        let mut attributes = Attributes::new();
        attributes.set("id", Some("<UID>"));
        attributes.set("math", Some("block"));
        attributes.set("id", Some("aml-math-0"));
        assert_eq!(
            pairs(&attributes),
            vec![("id", Some("aml-math-0")), ("math", Some("block"))]
        );
    }

    #[test]
    fn test_parse_forms() {
        let attributes = Attributes::parse("src=\"a b.png\" width=20 hidden");
        assert_eq!(
            pairs(&attributes),
            vec![
                ("src", Some("a b.png")),
                ("width", Some("20")),
                ("hidden", None)
            ]
        );
    }

    #[test]
    fn test_parse_smart_quotes_and_stray_equals() {
        let attributes = Attributes::parse(" = alt=“x y”  ");
        assert_eq!(pairs(&attributes), vec![("alt", Some("x y"))]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(Attributes::parse("   ").is_empty());
    }

    #[test]
    fn test_tag_predicates() {
        assert!(is_void_tag("img"));
        assert!(!is_void_tag("p"));
        assert!(is_heading("h3"));
        assert!(!is_heading("h7"));
    }
}
