//! HTML code generator.
//!
//! Renders Core IR bottom-up. While rendering, assigns ids (`aml-math-N`) to
//! math elements and content-derived ids to headings, and records both in the
//! `RenderState` for document packaging.

use crate::ir::{self, Attributes, Element};

/// What rendering has collected so far.
#[derive(Debug, Default)]
pub struct RenderState {
    next_id: usize,
    pub inline_math_ids: Vec<String>,
    pub block_math_ids: Vec<String>,
    /// Rendered headings in document order, each with its `id` set.
    pub headings: Vec<Element>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign_id(&mut self) -> String {
        let id = format!("aml-math-{}", self.next_id);
        self.next_id += 1;
        id
    }
}

/// Render a node. Fragments put each child on its own line; element children
/// are written back to back.
pub fn to_html(node: &ir::Node, state: &mut RenderState) -> String {
    match node {
        ir::Node::Text(text) => escape_text(text),
        ir::Node::Element(element) => render_element(element, state),
        ir::Node::Fragment(children) => children
            .iter()
            .map(|child| to_html(child, state))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_element(element: &Element, state: &mut RenderState) -> String {
    let tag = element.tag.as_str();
    let mut attributes = Attributes::new();

    let name = match tag {
        ir::INLINE_MATH => {
            let id = state.assign_id();
            attributes.set("id", Some(id.as_str()));
            attributes.set("math", Some("inline"));
            state.inline_math_ids.push(id);
            "span"
        }
        ir::BLOCK_MATH => {
            let id = state.assign_id();
            attributes.set("id", Some(id.as_str()));
            attributes.set("math", Some("block"));
            state.block_math_ids.push(id);
            "div"
        }
        ir::GRID => {
            attributes.set("grid", None);
            "div"
        }
        ir::NOTE => {
            attributes.set("note", None);
            "div"
        }
        _ => tag,
    };
    for attr in &element.attributes {
        attributes.set(&attr.name, attr.value.as_deref());
    }

    // Void elements are written without their children.
    if ir::is_void_tag(name) {
        return format!("<{name}{}>", render_attributes(&attributes));
    }

    let children: String = element
        .children
        .iter()
        .map(|child| to_html(child, state))
        .collect();

    // Heading ids depend on the rendered content, so they are only known
    // once the children are done.
    if ir::is_heading(tag) {
        let id = heading_id(&children);
        let mut with_id = Attributes::new();
        with_id.set("id", Some(id.as_str()));
        for attr in &attributes {
            with_id.set(&attr.name, attr.value.as_deref());
        }
        attributes = with_id;
        state
            .headings
            .push(element.clone().with_attribute("id", Some(id.as_str())));
    }

    format!("<{name}{}>{children}</{name}>", render_attributes(&attributes))
}

/// `UID` followed by a hash of the rendered heading content.
pub fn heading_id(rendered_children: &str) -> String {
    format!("UID{}", fxhash::hash64(rendered_children))
}

fn render_attributes(attributes: &Attributes) -> String {
    let mut out = String::new();
    for attr in attributes {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push_str(&format!("=\"{}\"", escape_attribute(value)));
        }
    }
    out
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
