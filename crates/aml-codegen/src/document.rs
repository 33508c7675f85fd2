//! Standalone HTML document packaging.
//!
//! Wraps a rendered body in a page that loads KaTeX and renders every math
//! element recorded during rendering once the page has loaded.

use crate::html::{escape_text, to_html, RenderState};
use crate::ir::{self, Element};
use crate::options::CompileOptions;

const HEAD_LINKS: &str = r#"<link rel="preconnect" href="https://fonts.googleapis.com">
<link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
<link href="https://fonts.googleapis.com/css2?family=Dancing+Script:wght@400;500;600;700&family=DynaPuff:wght@400;500;600;700&family=Playfair+Display:ital,wght@0,500;0,600;0,700;1,400;1,500;1,600;1,700&family=Yomogi&display=swap" rel="stylesheet">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.0/dist/katex.min.css" integrity="sha384-Xi8rHCmBmhbuyyhbI88391ZKP2dmfnOl4rT9ZfRI7mLTdk1wblIUnrIq35nqwEvC" crossorigin="anonymous">
<script src="https://cdn.jsdelivr.net/npm/katex@0.16.0/dist/katex.min.js" integrity="sha384-X/XCfMm41VSsqRNQgDerQczD69XqmjOOOwYQvr/uuC+j4OPoNhVgjdGFwhvN02Ja" crossorigin="anonymous"></script>
<script src="https://cdn.jsdelivr.net/npm/katex@0.16.0/dist/contrib/mhchem.min.js" integrity="sha384-RTN08a0AXIioPBcVosEqPUfKK+rPp+h1x/izR7xMkdMyuwkcZCWdxO+RSwIFtJXN" crossorigin="anonymous"></script>"#;

const BASE_STYLE: &str = r#"<style>
* {
    box-sizing: border-box;
}
body {
    margin: 0;
}
</style>
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta charset="utf-8"/>"#;

/// KaTeX reads each element's text and replaces it with rendered math.
const MATH_RUNTIME: &str = r#"    function renderBlockMath(ids) {
        for (const id of ids) {
            const element = document.getElementById(id);
            katex.render(element.textContent, element, {displayMode: true});
        }
    }
    function renderInlineMath(ids) {
        for (const id of ids) {
            const element = document.getElementById(id);
            katex.render(element.textContent, element, {displayMode: false});
        }
    }"#;

/// Build the table of contents from the headings recorded in `state`.
///
/// Entries re-render the heading content, so math inside a heading gets a
/// second id of its own.
pub fn table_of_contents(state: &mut RenderState, title: &str) -> String {
    let headings = state.headings.clone();
    let entries: Vec<String> = headings
        .iter()
        .map(|heading| {
            let id = heading
                .attributes
                .get("id")
                .and_then(|attr| attr.value.clone())
                .unwrap_or_default();
            let href = format!("#{id}");
            let link = Element::new("a")
                .with_attribute("href", Some(href.as_str()))
                .with_children(heading.children.clone());
            let entry = Element::new("li")
                .with_attribute("toc", None)
                .with_attribute("entry", Some(heading.tag.as_str()))
                .with_children(vec![ir::Node::Element(link)]);
            to_html(&ir::Node::Element(entry), state)
        })
        .collect();

    format!(
        "<div toc>\n<h1 toc-title>{}</h1>\n<ul toc-entries>{}</ul>\n</div>",
        escape_text(title),
        entries.join("\n")
    )
}

/// Wrap a rendered body into a complete HTML document.
pub fn package(body: &str, state: &mut RenderState, options: &CompileOptions) -> String {
    let toc = if options.toc {
        table_of_contents(state, &options.toc_title)
    } else {
        String::new()
    };

    let mut head = String::from(HEAD_LINKS);
    if let Some(stylesheet) = &options.stylesheet {
        head.push_str(&format!(
            "\n<link rel=\"stylesheet\" href=\"{}\">",
            crate::html::escape_attribute(stylesheet)
        ));
    }
    head.push('\n');
    head.push_str(BASE_STYLE);
    if let Some(title) = &options.title {
        head.push_str(&format!("\n<title>{}</title>", escape_text(title)));
    }

    let block_ids = quoted_list(&state.block_math_ids);
    let inline_ids = quoted_list(&state.inline_math_ids);
    log::debug!(
        "packaging document: {} heading(s), {} block and {} inline math element(s)",
        state.headings.len(),
        state.block_math_ids.len(),
        state.inline_math_ids.len()
    );

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n{head}\n</head>\n<body>\n{toc}\n{body}\n<script>\n{MATH_RUNTIME}\n    window.onload = function() {{\n        renderBlockMath([{block_ids}]);\n        renderInlineMath([{inline_ids}]);\n    }}\n</script>\n</body>\n</html>\n"
    )
}

/// `"a","b"` for use inside a JavaScript array literal.
fn quoted_list(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("{id:?}"))
        .collect::<Vec<_>>()
        .join(",")
}
