//! End-to-end compilation of small documents.

use aml_codegen::html::heading_id;
use aml_codegen::{compile, compile_with, highlight, CompileOptions, Diagnostic};
use aml_parser::{Span, MAX_NESTING};
use pretty_assertions::assert_eq;

#[test]
fn heading_paragraph_and_inline_math() {
    let compilation = compile("\\h1{Title}\\p{Hello \\{x\\}}");
    let id = heading_id("Title");

    assert_eq!(
        compilation.body,
        format!(
            "<h1 id=\"{id}\">Title</h1>\n<p>Hello <span id=\"aml-math-0\" math=\"inline\">x\\</span></p>"
        )
    );
    assert!(compilation.diagnostics.is_empty());

    let document = &compilation.document;
    assert_eq!(document.matches("<li toc entry=\"h1\">").count(), 1);
    assert!(document.contains(&format!(
        "<li toc entry=\"h1\"><a href=\"#{id}\">Title</a></li>"
    )));
    assert!(document.contains("renderInlineMath([\"aml-math-0\"]);"));
    assert!(document.contains("renderBlockMath([]);"));
}

#[test]
fn block_math_is_typeset_by_id() {
    let compilation = compile("\\math{x^2}");
    assert_eq!(
        compilation.body,
        "<div id=\"aml-math-0\" math=\"block\">\\begin{equation*}\\begin{split}x^2\\end{split}\\end{equation*}</div>"
    );
    assert!(compilation
        .document
        .contains("renderBlockMath([\"aml-math-0\"]);"));
}

#[test]
fn macro_definition_only() {
    let compilation = compile("\\macroRules![\\vec]{ [\\x] => {\\mathbf{\\x}} }");
    assert_eq!(compilation.body, "");
    assert!(compilation.diagnostics.is_empty());
    assert_eq!(compilation.macros.len(), 1);
}

#[test]
fn macro_use_is_reported_as_unexpanded() {
    let compilation = compile("\\macroRules![\\vec]{ [\\x] => {\\x} }\\p{\\vec{a}}");
    assert_eq!(compilation.body, "<p></p>");
    assert!(matches!(
        compilation.diagnostics.as_slice(),
        [Diagnostic::UnexpandedMacro { name, .. }] if name == "\\vec"
    ));
}

#[test]
fn nested_grid_marks_only_inner() {
    let compilation = compile("\\grid[2col]{\\note{a}\\grid[1col]{\\note{b}}}");
    assert_eq!(
        compilation.body,
        "<div grid col=\"2\"><div note>a</div><div grid col=\"1\" sub-grid><div note>b</div></div></div>"
    );
    assert!(!compile("\\grid{x}").body.contains("sub-grid"));
}

#[test]
fn heading_ids_depend_only_on_content() {
    let first = compile("\\h2{Results}");
    let second = compile("\\p{intro}\\h2{Results}");
    let id = heading_id("Results");
    assert!(first.body.contains(&id));
    assert!(second.body.contains(&id));
    assert!(!compile("\\h2{Methods}").body.contains(&id));
}

#[test]
fn unknown_command_is_skipped() {
    let compilation = compile("\\p{a \\frobnicate{b} c}");
    assert_eq!(compilation.body, "<p>a  c</p>");
    assert_eq!(
        compilation.diagnostics,
        vec![Diagnostic::UnsupportedCommand {
            name: "\\frobnicate".into(),
            span: Span::new(5, 19, 1, 6),
        }]
    );
    assert!(!compilation.is_complete());
}

#[test]
fn unterminated_block_is_dropped() {
    let compilation = compile("\\p{ok} {lost");
    assert_eq!(compilation.body, "<p>ok</p>\n ");
    assert!(matches!(
        compilation.diagnostics.as_slice(),
        [Diagnostic::UnterminatedBlock { open, .. }] if open == "{"
    ));
}

#[test]
fn options_shape_the_document() {
    let options: CompileOptions =
        toml::from_str("toc_title = \"Contents\"\nstylesheet = \"notes.css\"").unwrap();
    let compilation = compile_with("\\h1{A}", &options);
    assert!(compilation
        .document
        .contains("<h1 toc-title>Contents</h1>"));
    assert!(compilation
        .document
        .contains("<link rel=\"stylesheet\" href=\"notes.css\">"));
}

#[test]
fn highlight_counts_every_command() {
    let spans = highlight("\\h1{Title}\\p{Hello \\{x\\}}");
    let identifiers: usize = spans.iter().map(|span| span.identifier_spans().len()).sum();
    assert_eq!(identifiers, 4);
}

/// Ids passed to `call(...)` in the page's load script.
fn script_ids(document: &str, call: &str) -> Vec<String> {
    let start = document
        .find(&format!("{call}(["))
        .map(|at| at + call.len() + 2)
        .unwrap_or_else(|| panic!("missing {call} call"));
    let end = start + document[start..].find("])").unwrap();
    document[start..end]
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| id.trim_matches('"').to_string())
        .collect()
}

#[test]
fn every_typeset_id_is_in_the_body() {
    let compilation = compile("\\br{\\{x}} \\p{\\{y}} \\img[src=a.png]{\\math{z}} \\math{w}");
    let inline = script_ids(&compilation.document, "renderInlineMath");
    let block = script_ids(&compilation.document, "renderBlockMath");
    assert_eq!(inline.len(), 1);
    assert_eq!(block.len(), 1);
    for id in inline.iter().chain(&block) {
        assert!(
            compilation.body.contains(&format!("id=\"{id}\"")),
            "{id} is typeset but not in the body"
        );
    }
    let invalid = compilation
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::InvalidArguments { .. }))
        .count();
    assert_eq!(invalid, 2);
}

#[test]
fn headings_inside_void_tags_stay_out_of_the_toc() {
    let compilation = compile("\\hr{\\h2{Lost}}");
    assert_eq!(compilation.body, "");
    assert!(compilation.document.contains("<ul toc-entries></ul>"));
    assert!(!compilation.document.contains("Lost"));
}

#[test]
fn deeply_nested_blocks_do_not_overflow() {
    let depth = 5000;
    let source = format!("\\p{{{}x{}}}", "{".repeat(depth), "}".repeat(depth));
    let compilation = compile(&source);
    let too_deep = compilation
        .diagnostics
        .iter()
        .filter(|d| d.code() == "nesting-too-deep")
        .count();
    assert_eq!(too_deep, depth + 1 - MAX_NESTING);
    assert!(!compilation.is_complete());
    assert!(!highlight(&source).is_empty());
}

#[test]
fn deeply_nested_commands_do_not_overflow() {
    let depth = 5000;
    let source = format!("{}x{}", "\\note{".repeat(depth), "}".repeat(depth));
    let compilation = compile(&source);
    assert!(compilation
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::NestingTooDeep { text, .. } if text == "\\note")));
    assert_eq!(highlight(&source).len(), MAX_NESTING);
}
