//! WASM bindings for the AML compiler.
//!
//! Exposes `compile()` and `highlight()` to JavaScript via wasm-bindgen.
//! Compilation never throws on bad input: problems come back as diagnostics.

use wasm_bindgen::prelude::*;

fn set(target: &js_sys::Object, key: &str, value: &JsValue) -> Result<(), JsError> {
    js_sys::Reflect::set(target, &key.into(), value)
        .map(|_| ())
        .map_err(|_| JsError::new(&format!("Failed to set {key} property")))
}

/// Compile AML source to a standalone HTML document.
///
/// Returns `{ document: string, diagnostics: Array<{ code, severity, message, start, end, line, column }> }`.
#[wasm_bindgen]
pub fn compile(source: &str) -> Result<JsValue, JsError> {
    let compilation = aml_codegen::compile(source);

    let diagnostics = js_sys::Array::new();
    for diagnostic in &compilation.diagnostics {
        let span = diagnostic.span();
        let entry = js_sys::Object::new();
        set(&entry, "code", &diagnostic.code().into())?;
        set(&entry, "severity", &diagnostic.severity().to_string().into())?;
        set(&entry, "message", &diagnostic.to_string().into())?;
        set(&entry, "start", &(span.start as u32).into())?;
        set(&entry, "end", &(span.end as u32).into())?;
        set(&entry, "line", &(span.line as u32).into())?;
        set(&entry, "column", &(span.column as u32).into())?;
        diagnostics.push(&entry);
    }

    let js_obj = js_sys::Object::new();
    set(&js_obj, "document", &compilation.document.into())?;
    set(&js_obj, "diagnostics", &diagnostics)?;
    Ok(js_obj.into())
}

/// Highlight spans as `Array<{ kind, start, end, depth }>`, byte offsets.
#[wasm_bindgen]
pub fn highlight(source: &str) -> Result<JsValue, JsError> {
    let spans = js_sys::Array::new();
    for span in aml_codegen::highlight(source) {
        let range = span.span();
        let entry = js_sys::Object::new();
        set(&entry, "kind", &span.kind().into())?;
        set(&entry, "start", &(range.start as u32).into())?;
        set(&entry, "end", &(range.end as u32).into())?;
        set(&entry, "depth", &(span.depth() as u32).into())?;
        spans.push(&entry);
    }
    Ok(spans.into())
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
