use serde::Deserialize;

/// Document packaging options.
///
/// Every field has a default, so an empty TOML table is a valid
/// configuration:
///
/// ```toml
/// toc = true
/// toc_title = "Contents"
/// stylesheet = "styling.css"
/// title = "Lecture notes"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Emit a table of contents before the body.
    pub toc: bool,

    /// Heading of the table of contents.
    pub toc_title: String,

    /// Local stylesheet linked from the document head.
    pub stylesheet: Option<String>,

    /// Document `<title>`. Omitted when unset.
    pub title: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            toc: true,
            toc_title: "Table Of Contents".to_string(),
            stylesheet: Some("styling.css".to_string()),
            title: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let options: CompileOptions = toml::from_str("").unwrap();
        assert_eq!(options, CompileOptions::default());
    }

    #[test]
    fn test_partial_config() {
        let options: CompileOptions = toml::from_str("toc = false\ntitle = \"Notes\"").unwrap();
        assert!(!options.toc);
        assert_eq!(options.title.as_deref(), Some("Notes"));
        assert_eq!(options.toc_title, "Table Of Contents");
        assert_eq!(options.stylesheet.as_deref(), Some("styling.css"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(toml::from_str::<CompileOptions>("tocc = true").is_err());
    }
}
