use java_surgeon_core::format::{detect_eol, infer_indent_style};
use serde::{Deserialize, Serialize};

/// Formatting and import behavior of an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// One level of indentation.
    pub indent: String,
    /// Line delimiter for generated lines.
    pub eol: String,
    /// Shorten qualified type names through imports.
    pub resolve_imports: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            eol: "\n".to_string(),
            resolve_imports: true,
        }
    }
}

impl EditorConfig {
    /// Defaults, with indentation and EOL taken from `source` when it shows any.
    pub fn detect(source: &str) -> Self {
        let mut config = Self::default();
        if let Some(style) = infer_indent_style(source) {
            config.indent = style.unit();
        }
        if let Some(eol) = detect_eol(source) {
            config.eol = eol.to_string();
        }
        config
    }
}
