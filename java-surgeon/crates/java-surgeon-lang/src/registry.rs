//! Language registry: detect and load grammars.

use crate::{LangError, SupportedLanguage};
use java_surgeon_core::validate::{self, ValidationError};
use std::path::Path;
use tree_sitter::{Language, Parser, Tree};

/// Create a parser configured for the given language.
pub fn parser_for_language(lang: SupportedLanguage) -> Result<Parser, LangError> {
    let mut parser = Parser::new();
    parser
        .set_language(&lang.ts_language()?)
        .map_err(|e| LangError::VersionMismatch(e.to_string()))?;
    Ok(parser)
}

/// Detect language from a file path.
pub fn detect_language(path: &str) -> Result<SupportedLanguage, LangError> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    SupportedLanguage::from_extension(ext)
}

/// Get the tree-sitter Language object for a language string.
pub fn get_language(lang_str: &str) -> Result<Language, LangError> {
    SupportedLanguage::from_name(lang_str)?.ts_language()
}

/// Parse `source` as `lang`, keeping a tree even when it has syntax errors.
pub fn parse(lang: SupportedLanguage, source: &str) -> Result<Tree, ValidationError> {
    let language = lang
        .ts_language()
        .map_err(|e| ValidationError::Language(e.to_string()))?;
    validate::parse_best_effort(source, &language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_java() {
        assert_eq!(
            detect_language("src/test/Test.java").unwrap(),
            SupportedLanguage::Java
        );
    }

    #[test]
    fn test_detect_unsupported() {
        assert!(detect_language("data.json").is_err());
        assert!(detect_language("Makefile").is_err());
    }

    #[test]
    fn test_language_by_name() {
        assert!(get_language("Java").is_ok());
        assert!(matches!(
            get_language("kotlin"),
            Err(LangError::Unsupported(_))
        ));
    }

    #[test]
    fn test_parser_for_java() {
        let mut parser = parser_for_language(SupportedLanguage::Java).unwrap();
        let tree = parser.parse("class Test {}", None).unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn test_parse_keeps_broken_tree() {
        let tree = parse(SupportedLanguage::Java, "class Test { void }").unwrap();
        assert!(tree.root_node().has_error());
    }
}
