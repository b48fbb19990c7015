//! Syntax validation: parse and collect ERROR / MISSING nodes.

use serde::Serialize;
use thiserror::Error;
use tree_sitter::{Parser, Tree};

/// Errors found during validation.
#[derive(Debug, Clone, Error, Serialize)]
pub enum ValidationError {
    #[error("tree-sitter parser returned None (timeout or cancellation)")]
    ParseFailed,
    #[error("Grammar could not be loaded: {0}")]
    Language(String),
    #[error("Source contains {count} syntax error(s)")]
    SyntaxErrors {
        count: usize,
        errors: Vec<SyntaxError>,
    },
}

/// A single syntax error location in the parsed output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number.
    pub column: usize,
    /// Byte offset of the error node.
    pub offset: usize,
    /// ~60 chars of surrounding source for context.
    pub context: String,
    /// The tree-sitter node kind (e.g., "ERROR", "MISSING").
    pub node_kind: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.node_kind.starts_with("MISSING") {
            write!(f, "Syntax error on line {}, column {}: {}", self.line, self.column, self.node_kind)
        } else {
            write!(
                f,
                "Syntax error on line {}, column {} near \"{}\"",
                self.line,
                self.column,
                self.context.trim()
            )
        }
    }
}

/// Verify that `source` parses cleanly with the given language.
///
/// Returns `Ok(tree)` if the parse tree has no ERROR or MISSING nodes,
/// or `Err` with details about what went wrong.
pub fn verify_parse(
    source: &str,
    language: &tree_sitter::Language,
) -> Result<Tree, ValidationError> {
    let tree = parse_best_effort(source, language)?;
    let errors = syntax_errors(&tree, source);
    if !errors.is_empty() {
        return Err(ValidationError::SyntaxErrors {
            count: errors.len(),
            errors,
        });
    }
    Ok(tree)
}

/// Parse source without validation (best-effort, may contain errors).
pub fn parse_best_effort(
    source: &str,
    language: &tree_sitter::Language,
) -> Result<Tree, ValidationError> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| ValidationError::Language(e.to_string()))?;

    parser.parse(source, None).ok_or(ValidationError::ParseFailed)
}

/// All ERROR and MISSING nodes of a tree, in document order.
pub fn syntax_errors(tree: &Tree, source: &str) -> Vec<SyntaxError> {
    let root = tree.root_node();
    let mut errors = Vec::new();
    if root.has_error() {
        collect_errors_recursive(&root, source, &mut errors);
    }
    errors
}

/// Render errors as one diagnostic message, one error per line.
pub fn describe(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_errors_recursive(
    node: &tree_sitter::Node,
    source: &str,
    errors: &mut Vec<SyntaxError>,
) {
    if node.is_error() || node.is_missing() {
        let start = node.start_position();
        let byte_start = floor_char_boundary(source, node.start_byte().saturating_sub(30));
        let byte_end = ceil_char_boundary(source, (node.end_byte() + 30).min(source.len()));
        let node_kind = if node.is_missing() {
            format!("MISSING {}", node.kind())
        } else {
            node.kind().to_string()
        };
        errors.push(SyntaxError {
            line: start.row + 1,
            column: start.column + 1,
            offset: node.start_byte(),
            context: source[byte_start..byte_end].to_string(),
            node_kind,
        });
        // children of an ERROR node are not reported separately
        return;
    }

    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            collect_errors_recursive(&cursor.node(), source, errors);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

/// Find the largest byte index <= `idx` that is a char boundary.
fn floor_char_boundary(s: &str, idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    let mut i = idx;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Find the smallest byte index >= `idx` that is a char boundary.
fn ceil_char_boundary(s: &str, idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    let mut i = idx;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn java() -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }

    #[test]
    fn test_verify_parse_clean() {
        let tree = verify_parse("class A { void foo() { int a = 1; } }", &java()).unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn test_verify_parse_reports_errors() {
        let source = "class A { void foo() { int a = ; } }";
        match verify_parse(source, &java()) {
            Err(ValidationError::SyntaxErrors { count, errors }) => {
                assert!(count >= 1);
                assert_eq!(errors[0].line, 1);
                assert!(!describe(&errors).is_empty());
            }
            other => panic!("expected syntax errors, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_best_effort_keeps_tree() {
        let tree = parse_best_effort("class A { void foo( }", &java()).unwrap();
        assert!(tree.root_node().has_error());
        assert!(!syntax_errors(&tree, "class A { void foo( }").is_empty());
    }

    #[test]
    fn test_char_boundaries() {
        let s = "aé";
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(ceil_char_boundary(s, 2), 3);
    }
}
