//! Structural edits of a compilation unit.
//!
//! Every change goes through `replace_text` (or `move_source` for cuts),
//! which edits the buffer and shifts the ranges of every live node and
//! comment so that the tree keeps describing the text. Public operations
//! wrap their work in `transaction`, so a failure leaves both untouched.

mod arrays;
mod declarations;
mod eol_comments;
mod expressions;
mod invocations;
mod javadoc;
mod statements;

use crate::context::CompilationContext;
use crate::error::{AstError, ParseError};
use crate::node::{NodeId, Role};
use crate::parser::{FragmentKind, Parsed};
use crate::resolve;
use java_surgeon_core::scan;
use tracing::{debug, trace};

pub use crate::target::{BodyDeclarationTarget, StatementTarget};

const LIST_SEPARATORS: &str = ", \t\r\n";

/// Split caller source into lines on `\n`, dropping a trailing `\r` and
/// empty lines.
pub fn split_lines(source: &str) -> Vec<&str> {
    source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .collect()
}

impl CompilationContext {
    /// Replace `length` bytes at `start` with `replacement`. Nodes after the
    /// range shift, nodes around it grow or shrink, comments inside it are
    /// dropped.
    pub fn replace_substring(&mut self, start: usize, length: usize, replacement: &str) -> Result<(), AstError> {
        self.transaction("replace_substring", |context| context.replace_text(start, length, replacement))
    }

    /// Replace the text of a name node.
    pub fn set_identifier(&mut self, name: NodeId, identifier: &str) -> Result<(), AstError> {
        self.transaction("set_identifier", |context| {
            let (start, length) = (context.tree.start(name), context.tree.length(name));
            context.replace_text(start, length, identifier)
        })
    }

    pub(crate) fn replace_text(&mut self, start: usize, length: usize, replacement: &str) -> Result<(), AstError> {
        self.buffer.text_range(start, length)?;
        let end = start + length;
        if let Some(node) = self.tree.straddled_node(&[], start, end) {
            debug!(start, end, %node, "replace crosses node boundary");
            return Err(AstError::EditorReplace { start, end });
        }
        if length != 0 {
            self.attach_to_removal(start, length);
        }
        let comments = self.comment_list();
        self.buffer.replace(start, length, replacement)?;
        self.tree.update_for_replace(&comments, start, length, replacement.len());
        trace!(start, length, inserted = replacement.len(), "replaced text");
        Ok(())
    }

    /// Cut `[start, start + length)` and insert it at `target`. Returns
    /// where the moved text now starts.
    pub(crate) fn move_source(&mut self, target: usize, start: usize, length: usize) -> Result<usize, AstError> {
        let source = self.buffer.text_range(start, length)?.to_string();
        let comments = self.comment_list();
        if start > target {
            self.buffer.replace(start, length, "")?;
            self.buffer.replace(target, 0, &source)?;
        } else {
            self.buffer.replace(target, 0, &source)?;
            self.buffer.replace(start, length, "")?;
        }
        self.tree.update_for_move(&comments, target, start, length);
        debug!(target, start, length, "moved source");
        Ok(if start < target { target - length } else { target })
    }

    /// Change the indentation of the lines in `[start, start + length)`:
    /// the first line's indentation is replaced with `indent`, deeper
    /// lines keep their extra indentation.
    pub(crate) fn reindent_source(&mut self, start: usize, length: usize, indent: &str) -> Result<(), AstError> {
        let eol = self.config().eol.clone();
        let source = self.buffer.text_range(start, length)?.to_string();
        let mut position = start;
        let mut base: Option<&str> = None;
        for line in source.split(eol.as_str()) {
            let line_indent = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];
            let base_indent = *base.get_or_insert(line_indent);
            let mut rest = line.len();
            if line_indent.starts_with(base_indent) {
                self.replace_text(position, base_indent.len(), indent)?;
                position += indent.len();
                rest -= base_indent.len();
            }
            position += rest + eol.len();
        }
        Ok(())
    }

    /// Leading whitespace of the line `offset` sits on, up to `offset`.
    pub(crate) fn indent_at(&self, offset: usize) -> String {
        scan::whitespace_to_left(self.text(), offset, false).to_string()
    }

    /// Insert a parsed fragment into the tree and register its comments.
    pub(crate) fn attach(&mut self, parent: NodeId, role: Role, index: usize, parsed: Parsed) -> NodeId {
        self.tree.insert_child_in_role(parent, role, index, parsed.node);
        for comment in parsed.comments {
            self.tree.register_comment(comment);
        }
        parsed.node
    }

    /// Recompute the bindings of `root` and everything below it.
    pub(crate) fn rebind(&mut self, root: NodeId) {
        let bindings = resolve::compute_bindings(&self.environment(), root);
        for id in self.tree.descendants(root) {
            self.tree.set_binding(id, None);
        }
        for (id, binding) in bindings {
            self.tree.set_binding(id, Some(binding));
        }
    }

    /// Parse a fragment for insertion, reporting errors against the
    /// caller's `lines` rather than the scaffolding.
    pub(crate) fn parse_lines(
        &mut self,
        kind: FragmentKind,
        position: usize,
        offset: usize,
        source: &str,
        lines: &[impl AsRef<str>],
    ) -> Result<Parsed, AstError> {
        self.parse_fragment(kind, position, offset, source).map_err(|cause| {
            let eol = self.config().eol.clone();
            let caller: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
            AstError::Parse(ParseError::wrap(caller.join(&eol), cause))
        })
    }

    /// Insert `source` as item `index` of the comma separated `items`,
    /// whose closing delimiter is at `close`. Returns where `source` starts.
    pub(crate) fn insert_list_item(
        &mut self,
        items: &[NodeId],
        index: usize,
        close: usize,
        source: &str,
    ) -> Result<usize, AstError> {
        if index > items.len() {
            return Err(AstError::assertion(format!("index {index} is past {} items", items.len())));
        }
        let (position, prefix, suffix) = match (index, items.first()) {
            (0, None) => (close, "", ""),
            (0, Some(first)) => (self.tree.start(*first), "", ", "),
            _ => (self.tree.end(items[index - 1]), ", ", ""),
        };
        self.replace_text(position, 0, &format!("{prefix}{source}{suffix}"))?;
        Ok(position + prefix.len())
    }

    /// Detach item `index` of the comma separated `items` and delete its
    /// text with one adjoining comma. A sole item is deleted up to `close`.
    pub(crate) fn remove_list_item(&mut self, items: &[NodeId], index: usize, close: &str) -> Result<(), AstError> {
        let item = items[index];
        let mut begin = self.tree.start(item);
        let mut end = self.tree.end(item);
        if index == 0 {
            end = if items.len() == 1 {
                self.buffer.index_of(close, end)?
            } else {
                scan::index_of_any_but(self.text(), LIST_SEPARATORS, end).unwrap_or(end)
            };
        } else {
            begin = scan::index_of_any_but_backward(self.text(), LIST_SEPARATORS, begin).map_or(0, |i| i + 1);
        }
        self.tree.detach(item);
        self.replace_text(begin, end - begin, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::node::NodeKind;

    fn find(context: &CompilationContext, kind: NodeKind, source: &str) -> NodeId {
        let tree = context.tree();
        tree.descendants(tree.root())
            .into_iter()
            .find(|id| tree.kind(*id) == kind && context.node_source(*id) == source)
            .unwrap()
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\n\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("foo()"), vec!["foo()"]);
    }

    #[test]
    fn test_replace_substring_updates_ranges() {
        let mut context = CompilationContext::new("class Test {\n  int a;\n  int b;\n}").unwrap();
        let b = find(&context, NodeKind::FieldDeclaration, "int b;");
        let a_name = find(&context, NodeKind::SimpleName, "a");
        context.set_identifier(a_name, "value").unwrap();
        assert_eq!(context.text(), "class Test {\n  int value;\n  int b;\n}");
        assert_eq!(context.node_source(b), "int b;");
        assert_eq!(context.node_source(a_name), "value");
        let class = context.primary_type().unwrap();
        assert_eq!(context.node_source(class), context.text());
    }

    #[test]
    fn test_straddling_replace_is_rejected() {
        let source = "class Test {\n  int a;\n  int b;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let start = source.find("a;").unwrap();
        let err = context.replace_substring(start, 6, "").unwrap_err();
        assert_eq!(err.code(), ErrorCode::EditorReplace);
        assert_eq!(context.text(), source);
        assert!(context.edits().is_empty());
    }

    #[test]
    fn test_replace_drops_inner_comments() {
        let source = "class Test {\n  // note\n  int a;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        assert_eq!(context.comment_list().len(), 1);
        let start = source.find("// note").unwrap();
        context.replace_substring(start, "// note".len(), "").unwrap();
        assert!(context.comment_list().is_empty());
    }

    #[test]
    fn test_move_source_backward() {
        let source = "class Test {\n  int a;\n  int b;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let a = find(&context, NodeKind::FieldDeclaration, "int a;");
        let b = find(&context, NodeKind::FieldDeclaration, "int b;");
        let target = context.tree().start(a);
        let start = context.tree().start(b);
        let position = context.move_source(target, start, 6).unwrap();
        assert_eq!(position, target);
        assert_eq!(context.text(), "class Test {\n  int b;int a;\n  \n}");
        assert_eq!(context.node_source(a), "int a;");
        assert_eq!(context.node_source(b), "int b;");
    }

    #[test]
    fn test_reindent_keeps_relative_indentation() {
        let source = "class Test {\n  void foo() {\n    if (a) {\n      b();\n    }\n  }\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let start = source.find("    if").unwrap();
        let length = source.find("    }\n  }").unwrap() + 5 - start;
        context.reindent_source(start, length, "\t").unwrap();
        assert_eq!(context.text(), "class Test {\n  void foo() {\n\tif (a) {\n\t  b();\n\t}\n  }\n}");
    }
}
