//! Comments at the end of a source line.

use crate::context::CompilationContext;
use crate::error::AstError;
use crate::node::{NodeData, NodeKind, Role};
use java_surgeon_core::scan;
use tracing::debug;

impl CompilationContext {
    /// Append `comment` (for example `" // $NON-NLS-1$"`) to the line that
    /// holds `position`.
    pub fn add_end_of_line_comment(&mut self, position: usize, comment: &str) -> Result<(), AstError> {
        self.transaction("add_end_of_line_comment", |context| {
            context.buffer.text_range(position, 0)?;
            let line_end = scan::line_end(context.text(), position);
            context.replace_text(line_end, 0, comment)?;
            if let Some(slashes) = comment.find("//") {
                let start = line_end + slashes;
                let id = context.tree.alloc(NodeData::new(
                    NodeKind::LineComment,
                    "line_comment",
                    Role::Other,
                    start,
                    comment.len() - slashes,
                ));
                context.tree.register_comment(id);
            }
            debug!(position, comment, "added end of line comment");
            Ok(())
        })
    }

    /// The `//` comment ending the line that holds `position`, from `//` to
    /// the line end.
    pub fn end_of_line_comment(&self, position: usize) -> Option<&str> {
        let text = self.text();
        if position > text.len() {
            return None;
        }
        let begin = scan::line_begin(text, position);
        let end = scan::line_end(text, position);
        let slashes = text[begin..end].find("//")?;
        Some(&text[begin + slashes..end])
    }

    /// Remove `comment` from the line that holds `position`, with the
    /// whitespace that separated it. A line without it is left alone.
    pub fn remove_end_of_line_comment(&mut self, position: usize, comment: &str) -> Result<(), AstError> {
        self.transaction("remove_end_of_line_comment", |context| {
            let text = context.text();
            if position > text.len() || comment.is_empty() {
                return Ok(());
            }
            let line_begin = scan::line_begin(text, position);
            let line_end = scan::line_end(text, position);
            let Some(found) = text[line_begin..line_end].find(comment) else {
                return Ok(());
            };
            let begin = line_begin + found;
            let end = scan::index_of_any_but(text, " \t", begin + comment.len()).unwrap_or(text.len());
            context.replace_text(begin, end - begin, "")?;

            let text = context.text();
            let mut space = scan::index_of_any_but_backward(text, " \t", begin).map_or(0, |i| i + 1);
            if space != begin {
                if text[begin..].starts_with("//") {
                    space += 1;
                }
                if space < begin {
                    context.replace_text(space, begin - space, "")?;
                }
            }
            debug!(position, comment, "removed end of line comment");
            Ok(())
        })
    }
}
