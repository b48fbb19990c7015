//! Comments of a compilation unit: the live comment list, removal
//! bookkeeping and Javadoc structure.

use crate::context::CompilationContext;
use crate::node::{NodeId, NodeKind};

/// One Javadoc tag, in offsets relative to the comment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagSpan {
    pub start: usize,
    pub end: usize,
    /// End of `@name`; `None` for the leading description.
    pub name_end: Option<usize>,
    pub fragments: Vec<(usize, usize)>,
}

/// Split a `/** ... */` comment into tags. Text before the first `@tag`
/// forms a name-less description tag.
pub(crate) fn parse_javadoc(text: &str) -> Vec<TagSpan> {
    let bytes = text.as_bytes();
    let body_start = 3.min(text.len());
    let body_end = if text.len() >= 5 && text.ends_with("*/") {
        text.len() - 2
    } else {
        text.len()
    };

    let mut tags = Vec::new();
    let mut current: Option<TagSpan> = None;
    let mut line_start = body_start;
    let mut first_line = true;
    while line_start < body_end {
        let line_end = text[line_start..body_end]
            .find(['\r', '\n'])
            .map_or(body_end, |i| line_start + i);

        let mut content_start = line_start;
        if !first_line {
            while content_start < line_end && matches!(bytes[content_start], b' ' | b'\t') {
                content_start += 1;
            }
            while content_start < line_end && bytes[content_start] == b'*' {
                content_start += 1;
            }
        }
        while content_start < line_end && matches!(bytes[content_start], b' ' | b'\t') {
            content_start += 1;
        }
        let mut content_end = line_end;
        while content_end > content_start && bytes[content_end - 1].is_ascii_whitespace() {
            content_end -= 1;
        }

        if content_start < content_end {
            let is_tag = bytes[content_start] == b'@'
                && bytes
                    .get(content_start + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic());
            if is_tag {
                tags.extend(current.take());
                let name_end = text[content_start + 1..content_end]
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                    .map_or(content_end, |i| content_start + 1 + i);
                let mut fragments = Vec::new();
                if name_end < content_end {
                    fragments.push((name_end, content_end));
                }
                current = Some(TagSpan {
                    start: content_start,
                    end: content_end,
                    name_end: Some(name_end),
                    fragments,
                });
            } else {
                match current.as_mut() {
                    Some(tag) => {
                        tag.fragments.push((content_start, content_end));
                        tag.end = content_end;
                    }
                    None => {
                        current = Some(TagSpan {
                            start: content_start,
                            end: content_end,
                            name_end: None,
                            fragments: vec![(content_start, content_end)],
                        })
                    }
                }
            }
        }

        line_start = line_end;
        if text[line_start..].starts_with("\r\n") {
            line_start += 2;
        } else if line_start < body_end {
            line_start += 1;
        }
        first_line = false;
    }
    tags.extend(current);
    tags
}

impl CompilationContext {
    /// Live comments in source order. Removed comments, and comments whose
    /// range no longer holds comment text, are left out.
    pub fn comment_list(&self) -> Vec<NodeId> {
        let text = self.text();
        let tree = self.tree();
        tree.raw_comments()
            .iter()
            .copied()
            .filter(|id| !tree.is_removed_comment(*id))
            .filter(|id| {
                let Some(source) = text.get(tree.start(*id)..tree.end(*id)) else {
                    return false;
                };
                match tree.kind(*id) {
                    NodeKind::LineComment => source.starts_with("//"),
                    NodeKind::BlockComment => source.starts_with("/*"),
                    _ => true,
                }
            })
            .collect()
    }

    /// Mark the comments lying fully inside a range that is about to be
    /// deleted. They never come back into `comment_list`.
    pub fn attach_to_removal(&mut self, start: usize, length: usize) -> Vec<NodeId> {
        self.tree_mut().remove_comments_within(start, length)
    }

    /// Comments strictly inside `[start, end)`.
    pub fn comments_between(&self, start: usize, end: usize) -> Vec<NodeId> {
        let tree = self.tree();
        self.comment_list()
            .into_iter()
            .filter(|id| tree.start(*id) >= start && tree.end(*id) <= end)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(text: &str, range: (usize, usize)) -> &str {
        &text[range.0..range.1]
    }

    #[test]
    fn test_single_tag() {
        let text = "/**\n\t * @tag aaa\n\t */";
        let tags = parse_javadoc(text);
        assert_eq!(tags.len(), 1);
        let tag = &tags[0];
        assert_eq!(&text[tag.start..tag.end], "@tag aaa");
        assert_eq!(&text[tag.start..tag.name_end.unwrap()], "@tag");
        assert_eq!(tag.fragments.len(), 1);
        assert_eq!(slice(text, tag.fragments[0]), " aaa");
    }

    #[test]
    fn test_description_and_tags() {
        let text = "/**\n * Hello\n * world.\n *\n * @param a the a\n * @return\n */";
        let tags = parse_javadoc(text);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].name_end, None);
        assert_eq!(&text[tags[0].start..tags[0].end], "Hello\n * world.");
        assert_eq!(tags[0].fragments.len(), 2);
        assert_eq!(&text[tags[1].start..tags[1].end], "@param a the a");
        assert_eq!(&text[tags[2].start..tags[2].end], "@return");
        assert!(tags[2].fragments.is_empty());
    }

    #[test]
    fn test_one_line_javadoc() {
        let text = "/** @wbp.parser.entryPoint */";
        let tags = parse_javadoc(text);
        assert_eq!(tags.len(), 1);
        assert_eq!(&text[tags[0].start..tags[0].end], "@wbp.parser.entryPoint");
    }

    #[test]
    fn test_empty_javadoc() {
        assert!(parse_javadoc("/**\n */").is_empty());
        assert!(parse_javadoc("/***/").is_empty());
    }

    #[test]
    fn test_continuation_line_joins_tag() {
        let text = "/**\r\n * @tag first\r\n *   second\r\n */";
        let tags = parse_javadoc(text);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].fragments.len(), 2);
        assert_eq!(slice(text, tags[0].fragments[1]), "second");
    }
}
