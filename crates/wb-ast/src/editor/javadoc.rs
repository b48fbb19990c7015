//! Javadoc comments of declarations and their tags.

use crate::context::CompilationContext;
use crate::error::{AstError, ParseError};
use crate::lower::Lowerer;
use crate::node::{NodeData, NodeId, NodeKind, Role};
use java_surgeon_core::scan;
use java_surgeon_lang::{java, registry, SupportedLanguage};
use tracing::debug;

impl CompilationContext {
    /// Replace the Javadoc of `declaration` with one holding `lines`, or
    /// delete it when `lines` is `None`. Returns the new Javadoc.
    pub fn set_javadoc(&mut self, declaration: NodeId, lines: Option<&[&str]>) -> Result<Option<NodeId>, AstError> {
        self.transaction("set_javadoc", |context| context.write_javadoc(declaration, lines))
    }

    /// Text after `tag_name` of the first matching tag, with its leading
    /// whitespace.
    pub fn javadoc_tag_text(&self, declaration: NodeId, tag_name: &str) -> Option<String> {
        let tag = self.find_tag(declaration, tag_name)?;
        let source = self.node_source(tag);
        source.get(tag_name.len()..).map(str::to_string)
    }

    /// Set the text of tag `tag_name` (such as `@wbp.parser.entryPoint`),
    /// adding the tag, and the Javadoc, when missing. `None` removes the
    /// tag, and the Javadoc once it has no tags left. Returns the tag.
    pub fn set_javadoc_tag_text(
        &mut self,
        declaration: NodeId,
        tag_name: &str,
        text: Option<&str>,
    ) -> Result<Option<NodeId>, AstError> {
        if !tag_name.starts_with('@') || tag_name.len() < 2 {
            return Err(AstError::assertion(format!("Tag name should start with '@': {tag_name}")));
        }
        self.transaction("set_javadoc_tag_text", |context| match text {
            Some(text) => context.write_tag(declaration, tag_name, text).map(Some),
            None => {
                context.delete_tag(declaration, tag_name)?;
                Ok(None)
            }
        })
    }

    /// Delete every Javadoc that trails the last member of a type, where it
    /// documents nothing.
    pub fn remove_dangling_javadoc(&mut self) -> Result<(), AstError> {
        self.transaction("remove_dangling_javadoc", |context| context.strip_dangling_javadoc())
    }

    fn tag_name_of(&self, tag: NodeId) -> Option<&str> {
        let source = self.node_source(tag);
        if !source.starts_with('@') {
            return None;
        }
        source.split_whitespace().next()
    }

    fn find_tag(&self, declaration: NodeId, tag_name: &str) -> Option<NodeId> {
        let javadoc = self.tree.child_with_role(declaration, Role::Javadoc)?;
        self.tree
            .children_with_role(javadoc, Role::Tag)
            .into_iter()
            .find(|tag| self.tag_name_of(*tag) == Some(tag_name))
    }

    pub(crate) fn write_javadoc(&mut self, declaration: NodeId, lines: Option<&[&str]>) -> Result<Option<NodeId>, AstError> {
        let old = self.tree.child_with_role(declaration, Role::Javadoc);
        let Some(lines) = lines else {
            if let Some(old) = old {
                let begin = self.tree.start(old);
                let end = scan::index_of_any_but(self.text(), " \t\r\n", self.tree.end(old)).unwrap_or(self.text().len());
                self.tree.detach(old);
                self.replace_text(begin, end - begin, "")?;
                debug!(%declaration, "removed javadoc");
            }
            return Ok(None);
        };

        let eol = self.config().eol.clone();
        let position = match old {
            Some(old) => self.tree.start(old),
            None => self.tree.start(declaration),
        };
        let indent = self.indent_at(position);
        let mut comment = format!("/**{eol}");
        for line in lines {
            comment.push_str(&format!("{indent} * {line}{eol}"));
        }
        comment.push_str(&format!("{indent} */"));

        match old {
            Some(old) => {
                let length = self.tree.length(old);
                self.tree.detach(old);
                self.replace_text(position, length, &comment)?;
            }
            None => {
                let inserted = format!("{comment}{eol}{indent}");
                let length = self.tree.length(declaration);
                self.replace_text(position, 0, &inserted)?;
                self.tree.set_range(declaration, position, inserted.len() + length);
            }
        }
        let javadoc = self.lower_javadoc(position, &comment)?;
        self.tree.node_mut(javadoc).role = Role::Javadoc;
        self.tree.insert_child(declaration, 0, javadoc);
        self.tree.register_comment(javadoc);
        debug!(%declaration, %javadoc, "set javadoc");
        Ok(Some(javadoc))
    }

    fn lower_javadoc(&mut self, offset: usize, comment: &str) -> Result<NodeId, AstError> {
        let parsed = registry::parse(SupportedLanguage::Java, comment)
            .map_err(|e| ParseError::new(comment, e.to_string()))?;
        let program = parsed.root_node();
        let node = program
            .child(0)
            .filter(|n| n.kind() == java::BLOCK_COMMENT)
            .ok_or_else(|| ParseError::new(comment, "Expected a Javadoc comment"))?;
        let mut lowerer = Lowerer::new(&mut self.tree, comment, offset as isize);
        Ok(lowerer.lower_comment(node))
    }

    fn write_tag(&mut self, declaration: NodeId, tag_name: &str, text: &str) -> Result<NodeId, AstError> {
        if let Some(tag) = self.find_tag(declaration, tag_name) {
            self.replace_tag_text(tag, text)?;
            return Ok(tag);
        }
        let Some(javadoc) = self.tree.child_with_role(declaration, Role::Javadoc) else {
            let line = format!("{tag_name}{text}");
            let javadoc = self.write_javadoc(declaration, Some(&[line.as_str()]))?;
            return javadoc
                .and_then(|javadoc| self.tree.children_with_role(javadoc, Role::Tag).first().copied())
                .ok_or_else(|| AstError::assertion(format!("Javadoc of {declaration} has no tag")));
        };

        let eol = self.config().eol.clone();
        let javadoc_start = self.tree.start(javadoc);
        let prefix = self.indent_at(javadoc_start);
        let mut position = match self.tree.children_with_role(javadoc, Role::Tag).last() {
            Some(last) => self.tree.end(*last),
            None => javadoc_start + 3,
        };
        let line = format!("{eol}{prefix} * ");
        self.replace_text(position, 0, &line)?;
        position += line.len();
        let source = format!("{tag_name}{text}");
        self.replace_text(position, 0, &source)?;

        let tag = self
            .tree
            .alloc(NodeData::new(NodeKind::TagElement, "synthetic", Role::Tag, position, source.len()));
        let fragment = self.tree.alloc(NodeData::new(
            NodeKind::TextElement,
            "synthetic",
            Role::TagFragment,
            position + tag_name.len(),
            text.len(),
        ));
        self.tree.push_child(tag, fragment);
        self.tree.push_child(javadoc, tag);
        debug!(%declaration, tag_name, "added javadoc tag");
        Ok(tag)
    }

    /// Replace everything after the name of `tag` with `text`.
    fn replace_tag_text(&mut self, tag: NodeId, text: &str) -> Result<(), AstError> {
        let fragments = self.tree.children_with_role(tag, Role::TagFragment);
        let position = match fragments.first() {
            Some(first) => {
                let position = self.tree.start(*first);
                for fragment in &fragments {
                    self.tree.detach(*fragment);
                }
                let end = self.tree.end(tag);
                self.replace_text(position, end - position, text)?;
                position
            }
            None => {
                let position = self.tree.end(tag);
                self.replace_text(position, 0, text)?;
                self.tree.set_end(tag, position + text.len());
                position
            }
        };
        let fragment = self
            .tree
            .alloc(NodeData::new(NodeKind::TextElement, "synthetic", Role::TagFragment, position, text.len()));
        self.tree.push_child(tag, fragment);
        Ok(())
    }

    fn delete_tag(&mut self, declaration: NodeId, tag_name: &str) -> Result<(), AstError> {
        let Some(tag) = self.find_tag(declaration, tag_name) else {
            return Ok(());
        };
        let mut begin = self.tree.start(tag);
        let end = scan::index_of_any_but(self.text(), " \t\r\n*", self.tree.end(tag) + 1).unwrap_or(self.text().len());
        if self.text()[end..].starts_with('/') {
            begin = scan::index_of_any_but_backward(self.text(), "*", begin).unwrap_or(begin);
        }
        self.tree.detach(tag);
        self.replace_text(begin, end - begin, "")?;

        let javadoc = self.tree.child_with_role(declaration, Role::Javadoc);
        if javadoc.is_some_and(|javadoc| self.tree.children_with_role(javadoc, Role::Tag).is_empty()) {
            self.write_javadoc(declaration, None)?;
        }
        debug!(%declaration, tag_name, "removed javadoc tag");
        Ok(())
    }

    pub(crate) fn strip_dangling_javadoc(&mut self) -> Result<(), AstError> {
        let root = self.tree.root();
        let mut types: Vec<NodeId> = self
            .tree
            .descendants(root)
            .into_iter()
            .filter(|id| self.tree.kind(*id).is_type_declaration())
            .collect();
        types.reverse();
        for declaration in types {
            let end = self.tree.end(declaration);
            if end == 0 {
                continue;
            }
            let type_end = end - 1;
            let text = self.text();
            let trailing = scan::skip_whitespace_and_pure_eolc_to_left(text, type_end);
            let trailing = scan::skip_whitespace_to_left(text, trailing, true);
            let Some(begin) = text[..type_end].rfind("/**") else {
                continue;
            };
            let Some(close) = text[begin..type_end].find("*/") else {
                continue;
            };
            if begin + close + 2 != trailing {
                continue;
            }
            let begin = scan::skip_whitespace_to_left(text, begin, false);
            self.replace_text(begin, type_end - begin, "")?;
            debug!(%declaration, "removed dangling javadoc");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn field(context: &CompilationContext) -> NodeId {
        let tree = context.tree();
        tree.descendants(tree.root())
            .into_iter()
            .find(|id| tree.kind(*id) == NodeKind::FieldDeclaration)
            .unwrap()
    }

    #[test]
    fn test_set_and_remove_javadoc() {
        let source = "class Test {\n  int a;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let a = field(&context);
        let javadoc = context.set_javadoc(a, Some(&["The a."])).unwrap().unwrap();
        assert_eq!(context.text(), "class Test {\n  /**\n   * The a.\n   */\n  int a;\n}");
        assert_eq!(context.tree().child_with_role(a, Role::Javadoc), Some(javadoc));
        assert!(context.node_source(a).starts_with("/**"));
        assert!(context.node_source(a).ends_with("int a;"));
        assert!(context.comment_list().contains(&javadoc));

        let replaced = context.set_javadoc(a, Some(&["Other."])).unwrap().unwrap();
        assert_eq!(context.text(), "class Test {\n  /**\n   * Other.\n   */\n  int a;\n}");
        assert_ne!(replaced, javadoc);

        assert_eq!(context.set_javadoc(a, None).unwrap(), None);
        assert_eq!(context.text(), source);
        assert_eq!(context.node_source(a), "int a;");
        assert!(context.comment_list().is_empty());
    }

    #[test]
    fn test_tag_text_is_replaced() {
        let source = "class Test {\n  /**\n   * @wbp.parser.entryPoint\n   * @tag aaa\n   */\n  int a;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let a = field(&context);
        assert_eq!(context.javadoc_tag_text(a, "@tag").as_deref(), Some(" aaa"));
        assert_eq!(context.javadoc_tag_text(a, "@wbp.parser.entryPoint").as_deref(), Some(""));
        assert_eq!(context.javadoc_tag_text(a, "@missing"), None);

        context.set_javadoc_tag_text(a, "@tag", Some(" bbb")).unwrap();
        context.set_javadoc_tag_text(a, "@wbp.parser.entryPoint", Some(" x")).unwrap();
        assert_eq!(
            context.text(),
            "class Test {\n  /**\n   * @wbp.parser.entryPoint x\n   * @tag bbb\n   */\n  int a;\n}"
        );
        assert_eq!(context.javadoc_tag_text(a, "@tag").as_deref(), Some(" bbb"));
    }

    #[test]
    fn test_tag_is_added() {
        let source = "class Test {\n  /**\n   * @tag aaa\n   */\n  int a;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let a = field(&context);
        let tag = context.set_javadoc_tag_text(a, "@other", Some(" x")).unwrap().unwrap();
        assert_eq!(
            context.text(),
            "class Test {\n  /**\n   * @tag aaa\n   * @other x\n   */\n  int a;\n}"
        );
        assert_eq!(context.node_source(tag), "@other x");
    }

    #[test]
    fn test_tag_creates_javadoc() {
        let mut context = CompilationContext::new("class Test {\n  int a;\n}").unwrap();
        let a = field(&context);
        let tag = context.set_javadoc_tag_text(a, "@wbp.nonvisual", Some(" location=1,2")).unwrap().unwrap();
        assert_eq!(
            context.text(),
            "class Test {\n  /**\n   * @wbp.nonvisual location=1,2\n   */\n  int a;\n}"
        );
        assert_eq!(context.node_source(tag), "@wbp.nonvisual location=1,2");
    }

    #[test]
    fn test_tags_are_removed() {
        let source = "class Test {\n  /**\n   * @a x\n   * @b y\n   */\n  int a;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let a = field(&context);
        context.set_javadoc_tag_text(a, "@b", None).unwrap();
        assert_eq!(context.text(), "class Test {\n  /**\n   * @a x\n   */\n  int a;\n}");
        context.set_javadoc_tag_text(a, "@a", None).unwrap();
        assert_eq!(context.text(), "class Test {\n  int a;\n}");
        assert!(context.tree().child_with_role(a, Role::Javadoc).is_none());
    }

    #[test]
    fn test_bad_tag_name() {
        let mut context = CompilationContext::new("class Test {\n  int a;\n}").unwrap();
        let a = field(&context);
        let err = context.set_javadoc_tag_text(a, "tag", Some(" x")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Assertion);
    }

    #[test]
    fn test_dangling_javadoc_is_removed() {
        let source = "class Test {\n  int a;\n  /** kept */\n  int b;\n  /** dangling */\n}";
        let mut context = CompilationContext::new(source).unwrap();
        context.remove_dangling_javadoc().unwrap();
        assert_eq!(context.text(), "class Test {\n  int a;\n  /** kept */\n  int b;\n}");
    }
}
