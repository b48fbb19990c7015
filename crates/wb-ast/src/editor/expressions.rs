//! Replacing expressions in place.

use super::split_lines;
use crate::context::CompilationContext;
use crate::error::AstError;
use crate::node::{NodeId, Role};
use crate::parser::FragmentKind;
use java_surgeon_core::format::indented_source;

impl CompilationContext {
    /// Replace `expression` with the expression written as `lines`. Lines
    /// after the first are indented relative to the enclosing statement.
    /// Returns the new expression.
    pub fn replace_expression(&mut self, expression: NodeId, lines: &[impl AsRef<str>]) -> Result<NodeId, AstError> {
        self.transaction("replace_expression", |context| context.replace_expression_lines(expression, lines))
    }

    /// Replace argument `index` of a method invocation or instance creation.
    pub fn replace_invocation_argument(
        &mut self,
        invocation: NodeId,
        index: usize,
        lines: &[impl AsRef<str>],
    ) -> Result<NodeId, AstError> {
        self.transaction("replace_invocation_argument", |context| {
            let argument = context
                .tree
                .children_with_role(invocation, Role::Argument)
                .get(index)
                .copied()
                .ok_or_else(|| AstError::assertion(format!("{invocation} has no argument {index}")))?;
            context.replace_expression_lines(argument, lines)
        })
    }

    pub(crate) fn replace_expression_lines(
        &mut self,
        expression: NodeId,
        lines: &[impl AsRef<str>],
    ) -> Result<NodeId, AstError> {
        let lines: Vec<&str> = lines.iter().flat_map(|line| split_lines(line.as_ref())).collect();
        let enclosing = self
            .statement_of(expression)
            .or_else(|| self.tree.find_ancestor(expression, |kind| kind.is_body_declaration()))
            .ok_or_else(|| AstError::assertion(format!("{expression} is not inside a statement or member")))?;
        let indent = self.indent_at(self.tree.start(enclosing));
        let eol = self.config().eol.clone();
        let source = indented_source(&lines, &indent, &self.config().indent, &eol);
        let source = source.trim();

        let start = self.tree.start(expression);
        let length = self.tree.length(expression);
        let source = self.expand_templates(start, source);
        let parsed = self.parse_lines(FragmentKind::Expression, start, start, &source, &lines)?;
        self.replace_text(start, length, &source)?;
        self.tree.replace_node(expression, parsed.node);
        for comment in parsed.comments {
            self.tree.register_comment(comment);
        }
        self.shorten_type_names(parsed.node)
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
    fn test_replace_initializer() {
        let source = "class Test {\n  int a = 1;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let literal = find(&context, NodeKind::Literal, "1");
        let replacement = context.replace_expression(literal, &["2 + 3"]).unwrap();
        assert_eq!(context.text(), "class Test {\n  int a = 2 + 3;\n}");
        assert_eq!(context.tree().role(replacement), Role::Initializer);
        assert_eq!(context.node_source(replacement), "2 + 3");
        assert!(context.tree().is_dangling(literal));
    }

    #[test]
    fn test_multiline_expression_is_indented() {
        let source = "class Test {\n  void foo() {\n    Object o = null;\n  }\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let literal = find(&context, NodeKind::Literal, "null");
        context
            .replace_expression(literal, &["new Object() {\n\tint a;\n}"])
            .unwrap();
        assert_eq!(
            context.text(),
            "class Test {\n  void foo() {\n    Object o = new Object() {\n      int a;\n    };\n  }\n}"
        );
    }

    #[test]
    fn test_replace_invocation_argument() {
        let source = "class Test {\n  void foo() {\n    bar(1, 2);\n  }\n  void bar(int a, int b) {}\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let invocation = find(&context, NodeKind::MethodInvocation, "bar(1, 2)");
        let argument = context.replace_invocation_argument(invocation, 1, &["a()"]);
        assert_eq!(argument.unwrap_err().code(), ErrorCode::Parse);
        let argument = context.replace_invocation_argument(invocation, 1, &["40 + 2"]).unwrap();
        assert_eq!(context.tree().index_in_role(argument), Some(1));
        assert!(context.text().contains("bar(1, 40 + 2);"));
        let err = context.replace_invocation_argument(invocation, 2, &["3"]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Assertion);
    }
}
