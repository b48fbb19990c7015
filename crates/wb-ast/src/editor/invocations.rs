//! Arguments, names and receivers of method invocations and instance
//! creations.

use crate::binding::{Binding, SynthesizedMethod};
use crate::context::CompilationContext;
use crate::error::AstError;
use crate::node::{NodeId, NodeKind, Role};
use crate::parser::FragmentKind;
use java_surgeon_core::format::indented_source;
use std::rc::Rc;
use tracing::debug;

impl CompilationContext {
    pub fn add_invocation_argument(&mut self, invocation: NodeId, index: usize, source: &str) -> Result<NodeId, AstError> {
        self.transaction("add_invocation_argument", |context| {
            context.expect_invocation(invocation, &[NodeKind::MethodInvocation, NodeKind::ConstructorInvocation])?;
            context.insert_argument(invocation, index, source)
        })
    }

    pub fn add_creation_argument(&mut self, creation: NodeId, index: usize, source: &str) -> Result<NodeId, AstError> {
        self.transaction("add_creation_argument", |context| {
            context.expect_invocation(creation, &[NodeKind::ClassInstanceCreation])?;
            context.insert_argument(creation, index, source)
        })
    }

    /// Delete argument `index` with one adjoining comma. An index past the
    /// last argument is ignored.
    pub fn remove_invocation_argument(&mut self, invocation: NodeId, index: usize) -> Result<(), AstError> {
        self.transaction("remove_invocation_argument", |context| {
            context.expect_invocation(invocation, &[NodeKind::MethodInvocation, NodeKind::ConstructorInvocation])?;
            context.delete_argument(invocation, index)
        })
    }

    pub fn remove_creation_argument(&mut self, creation: NodeId, index: usize) -> Result<(), AstError> {
        self.transaction("remove_creation_argument", |context| {
            context.expect_invocation(creation, &[NodeKind::ClassInstanceCreation])?;
            context.delete_argument(creation, index)
        })
    }

    /// Move argument `old_index` so that it becomes argument `new_index`.
    pub fn move_invocation_argument(
        &mut self,
        invocation: NodeId,
        old_index: usize,
        new_index: usize,
    ) -> Result<(), AstError> {
        self.transaction("move_invocation_argument", |context| {
            let arguments = context.tree.children_with_role(invocation, Role::Argument);
            let argument = arguments
                .get(old_index)
                .copied()
                .ok_or_else(|| AstError::assertion(format!("{invocation} has no argument {old_index}")))?;
            let source = context.node_source(argument).to_string();
            context.delete_argument(invocation, old_index)?;

            let arguments = context.tree.children_with_role(invocation, Role::Argument);
            let close = context.arguments_close(invocation)?;
            let position = context.insert_list_item(&arguments, new_index, close, &source)?;
            context.tree.insert_child_in_role(invocation, Role::Argument, new_index, argument);
            context.tree.move_node(argument, position);
            context.rebind_invocation(invocation);
            Ok(())
        })
    }

    /// Replace all arguments with the text of `lines`.
    pub fn replace_invocation_arguments(&mut self, invocation: NodeId, lines: &[impl AsRef<str>]) -> Result<(), AstError> {
        self.transaction("replace_invocation_arguments", |context| {
            context.expect_invocation(invocation, &[NodeKind::MethodInvocation, NodeKind::ConstructorInvocation])?;
            context.rewrite_arguments(invocation, lines)
        })
    }

    pub fn replace_creation_arguments(&mut self, creation: NodeId, lines: &[impl AsRef<str>]) -> Result<(), AstError> {
        self.transaction("replace_creation_arguments", |context| {
            context.expect_invocation(creation, &[NodeKind::ClassInstanceCreation])?;
            context.rewrite_arguments(creation, lines)
        })
    }

    pub fn replace_invocation_name(&mut self, invocation: NodeId, name: &str) -> Result<(), AstError> {
        self.transaction("replace_invocation_name", |context| {
            let name_node = context
                .tree
                .child_with_role(invocation, Role::Name)
                .ok_or_else(|| AstError::assertion(format!("{invocation} has no name")))?;
            context.set_identifier(name_node, name)?;
            context.rebind_invocation(invocation);
            Ok(())
        })
    }

    /// Replace the receiver of `invocation`, adding one when the call has
    /// none. Returns the new receiver.
    pub fn replace_invocation_expression(&mut self, invocation: NodeId, source: &str) -> Result<NodeId, AstError> {
        self.transaction("replace_invocation_expression", |context| {
            context.expect_invocation(invocation, &[NodeKind::MethodInvocation])?;
            let receiver = match context.tree.child_with_role(invocation, Role::Expression) {
                Some(receiver) => context.replace_expression_lines(receiver, &[source])?,
                None => context.prepend_receiver(invocation, source.trim())?,
            };
            context.rebind_invocation(invocation);
            Ok(receiver)
        })
    }

    /// Give the instance creation `creation` an empty anonymous class body.
    pub fn add_anonymous_class_declaration(&mut self, creation: NodeId) -> Result<NodeId, AstError> {
        self.transaction("add_anonymous_class_declaration", |context| {
            context.expect_invocation(creation, &[NodeKind::ClassInstanceCreation])?;
            if context.tree.child_with_role(creation, Role::AnonymousBody).is_some() {
                return Err(AstError::assertion(format!("{creation} already has an anonymous class")));
            }
            let statement = context
                .statement_of(creation)
                .ok_or_else(|| AstError::assertion(format!("{creation} is not inside a statement")))?;
            let eol = context.config().eol.clone();
            let indent = context.indent_at(context.tree.start(statement));
            let body = format!(" {{{eol}{indent}}}");
            let (begin, end) = (context.tree.start(creation), context.tree.end(creation));
            let creation_source = format!("{}{body}", context.node_source(creation));

            context.replace_text(end, 0, &body)?;
            let parsed = context.parse_fragment(FragmentKind::Expression, begin, begin, &creation_source)?;
            let anonymous = context
                .tree
                .child_with_role(parsed.node, Role::AnonymousBody)
                .ok_or_else(|| AstError::assertion(format!("{creation_source} has no anonymous class")))?;
            context.tree.detach(anonymous);
            context.tree.insert_child_in_role(creation, Role::AnonymousBody, usize::MAX, anonymous);

            let new_end = context.tree.end(anonymous);
            let mut node = Some(creation);
            while let Some(id) = node {
                if context.tree.end(id) != end {
                    break;
                }
                context.tree.set_end(id, new_end);
                node = context.tree.parent(id);
            }
            debug!(%creation, %anonymous, "added anonymous class");
            Ok(anonymous)
        })
    }

    fn expect_invocation(&self, node: NodeId, kinds: &[NodeKind]) -> Result<(), AstError> {
        let kind = self.tree.kind(node);
        if kinds.contains(&kind) {
            Ok(())
        } else {
            Err(AstError::assertion(format!("{kind:?} is not one of {kinds:?}")))
        }
    }

    /// Offset of the `)` closing the argument list.
    fn arguments_close(&self, invocation: NodeId) -> Result<usize, AstError> {
        match self.tree.child_with_role(invocation, Role::AnonymousBody) {
            Some(body) => Ok(self.buffer.index_of_char_backward(')', self.tree.start(body))?),
            None => Ok(self.tree.end(invocation) - 1),
        }
    }

    pub(crate) fn rebind_invocation(&mut self, invocation: NodeId) {
        let binding = self.environment().resolve_invocation(invocation);
        self.tree.set_binding(invocation, binding.map(Binding::Method));
    }

    fn insert_argument(&mut self, invocation: NodeId, index: usize, source: &str) -> Result<NodeId, AstError> {
        let source = source.trim();
        let arguments = self.tree.children_with_role(invocation, Role::Argument);
        let close = self.arguments_close(invocation)?;
        let position = self.insert_list_item(&arguments, index, close, source)?;
        let parsed = self.parse_lines(FragmentKind::Expression, position, position, source, &[source])?;
        let argument = self.attach(invocation, Role::Argument, index, parsed);
        self.rebind_invocation(invocation);
        debug!(%invocation, index, "added argument");
        self.shorten_type_names(argument)
    }

    fn delete_argument(&mut self, invocation: NodeId, index: usize) -> Result<(), AstError> {
        let arguments = self.tree.children_with_role(invocation, Role::Argument);
        if index >= arguments.len() {
            return Ok(());
        }
        self.remove_list_item(&arguments, index, ")")?;
        if let Some(method) = self.tree.binding(invocation).and_then(Binding::as_method).cloned() {
            if index < method.parameter_types().len() {
                let updated = SynthesizedMethod::copy_of(method.as_ref()).without_parameter(index);
                self.tree.set_binding(invocation, Some(Binding::Method(Rc::new(updated))));
            }
        }
        debug!(%invocation, index, "removed argument");
        Ok(())
    }

    fn rewrite_arguments(&mut self, invocation: NodeId, lines: &[impl AsRef<str>]) -> Result<(), AstError> {
        let statement = self
            .statement_of(invocation)
            .ok_or_else(|| AstError::assertion(format!("{invocation} is not inside a statement")))?;
        let indent = self.indent_at(self.tree.start(statement));
        let eol = self.config().eol.clone();
        let source = indented_source(lines, &indent, &self.config().indent, &eol);
        let source = source.trim();

        let head = [Role::Name, Role::Type]
            .iter()
            .find_map(|role| self.tree.child_with_role(invocation, *role))
            .map_or(self.tree.start(invocation), |n| self.tree.start(n));
        let begin = self.buffer.index_of("(", head)? + 1;
        let end = self.arguments_close(invocation)?;
        for argument in self.tree.children_with_role(invocation, Role::Argument) {
            self.tree.detach(argument);
        }
        self.replace_text(begin, end - begin, source)?;

        // the new arguments come from parsing the whole call again
        let start = self.tree.start(invocation);
        let call = self.node_source(invocation).to_string();
        let parsed = self.parse_lines(FragmentKind::Expression, start, start, &call, lines)?;
        let arguments_end = begin + source.len();
        for (index, argument) in self.tree.children_with_role(parsed.node, Role::Argument).into_iter().enumerate() {
            self.tree.detach(argument);
            self.tree.insert_child_in_role(invocation, Role::Argument, index, argument);
        }
        for comment in parsed.comments {
            let start = self.tree.start(comment);
            if start >= begin && start < arguments_end {
                self.tree.register_comment(comment);
            }
        }
        self.rebind_invocation(invocation);
        debug!(%invocation, "replaced arguments");
        self.shorten_type_names(invocation)?;
        Ok(())
    }

    fn prepend_receiver(&mut self, invocation: NodeId, source: &str) -> Result<NodeId, AstError> {
        let position = self.tree.start(invocation);
        let parsed = self.parse_fragment(FragmentKind::Expression, position, position, source)?;
        let inserted = format!("{source}.");
        self.replace_text(position, 0, &inserted)?;

        // the call and the nodes it begins now start at the receiver
        let shifted = position + inserted.len();
        let mut node = Some(invocation);
        while let Some(id) = node {
            if self.tree.start(id) != shifted {
                break;
            }
            self.tree.set_start_keep_end(id, position);
            node = self.tree.parent(id);
        }
        let receiver = parsed.node;
        self.tree.node_mut(receiver).role = Role::Expression;
        self.tree.insert_child(invocation, 0, receiver);
        for comment in parsed.comments {
            self.tree.register_comment(comment);
        }
        self.shorten_type_names(receiver)
    }
}
