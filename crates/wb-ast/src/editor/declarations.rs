//! Members of type bodies and the parts of their signatures.

use crate::binding::{Binding, SynthesizedMethod, SynthesizedType};
use crate::context::CompilationContext;
use crate::error::AstError;
use crate::node::{NodeId, NodeKind, Role};
use crate::parser::FragmentKind;
use crate::scope::declaration_name;
use crate::target::{is_type_body, BodyDeclarationTarget};
use java_surgeon_core::format::indented_source;
use java_surgeon_core::scan;
use java_surgeon_lang::java;
use std::rc::Rc;
use tracing::debug;

/// Roles that precede super interfaces in a type declaration.
const TYPE_HEADER: &[Role] = &[
    Role::Javadoc,
    Role::Modifiers,
    Role::Name,
    Role::TypeParameters,
    Role::Superclass,
    Role::SuperInterface,
];

/// Roles that precede thrown exceptions in a method declaration.
const METHOD_HEADER: &[Role] = &[
    Role::Javadoc,
    Role::Modifiers,
    Role::TypeParameters,
    Role::ReturnType,
    Role::Name,
    Role::Parameter,
    Role::ThrownException,
];

impl CompilationContext {
    /// Insert the member written as `lines` at `target`. Returns the new
    /// declaration.
    pub fn add_body_declaration(
        &mut self,
        lines: &[impl AsRef<str>],
        target: BodyDeclarationTarget,
    ) -> Result<NodeId, AstError> {
        self.transaction("add_body_declaration", |context| context.insert_body_declaration(lines, target))
    }

    pub fn add_field_declaration(
        &mut self,
        lines: &[impl AsRef<str>],
        target: BodyDeclarationTarget,
    ) -> Result<NodeId, AstError> {
        self.transaction("add_field_declaration", |context| {
            let field = context.insert_body_declaration(lines, target)?;
            context.expect_kind(field, |kind| kind == NodeKind::FieldDeclaration, "a field")
        })
    }

    /// Insert a method built from `annotations`, a `header` such as
    /// `public void foo(int a)` and, unless `body` is `None`, a body whose
    /// lines are indented one level.
    pub fn add_method_declaration(
        &mut self,
        annotations: &[&str],
        header: &str,
        body: Option<&[&str]>,
        target: BodyDeclarationTarget,
    ) -> Result<NodeId, AstError> {
        let single_indent = self.config().indent.clone();
        let mut lines: Vec<String> = annotations.iter().map(|a| a.to_string()).collect();
        match body {
            Some(body) => {
                lines.push(format!("{header} {{"));
                lines.extend(body.iter().map(|line| format!("{single_indent}{line}")));
                lines.push("}".to_string());
            }
            None => lines.push(header.to_string()),
        }
        self.transaction("add_method_declaration", |context| {
            let method = context.insert_body_declaration(&lines, target)?;
            context.expect_kind(method, |kind| kind == NodeKind::MethodDeclaration, "a method")
        })
    }

    /// Insert an abstract method declaration, `header;`.
    pub fn add_interface_method_declaration(
        &mut self,
        header: &str,
        target: BodyDeclarationTarget,
    ) -> Result<NodeId, AstError> {
        self.add_method_declaration(&[], &format!("{header};"), None, target)
    }

    pub fn add_type_declaration(
        &mut self,
        lines: &[impl AsRef<str>],
        target: BodyDeclarationTarget,
    ) -> Result<NodeId, AstError> {
        self.transaction("add_type_declaration", |context| {
            let declaration = context.insert_body_declaration(lines, target)?;
            context.expect_kind(declaration, NodeKind::is_type_declaration, "a type")
        })
    }

    /// Delete a member of a type body with its trailing comment.
    pub fn remove_body_declaration(&mut self, declaration: NodeId) -> Result<(), AstError> {
        self.transaction("remove_body_declaration", |context| context.delete_body_declaration(declaration))
    }

    /// Delete one declared variable. The last variable of a field or of a
    /// local declaration takes the whole declaration with it.
    pub fn remove_variable_declaration(&mut self, fragment: NodeId) -> Result<(), AstError> {
        self.transaction("remove_variable_declaration", |context| {
            let parent = context
                .tree
                .parent(fragment)
                .ok_or_else(|| AstError::assertion(format!("{fragment} is not part of the unit")))?;
            let fragments = context.tree.children_with_role(parent, Role::Fragment);
            let index = fragments
                .iter()
                .position(|f| *f == fragment)
                .ok_or_else(|| AstError::assertion(format!("{fragment} is not a declared variable")))?;
            match context.tree.kind(parent) {
                NodeKind::FieldDeclaration if fragments.len() == 1 => context.delete_body_declaration(parent),
                NodeKind::VariableDeclarationStatement if fragments.len() == 1 => context.delete_statement(parent),
                NodeKind::FieldDeclaration | NodeKind::VariableDeclarationStatement => {
                    context.remove_list_item(&fragments, index, ";")
                }
                kind => Err(AstError::assertion(format!("Can not remove variable from {kind:?}"))),
            }
        })
    }

    /// Source of the parameters of `method`, separated by `, `.
    pub fn parameters_source(&self, method: NodeId) -> String {
        self.tree
            .children_with_role(method, Role::Parameter)
            .into_iter()
            .map(|p| self.node_source(p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn parameter_names(&self, method: NodeId) -> Vec<String> {
        self.tree
            .children_with_role(method, Role::Parameter)
            .into_iter()
            .filter_map(|p| declaration_name(&self.tree, self.text(), p))
            .map(str::to_string)
            .collect()
    }

    pub fn replace_method_name(&mut self, method: NodeId, name: &str) -> Result<(), AstError> {
        self.transaction("replace_method_name", |context| {
            let name_node = context
                .tree
                .child_with_role(method, Role::Name)
                .ok_or_else(|| AstError::assertion(format!("{method} has no name")))?;
            context.set_identifier(name_node, name)?;
            context.rebind_declaring_type(method);
            Ok(())
        })
    }

    /// Replace the return type of `method`. Returns the new type node.
    pub fn replace_method_type(&mut self, method: NodeId, type_name: &str) -> Result<NodeId, AstError> {
        self.transaction("replace_method_type", |context| {
            let old = context
                .tree
                .child_with_role(method, Role::ReturnType)
                .ok_or_else(|| AstError::assertion(format!("{method} has no return type")))?;
            let type_node = context.replace_type_node(old, type_name)?;
            context.rebind_declaring_type(method);
            Ok(type_node)
        })
    }

    /// Replace the type of the field or local declaration `fragment` belongs
    /// to. Returns the new type node.
    pub fn replace_variable_type(&mut self, fragment: NodeId, type_name: &str) -> Result<NodeId, AstError> {
        self.transaction("replace_variable_type", |context| {
            let declaration = context
                .tree
                .parent(fragment)
                .filter(|p| {
                    matches!(
                        context.tree.kind(*p),
                        NodeKind::FieldDeclaration | NodeKind::VariableDeclarationStatement
                    )
                })
                .ok_or_else(|| AstError::assertion(format!("{fragment} is not a field or local variable")))?;
            let old = context
                .tree
                .child_with_role(declaration, Role::Type)
                .ok_or_else(|| AstError::assertion(format!("{declaration} has no type")))?;
            let type_node = context.replace_type_node(old, type_name)?;
            context.rebind(declaration);
            Ok(type_node)
        })
    }

    /// Make `type_declaration` implement `interface` unless it already is a
    /// subtype of it. Returns whether the declaration changed.
    pub fn ensure_interface_implementation(&mut self, type_declaration: NodeId, interface: &str) -> Result<bool, AstError> {
        let interface: String = interface.chars().filter(|c| !c.is_whitespace()).collect();
        self.transaction("ensure_interface_implementation", |context| {
            context.implement_interface(type_declaration, &interface)
        })
    }

    /// Declare `exception` in the `throws` clause of `method` unless a
    /// declared exception already covers it.
    pub fn ensure_thrown_exception(&mut self, method: NodeId, exception: &str) -> Result<(), AstError> {
        let exception: String = exception.chars().filter(|c| !c.is_whitespace()).collect();
        self.transaction("ensure_thrown_exception", |context| context.declare_exception(method, &exception))
    }

    fn expect_kind(
        &self,
        id: NodeId,
        predicate: impl Fn(NodeKind) -> bool,
        expected: &str,
    ) -> Result<NodeId, AstError> {
        if predicate(self.tree.kind(id)) {
            Ok(id)
        } else {
            Err(AstError::assertion(format!("{} is not {expected}", self.node_source(id))))
        }
    }

    /// Position just inside the body brace of a type.
    fn body_open(&self, owner: NodeId) -> Result<usize, AstError> {
        let from = match self.tree.kind(owner) {
            NodeKind::AnonymousClassDeclaration => self.tree.start(owner),
            _ => self
                .tree
                .child_with_role(owner, Role::Name)
                .map_or(self.tree.start(owner), |name| self.tree.start(name)),
        };
        Ok(self.buffer.index_of("{", from)? + 1)
    }

    /// Start of the member list: inside the body brace, or past the `;` that
    /// ends the constants of an enum. `None` for an enum without that `;`.
    fn members_start(&self, owner: NodeId) -> Result<Option<usize>, AstError> {
        let open = self.body_open(owner)?;
        if self.tree.kind(owner) != NodeKind::EnumDeclaration {
            return Ok(Some(open));
        }
        let (_, after) = self.enum_constants_end(owner, open);
        Ok(self.text()[after..].starts_with(';').then_some(after + 1))
    }

    /// End of the last enum constant, and the first non-blank position after
    /// it and an optional trailing comma.
    fn enum_constants_end(&self, owner: NodeId, open: usize) -> (usize, usize) {
        let text = self.text();
        let mut end = self
            .tree
            .children_with_role(owner, Role::EnumConstant)
            .last()
            .map_or(open, |constant| self.tree.end(*constant));
        let mut after = scan::index_of_any_but(text, " \t\r\n", end).unwrap_or(text.len());
        if text[after..].starts_with(',') {
            end = after + 1;
            after = scan::index_of_any_but(text, " \t\r\n", end).unwrap_or(text.len());
        }
        (end, after)
    }

    /// Like `members_start`, writing the `;` after enum constants when it is
    /// missing.
    fn ensure_members_start(&mut self, owner: NodeId) -> Result<usize, AstError> {
        if let Some(start) = self.members_start(owner)? {
            return Ok(start);
        }
        let open = self.body_open(owner)?;
        let (end, _) = self.enum_constants_end(owner, open);
        self.replace_text(end, 0, ";")?;
        Ok(end + 1)
    }

    pub(crate) fn insert_body_declaration(
        &mut self,
        lines: &[impl AsRef<str>],
        target: BodyDeclarationTarget,
    ) -> Result<NodeId, AstError> {
        let eol = self.config().eol.clone();
        let single_indent = self.config().indent.clone();
        let owner = target.owner(&self.tree)?;
        let declaration = match target {
            BodyDeclarationTarget::Before(sibling) | BodyDeclarationTarget::After(sibling) => {
                let indent = self.indent_at(self.tree.start(sibling));
                let index = self.tree.index_in_role(sibling).unwrap_or(0);
                let source = indented_source(lines, &indent, &single_indent, &eol);
                if matches!(target, BodyDeclarationTarget::Before(_)) {
                    let position = scan::skip_whitespace_and_pure_eolc_to_left(self.text(), self.tree.start(sibling));
                    let source = format!("{source}{eol}");
                    let parsed = self.parse_lines(FragmentKind::BodyDeclaration, position, position, &source, lines)?;
                    self.replace_text(position, 0, &source)?;
                    self.attach(owner, Role::BodyDeclaration, index, parsed)
                } else {
                    let position = scan::skip_whitespace_eolc_to_right(self.text(), self.tree.end(sibling));
                    let source = format!("{eol}{source}");
                    let parsed = self.parse_lines(FragmentKind::BodyDeclaration, position, position, &source, lines)?;
                    self.replace_text(position, 0, &source)?;
                    self.attach(owner, Role::BodyDeclaration, index + 1, parsed)
                }
            }
            BodyDeclarationTarget::First(_) | BodyDeclarationTarget::Last(_) => {
                self.strip_dangling_javadoc()?;
                let indent_node = match self.tree.kind(owner) {
                    NodeKind::AnonymousClassDeclaration => self.statement_of(owner).unwrap_or(owner),
                    _ => owner,
                };
                let indent = self.indent_at(self.tree.start(indent_node)) + &single_indent;
                let source = indented_source(lines, &indent, &single_indent, &eol);
                let members_start = self.ensure_members_start(owner)?;
                if matches!(target, BodyDeclarationTarget::First(_)) {
                    let position = members_start;
                    let source = format!("{eol}{source}");
                    let parsed = self.parse_lines(FragmentKind::BodyDeclaration, position, position, &source, lines)?;
                    self.replace_text(position, 0, &source)?;
                    self.attach(owner, Role::BodyDeclaration, 0, parsed)
                } else {
                    let close = self.tree.end(owner) - 1;
                    let position = close - self.indent_at(close).len();
                    let source = format!("{source}{eol}");
                    let parsed = self.parse_lines(FragmentKind::BodyDeclaration, position, position, &source, lines)?;
                    self.replace_text(position, 0, &source)?;
                    self.attach(owner, Role::BodyDeclaration, usize::MAX, parsed)
                }
            }
        };
        self.rebind_owner(owner);
        debug!(%declaration, ?target, "added body declaration");
        self.shorten_type_names(declaration)
    }

    pub(crate) fn delete_body_declaration(&mut self, declaration: NodeId) -> Result<(), AstError> {
        let owner = self
            .tree
            .parent(declaration)
            .filter(|p| is_type_body(self.tree.kind(*p)))
            .ok_or_else(|| AstError::assertion(format!("{declaration} is not a member of a type")))?;
        let members = self.tree.children_with_role(owner, Role::BodyDeclaration);
        let index = members.iter().position(|m| *m == declaration).unwrap_or(0);
        let start = match index {
            0 => match self.members_start(owner)? {
                Some(start) => start,
                None => self.body_open(owner)?,
            },
            _ => scan::skip_whitespace_eolc_to_right(self.text(), self.tree.end(members[index - 1])),
        };
        let end = scan::skip_whitespace_eolc_to_right(self.text(), self.tree.end(declaration));
        self.tree.detach(declaration);
        self.replace_text(start, end - start, "")?;
        self.rebind_owner(owner);
        debug!(%declaration, start, end, "removed body declaration");
        Ok(())
    }

    /// Refresh the binding of a type whose members changed.
    fn rebind_owner(&mut self, owner: NodeId) {
        if self.tree.kind(owner).is_type_declaration() {
            self.rebind(owner);
        }
    }

    fn rebind_declaring_type(&mut self, member: NodeId) {
        match self.tree.parent(member) {
            Some(owner) if self.tree.kind(owner).is_type_declaration() => self.rebind(owner),
            _ => self.rebind(member),
        }
    }

    fn replace_type_node(&mut self, old: NodeId, type_name: &str) -> Result<NodeId, AstError> {
        let type_name = type_name.trim();
        let start = self.tree.start(old);
        let length = self.tree.length(old);
        let parsed = self.parse_fragment(FragmentKind::Type, start, start, type_name)?;
        self.replace_text(start, length, type_name)?;
        self.tree.replace_node(old, parsed.node);
        self.shorten_type_names(parsed.node)
    }

    fn implement_interface(&mut self, type_declaration: NodeId, interface: &str) -> Result<bool, AstError> {
        let kind = self.tree.kind(type_declaration);
        if !matches!(kind, NodeKind::TypeDeclaration | NodeKind::EnumDeclaration) {
            return Err(AstError::assertion(format!("{kind:?} can not implement interfaces")));
        }
        let interfaces = self.tree.children_with_role(type_declaration, Role::SuperInterface);
        {
            let environment = self.environment();
            if interfaces.iter().any(|i| environment.type_name_of(*i) == interface) {
                return Ok(false);
            }
            let declared = environment.qualified_name_of(type_declaration).map(str::to_string);
            if declared.is_some_and(|name| environment.is_subtype(&name, interface)) {
                return Ok(false);
            }
        }

        let (position, prefix) = match interfaces.last() {
            Some(last) => (self.tree.end(*last), ", "),
            None => {
                let anchor = [Role::Superclass, Role::TypeParameters, Role::Name]
                    .iter()
                    .find_map(|role| self.tree.child_with_role(type_declaration, *role))
                    .ok_or_else(|| AstError::assertion(format!("{type_declaration} has no name")))?;
                let keyword = match self.tree.node(type_declaration).grammar {
                    java::INTERFACE_DECLARATION => " extends ",
                    _ => " implements ",
                };
                (self.tree.end(anchor), keyword)
            }
        };
        let offset = position + prefix.len();
        let parsed = self.parse_fragment(FragmentKind::Type, position, offset, interface)?;
        self.replace_text(position, 0, &format!("{prefix}{interface}"))?;
        self.tree.node_mut(parsed.node).role = Role::SuperInterface;
        self.tree.insert_child_after_roles(type_declaration, TYPE_HEADER, parsed.node);

        if let Some(binding) = self.tree.binding(type_declaration).and_then(Binding::as_type).cloned() {
            let updated = SynthesizedType::copy_of(binding.as_ref()).with_interface(interface);
            self.tree.set_binding(type_declaration, Some(Binding::Type(Rc::new(updated))));
        }
        self.shorten_type_names(parsed.node)?;
        debug!(%type_declaration, interface, "added super interface");
        Ok(true)
    }

    fn declare_exception(&mut self, method: NodeId, exception: &str) -> Result<(), AstError> {
        if self.tree.kind(method) != NodeKind::MethodDeclaration {
            return Err(AstError::assertion(format!("{method} is not a method")));
        }
        let declared = self.tree.children_with_role(method, Role::ThrownException);
        {
            let environment = self.environment();
            if environment.lookup(exception).is_none() {
                return Err(AstError::assertion(format!("No such exception type: {exception}")));
            }
            if declared
                .iter()
                .any(|d| environment.is_subtype(exception, &environment.type_name_of(*d)))
            {
                return Ok(());
            }
        }

        let (position, prefix) = match declared.last() {
            Some(last) => (self.tree.end(*last), ", "),
            None => {
                let parameters = self.tree.children_with_role(method, Role::Parameter);
                let from = parameters
                    .last()
                    .copied()
                    .or_else(|| self.tree.child_with_role(method, Role::Name))
                    .map_or(self.tree.start(method), |n| self.tree.end(n));
                (self.buffer.index_of(")", from)? + 1, " throws ")
            }
        };
        let offset = position + prefix.len();
        let parsed = self.parse_fragment(FragmentKind::Type, position, offset, exception)?;
        self.replace_text(position, 0, &format!("{prefix}{exception}"))?;
        self.tree.node_mut(parsed.node).role = Role::ThrownException;
        self.tree.insert_child_after_roles(method, METHOD_HEADER, parsed.node);

        if let Some(binding) = self.tree.binding(method).and_then(Binding::as_method).cloned() {
            let updated = SynthesizedMethod::copy_of(binding.as_ref()).with_exception(exception);
            self.tree.set_binding(method, Some(Binding::Method(Rc::new(updated))));
        }
        self.shorten_type_names(parsed.node)?;
        debug!(%method, exception, "added thrown exception");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn find(context: &CompilationContext, kind: NodeKind, source: &str) -> NodeId {
        let tree = context.tree();
        tree.descendants(tree.root())
            .into_iter()
            .find(|id| tree.kind(*id) == kind && context.node_source(*id) == source)
            .unwrap()
    }

    fn find_kind(context: &CompilationContext, kind: NodeKind) -> NodeId {
        let tree = context.tree();
        tree.descendants(tree.root()).into_iter().find(|id| tree.kind(*id) == kind).unwrap()
    }

    #[test]
    fn test_add_members_at_type_ends() {
        let mut context = CompilationContext::new("class Test {\n  int a;\n}").unwrap();
        let class = context.primary_type().unwrap();
        let first = context.add_field_declaration(&["int first;"], BodyDeclarationTarget::First(class)).unwrap();
        let last = context.add_field_declaration(&["int last;"], BodyDeclarationTarget::Last(class)).unwrap();
        assert_eq!(context.text(), "class Test {\n  int first;\n  int a;\n  int last;\n}");
        assert_eq!(context.node_source(first), "int first;");
        assert_eq!(context.node_source(last), "int last;");
        let members = context.tree().children_with_role(class, Role::BodyDeclaration);
        assert_eq!(members, vec![first, members[1], last]);
    }

    #[test]
    fn test_add_members_around_member() {
        let mut context = CompilationContext::new("class Test {\n  int a; // note\n}").unwrap();
        let a = find_kind(&context, NodeKind::FieldDeclaration);
        context.add_field_declaration(&["int b;"], BodyDeclarationTarget::After(a)).unwrap();
        context.add_field_declaration(&["int z;"], BodyDeclarationTarget::Before(a)).unwrap();
        assert_eq!(context.text(), "class Test {\n  int z;\n  int a; // note\n  int b;\n}");
    }

    #[test]
    fn test_add_method_declaration() {
        let mut context = CompilationContext::new("class Test {\n}").unwrap();
        let class = context.primary_type().unwrap();
        let method = context
            .add_method_declaration(
                &["@Override"],
                "public String toString()",
                Some(&["return \"Test\";"]),
                BodyDeclarationTarget::Last(class),
            )
            .unwrap();
        assert_eq!(
            context.text(),
            "class Test {\n\t@Override\n\tpublic String toString() {\n\t\treturn \"Test\";\n\t}\n}"
        );
        assert_eq!(context.tree().kind(method), NodeKind::MethodDeclaration);
        assert_eq!(context.parameters_source(method), "");
    }

    #[test]
    fn test_add_interface_method() {
        let mut context = CompilationContext::new("interface Listener {\n}").unwrap();
        let interface = context.primary_type().unwrap();
        context
            .add_interface_method_declaration("void changed(int value)", BodyDeclarationTarget::Last(interface))
            .unwrap();
        assert_eq!(context.text(), "interface Listener {\n\tvoid changed(int value);\n}");
    }

    #[test]
    fn test_add_member_removes_dangling_javadoc() {
        let source = "class Test {\n  int a;\n  /** dangling */\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let class = context.primary_type().unwrap();
        context.add_field_declaration(&["int b;"], BodyDeclarationTarget::Last(class)).unwrap();
        assert_eq!(context.text(), "class Test {\n  int a;\n  int b;\n}");
    }

    #[test]
    fn test_wrong_declaration_kind() {
        let source = "class Test {\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let class = context.primary_type().unwrap();
        let err = context
            .add_field_declaration(&["void foo() {}"], BodyDeclarationTarget::Last(class))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Assertion);
        assert_eq!(context.text(), source);
    }

    #[test]
    fn test_remove_body_declarations() {
        let source = "class Test {\n  int a;\n  int b; // b\n  int c;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let b = find(&context, NodeKind::FieldDeclaration, "int b;");
        context.remove_body_declaration(b).unwrap();
        assert_eq!(context.text(), "class Test {\n  int a;\n  int c;\n}");
        let a = find(&context, NodeKind::FieldDeclaration, "int a;");
        context.remove_body_declaration(a).unwrap();
        assert_eq!(context.text(), "class Test {\n  int c;\n}");
    }

    #[test]
    fn test_enum_members_follow_constants() {
        let mut context = CompilationContext::new("enum E {\n  A, B;\n  int x;\n}").unwrap();
        let e = context.primary_type().unwrap();
        let x = find(&context, NodeKind::FieldDeclaration, "int x;");
        let y = context.add_field_declaration(&["int y;"], BodyDeclarationTarget::First(e)).unwrap();
        assert_eq!(context.text(), "enum E {\n  A, B;\n  int y;\n  int x;\n}");
        context.remove_body_declaration(y).unwrap();
        context.remove_body_declaration(x).unwrap();
        assert_eq!(context.text(), "enum E {\n  A, B;\n}");
        assert_eq!(context.tree().children_with_role(e, Role::EnumConstant).len(), 2);
    }

    #[test]
    fn test_enum_member_adds_missing_semicolon() {
        let mut context = CompilationContext::new("enum E {\n  A, B\n}").unwrap();
        let e = context.primary_type().unwrap();
        let y = context.add_field_declaration(&["int y;"], BodyDeclarationTarget::Last(e)).unwrap();
        assert_eq!(context.text(), "enum E {\n  A, B;\n  int y;\n}");
        assert_eq!(context.node_source(y), "int y;");
        context.add_field_declaration(&["int z;"], BodyDeclarationTarget::First(e)).unwrap();
        assert_eq!(context.text(), "enum E {\n  A, B;\n  int z;\n  int y;\n}");
    }

    #[test]
    fn test_remove_variable_declarations() {
        let source = "class Test {\n  int a, b, c;\n  int d;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let b = find(&context, NodeKind::VariableDeclarationFragment, "b");
        context.remove_variable_declaration(b).unwrap();
        assert_eq!(context.text(), "class Test {\n  int a, c;\n  int d;\n}");
        let a = find(&context, NodeKind::VariableDeclarationFragment, "a");
        context.remove_variable_declaration(a).unwrap();
        assert_eq!(context.text(), "class Test {\n  int c;\n  int d;\n}");
        let d = find(&context, NodeKind::VariableDeclarationFragment, "d");
        context.remove_variable_declaration(d).unwrap();
        assert_eq!(context.text(), "class Test {\n  int c;\n}");
    }

    #[test]
    fn test_remove_local_variable() {
        let source = "class Test {\n  void foo() {\n    int a = 1;\n    int b = 2;\n  }\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let a = find(&context, NodeKind::VariableDeclarationFragment, "a = 1");
        context.remove_variable_declaration(a).unwrap();
        assert_eq!(context.text(), "class Test {\n  void foo() {\n    int b = 2;\n  }\n}");
    }

    #[test]
    fn test_method_signature_queries() {
        let source = "class Test {\n  void foo(int a, String... names) {}\n}";
        let context = CompilationContext::new(source).unwrap();
        let method = find_kind(&context, NodeKind::MethodDeclaration);
        assert_eq!(context.parameters_source(method), "int a, String... names");
        assert_eq!(context.parameter_names(method), vec!["a", "names"]);
    }

    #[test]
    fn test_replace_method_name_and_type() {
        let source = "class Test {\n  void foo() {}\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let method = find_kind(&context, NodeKind::MethodDeclaration);
        context.replace_method_name(method, "bar").unwrap();
        let type_node = context.replace_method_type(method, "java.util.List").unwrap();
        assert_eq!(context.text(), "import java.util.List;\nclass Test {\n  List bar() {}\n}");
        assert_eq!(context.node_source(type_node), "List");
        let binding = context.tree().binding(method).unwrap().as_method().unwrap();
        assert_eq!(binding.name(), "bar");
        assert_eq!(binding.return_type(), "java.util.List");
    }

    #[test]
    fn test_replace_variable_type() {
        let source = "class Test {\n  int a = 0;\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let fragment = find_kind(&context, NodeKind::VariableDeclarationFragment);
        context.replace_variable_type(fragment, "long").unwrap();
        assert_eq!(context.text(), "class Test {\n  long a = 0;\n}");
        let name = context.tree().child_with_role(fragment, Role::Name).unwrap();
        let err = context.replace_variable_type(name, "long").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Assertion);
    }

    #[test]
    fn test_ensure_interface_implementation() {
        let source = "class Test extends Object {\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let class = context.primary_type().unwrap();
        assert!(context.ensure_interface_implementation(class, "java.io.Serializable").unwrap());
        assert!(context.ensure_interface_implementation(class, "java.lang.Runnable").unwrap());
        assert!(!context.ensure_interface_implementation(class, "java.lang.Runnable").unwrap());
        assert_eq!(
            context.text(),
            "import java.io.Serializable;\nclass Test extends Object implements Serializable, Runnable {\n}"
        );
        let binding = context.tree().binding(class).unwrap().as_type().unwrap();
        assert_eq!(binding.interfaces(), ["java.io.Serializable", "java.lang.Runnable"]);
    }

    #[test]
    fn test_interface_extends() {
        let mut context = CompilationContext::new("interface Listener {\n}").unwrap();
        let interface = context.primary_type().unwrap();
        context.ensure_interface_implementation(interface, "java.lang.Runnable").unwrap();
        assert_eq!(context.text(), "interface Listener extends Runnable {\n}");
    }

    #[test]
    fn test_ensure_thrown_exception() {
        let source = "class Test {\n  void foo(int a) {}\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let method = find_kind(&context, NodeKind::MethodDeclaration);
        context.ensure_thrown_exception(method, "java.lang.Exception").unwrap();
        // covered by the declared supertype
        context.ensure_thrown_exception(method, "java.io.IOException").unwrap();
        assert_eq!(context.text(), "class Test {\n  void foo(int a) throws Exception {}\n}");
        let binding = context.tree().binding(method).unwrap().as_method().unwrap();
        assert_eq!(binding.exception_types(), ["java.lang.Exception"]);

        let err = context.ensure_thrown_exception(method, "com.example.Missing").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Assertion);
    }

    #[test]
    fn test_thrown_exceptions_are_appended() {
        let source = "class Test {\n  void foo() throws java.io.IOException {}\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let method = find_kind(&context, NodeKind::MethodDeclaration);
        context.ensure_thrown_exception(method, "java.lang.InterruptedException").unwrap();
        assert_eq!(
            context.text(),
            "class Test {\n  void foo() throws java.io.IOException, InterruptedException {}\n}"
        );
    }
}
