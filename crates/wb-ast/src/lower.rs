//! Lowering of tree-sitter parse trees into the AST arena.
//!
//! The arena follows the shape of the Java language model rather than the
//! grammar: argument lists, parameter lists, `throws` and `implements`
//! clauses are flattened into role-tagged children, a Javadoc preceding a
//! declaration becomes that declaration's first child, and every other
//! comment goes to the comment list instead of the tree.

use crate::comments::parse_javadoc;
use crate::node::{NodeData, NodeId, NodeKind, Role};
use crate::tree::AstTree;
use java_surgeon_lang::java;
use tree_sitter::Node;

pub(crate) struct Lowerer<'a> {
    tree: &'a mut AstTree,
    source: &'a str,
    /// Added to tree-sitter byte offsets to get buffer offsets.
    shift: isize,
    comments: Vec<NodeId>,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(tree: &'a mut AstTree, source: &'a str, shift: isize) -> Self {
        Self {
            tree,
            source,
            shift,
            comments: Vec::new(),
        }
    }

    /// Comment nodes created so far, in source order.
    pub(crate) fn into_comments(self) -> Vec<NodeId> {
        self.comments
    }

    /// Lower a whole `program` into the children of the tree root.
    pub(crate) fn lower_program(&mut self, program: Node) {
        let root = self.tree.root();
        self.lower_members(program, root, true);
    }

    /// Lower one node that is not attached anywhere yet.
    pub(crate) fn lower_detached(&mut self, node: Node, role: Role) -> Option<NodeId> {
        if role == Role::Statement {
            self.statement(node, role)
        } else {
            self.lower(node, role)
        }
    }

    /// Lower a type member, with the Javadoc comment that precedes it.
    pub(crate) fn lower_member(&mut self, node: Node, javadoc: Option<Node>) -> Option<NodeId> {
        let id = if node.kind() == java::BLOCK || node.kind() == java::STATIC_INITIALIZER {
            self.initializer(node)
        } else {
            self.lower(node, Role::BodyDeclaration)?
        };
        self.tree.node_mut(id).role = Role::BodyDeclaration;
        if let Some(javadoc) = javadoc {
            let comment = self.comment(javadoc);
            if self.tree.kind(comment) == NodeKind::Javadoc {
                self.attach_javadoc(id, comment);
            }
        }
        Some(id)
    }

    /// Lower a stand-alone comment.
    pub(crate) fn lower_comment(&mut self, node: Node) -> NodeId {
        self.comment(node)
    }

    fn pos(&self, byte: usize) -> usize {
        (byte as isize + self.shift).max(0) as usize
    }

    fn make(&mut self, node: Node, kind: NodeKind, role: Role) -> NodeId {
        let start = self.pos(node.start_byte());
        let end = self.pos(node.end_byte());
        self.tree
            .alloc(NodeData::new(kind, node.kind(), role, start, end - start))
    }

    fn make_span(&mut self, kind: NodeKind, role: Role, start: usize, end: usize) -> NodeId {
        self.tree.alloc(NodeData::new(
            kind,
            "synthetic",
            role,
            self.pos(start),
            end.saturating_sub(start),
        ))
    }

    fn attach(&mut self, parent: NodeId, child: Option<NodeId>) {
        if let Some(child) = child {
            self.tree.push_child(parent, child);
        }
    }

    fn text(&self, node: Node) -> &'a str {
        let source: &'a str = self.source;
        source.get(node.start_byte()..node.end_byte()).unwrap_or("")
    }

    // ── comments ───────────────────────────────────────────────────────

    fn comment(&mut self, node: Node) -> NodeId {
        let text = self.text(node);
        let id = if node.kind() == java::LINE_COMMENT {
            self.make(node, NodeKind::LineComment, Role::Other)
        } else if text.starts_with("/**") && text != "/**/" {
            self.javadoc(node)
        } else {
            self.make(node, NodeKind::BlockComment, Role::Other)
        };
        self.comments.push(id);
        id
    }

    fn javadoc(&mut self, node: Node) -> NodeId {
        let id = self.make(node, NodeKind::Javadoc, Role::Other);
        let base = node.start_byte();
        for span in parse_javadoc(self.text(node)) {
            let tag = self.make_span(NodeKind::TagElement, Role::Tag, base + span.start, base + span.end);
            for (start, end) in span.fragments {
                let fragment = self.make_span(NodeKind::TextElement, Role::TagFragment, base + start, base + end);
                self.tree.push_child(tag, fragment);
            }
            self.tree.push_child(id, tag);
        }
        id
    }

    // ── declarations ───────────────────────────────────────────────────

    /// Lower the members of a program or type body into `owner`, attaching
    /// a Javadoc to the declaration that directly follows it.
    fn lower_members(&mut self, container: Node, owner: NodeId, top_level: bool) {
        let mut pending_javadoc: Option<NodeId> = None;
        let mut cursor = container.walk();
        let children: Vec<Node> = container.children(&mut cursor).collect();
        for child in children {
            let kind = child.kind();
            if java::is_comment(kind) {
                let id = self.comment(child);
                pending_javadoc = (self.tree.kind(id) == NodeKind::Javadoc).then_some(id);
                continue;
            }
            if !child.is_named() {
                continue;
            }
            if kind == java::ENUM_BODY_DECLARATIONS {
                self.lower_members(child, owner, false);
                pending_javadoc = None;
                continue;
            }
            let role = match kind {
                java::PACKAGE_DECLARATION => Role::Package,
                java::IMPORT_DECLARATION => Role::Import,
                java::ENUM_CONSTANT => Role::EnumConstant,
                _ if top_level && java::is_type_declaration(kind) => Role::TypeDeclaration,
                _ if java::is_body_declaration(kind) || kind == "compact_constructor_declaration" => {
                    Role::BodyDeclaration
                }
                _ => Role::Other,
            };
            let lowered = if kind == java::BLOCK || kind == java::STATIC_INITIALIZER {
                Some(self.initializer(child))
            } else {
                self.lower(child, role)
            };
            if let Some(id) = lowered {
                self.tree.node_mut(id).role = role;
                if let Some(javadoc) = pending_javadoc.take() {
                    self.attach_javadoc(id, javadoc);
                }
                self.tree.push_child(owner, id);
            }
        }
    }

    fn attach_javadoc(&mut self, declaration: NodeId, javadoc: NodeId) {
        self.tree.node_mut(javadoc).role = Role::Javadoc;
        self.tree.insert_child(declaration, 0, javadoc);
        let start = self.tree.start(javadoc);
        self.tree.set_start_keep_end(declaration, start);
    }

    fn initializer(&mut self, node: Node) -> NodeId {
        let id = self.make(node, NodeKind::Initializer, Role::BodyDeclaration);
        if node.kind() == java::BLOCK {
            let block = self.block(node, Role::Body);
            self.tree.push_child(id, block);
        } else {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            for child in children {
                if java::is_comment(child.kind()) {
                    self.comment(child);
                } else if child.kind() == java::BLOCK {
                    let block = self.block(child, Role::Body);
                    self.tree.push_child(id, block);
                }
            }
        }
        id
    }

    fn block(&mut self, node: Node, role: Role) -> NodeId {
        let id = self.make(node, NodeKind::Block, role);
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            if java::is_comment(child.kind()) {
                self.comment(child);
            } else if child.kind() == ";" {
                let empty = self.make(child, NodeKind::EmptyStatement, Role::Statement);
                self.tree.push_child(id, empty);
            } else if child.is_named() {
                let statement = self.statement(child, Role::Statement);
                self.attach(id, statement);
            }
        }
        id
    }

    fn statement(&mut self, node: Node, role: Role) -> Option<NodeId> {
        if java::is_type_declaration(node.kind()) {
            let id = self.make(node, NodeKind::TypeDeclarationStatement, role);
            let declaration = self.lower(node, Role::Body);
            self.attach(id, declaration);
            return Some(id);
        }
        self.lower(node, role)
    }

    fn enhanced_for(&mut self, node: Node, role: Role) -> NodeId {
        let id = self.make(node, NodeKind::EnhancedForStatement, role);
        let type_node = node.child_by_field_name("type");
        let name_node = node.child_by_field_name("name");
        if let (Some(type_node), Some(name_node)) = (type_node, name_node) {
            let start = node
                .named_child(0)
                .filter(|c| c.kind() == java::MODIFIERS)
                .map_or(type_node.start_byte(), |m| m.start_byte());
            let parameter = self.make_span(
                NodeKind::SingleVariableDeclaration,
                Role::Parameter,
                start,
                name_node.end_byte(),
            );
            let type_id = self.lower(type_node, Role::Type);
            self.attach(parameter, type_id);
            let name = self.lower(name_node, Role::Name);
            self.attach(parameter, name);
            self.tree.push_child(id, parameter);
        }
        if let Some(value) = node.child_by_field_name("value") {
            let value = self.lower(value, Role::Expression);
            self.attach(id, value);
        }
        if let Some(body) = node.child_by_field_name("body") {
            let body = self.statement(body, Role::Body);
            self.attach(id, body);
        }
        id
    }

    // ── generic lowering ───────────────────────────────────────────────

    fn lower(&mut self, node: Node, role: Role) -> Option<NodeId> {
        let kind = node.kind();
        if java::is_comment(kind) {
            self.comment(node);
            return None;
        }
        match kind {
            java::BLOCK | java::CONSTRUCTOR_BODY => return Some(self.block(node, role)),
            "enhanced_for_statement" => return Some(self.enhanced_for(node, role)),
            "field_access" if is_plain_name(node) => return Some(self.qualified_name(node, role)),
            java::SCOPED_IDENTIFIER => return Some(self.qualified_name(node, role)),
            java::SCOPED_TYPE_IDENTIFIER if is_plain_name(node) => {
                return Some(self.qualified_name(node, role))
            }
            _ => {}
        }

        let node_kind = match kind {
            "local_variable_declaration" if role == Role::Init => NodeKind::VariableDeclarationExpression,
            java::SCOPED_TYPE_IDENTIFIER => NodeKind::Other,
            _ => kind_of(kind),
        };
        let id = self.make(node, node_kind, role);
        if matches!(
            node_kind,
            NodeKind::Literal | NodeKind::SimpleName | NodeKind::SimpleType | NodeKind::PrimitiveType
        ) {
            return Some(id);
        }

        let mut cursor = node.walk();
        let mut children = Vec::new();
        if cursor.goto_first_child() {
            loop {
                children.push((cursor.field_name(), cursor.node()));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        for (field, child) in children {
            let child_kind = child.kind();
            if java::is_comment(child_kind) {
                self.comment(child);
                continue;
            }
            if child_kind == ";" && matches!(field, Some("consequence" | "alternative" | "body")) {
                let empty = self.make(child, NodeKind::EmptyStatement, field_role(field));
                self.tree.push_child(id, empty);
                continue;
            }
            if !child.is_named() {
                continue;
            }
            match child_kind {
                "dimensions" | "permits" => {}
                java::ARGUMENT_LIST => self.flatten(child, id, Role::Argument),
                "type_arguments" => self.flatten(child, id, Role::TypeArgument),
                java::FORMAL_PARAMETERS => self.flatten(child, id, Role::Parameter),
                java::THROWS => self.flatten(child, id, Role::ThrownException),
                java::SUPERCLASS => self.flatten(child, id, Role::Superclass),
                "catch_type" => self.flatten(child, id, Role::Type),
                java::SUPER_INTERFACES | java::EXTENDS_INTERFACES => {
                    let mut cursor = child.walk();
                    let lists: Vec<Node> = child.named_children(&mut cursor).collect();
                    for list in lists {
                        if list.kind() == java::TYPE_LIST {
                            self.flatten(list, id, Role::SuperInterface);
                        }
                    }
                }
                java::CLASS_BODY | java::INTERFACE_BODY | java::ENUM_BODY | "annotation_type_body" => {
                    if matches!(node_kind, NodeKind::TypeDeclaration | NodeKind::EnumDeclaration) {
                        self.lower_members(child, id, false);
                    } else {
                        let anonymous = self.make(child, NodeKind::AnonymousClassDeclaration, Role::AnonymousBody);
                        self.lower_members(child, anonymous, false);
                        self.tree.push_child(id, anonymous);
                    }
                }
                "finally_clause" => {
                    let mut cursor = child.walk();
                    let block = child.named_children(&mut cursor).find(|c| c.kind() == java::BLOCK);
                    if let Some(block) = block {
                        let block = self.block(block, Role::Finally);
                        self.tree.push_child(id, block);
                    }
                }
                "parenthesized_expression"
                    if field == Some("condition")
                        && matches!(
                            node_kind,
                            NodeKind::IfStatement | NodeKind::WhileStatement | NodeKind::DoStatement
                        ) =>
                {
                    // the condition of if / while / do is the inner expression
                    let inner = child.named_child(0).filter(|c| !java::is_comment(c.kind()));
                    let lowered = match inner {
                        Some(inner) => self.lower(inner, Role::Condition),
                        None => self.lower(child, Role::Condition),
                    };
                    self.attach(id, lowered);
                }
                _ => {
                    let child_role = child_role(node_kind, field, child_kind);
                    let lowered = if child_role == Role::Statement
                        || matches!(child_role, Role::Then | Role::Else)
                        || (child_role == Role::Body && java::is_statement(child_kind))
                    {
                        self.statement(child, child_role)
                    } else {
                        self.lower(child, child_role)
                    };
                    self.attach(id, lowered);
                }
            }
        }
        Some(id)
    }

    /// Lower the named children of a list node straight into `parent`.
    fn flatten(&mut self, list: Node, parent: NodeId, role: Role) {
        let mut cursor = list.walk();
        let children: Vec<Node> = list.children(&mut cursor).collect();
        for child in children {
            if java::is_comment(child.kind()) {
                self.comment(child);
            } else if child.is_named() {
                let role = if role == Role::Parameter && child.kind() == "receiver_parameter" {
                    Role::Other
                } else {
                    role
                };
                let lowered = self.lower(child, role);
                self.attach(parent, lowered);
            }
        }
    }

    /// `a.b.c` as nested qualified names over simple names.
    fn qualified_name(&mut self, node: Node, role: Role) -> NodeId {
        let mut cursor = node.walk();
        let parts: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| !java::is_comment(c.kind()))
            .collect();
        let id = self.make(node, NodeKind::QualifiedName, role);
        if let [qualifier @ .., name] = parts.as_slice() {
            if let Some(qualifier) = qualifier.first() {
                let qualifier_id = if qualifier.kind() == java::IDENTIFIER || qualifier.kind() == java::TYPE_IDENTIFIER {
                    self.make(*qualifier, NodeKind::SimpleName, Role::Qualifier)
                } else {
                    self.qualified_name(*qualifier, Role::Qualifier)
                };
                self.tree.push_child(id, qualifier_id);
            }
            let name_id = self.make(*name, NodeKind::SimpleName, Role::Name);
            self.tree.push_child(id, name_id);
        }
        id
    }
}

/// True for dotted chains of plain identifiers.
fn is_plain_name(node: Node) -> bool {
    let mut cursor = node.walk();
    let parts: Vec<Node> = node.named_children(&mut cursor).collect();
    !parts.is_empty()
        && parts.iter().all(|part| match part.kind() {
            java::IDENTIFIER | java::TYPE_IDENTIFIER => true,
            "field_access" | java::SCOPED_IDENTIFIER | java::SCOPED_TYPE_IDENTIFIER => is_plain_name(*part),
            _ => false,
        })
}

fn child_role(parent: NodeKind, field: Option<&str>, child_kind: &str) -> Role {
    match (parent, field) {
        (NodeKind::MethodDeclaration, Some("type")) => Role::ReturnType,
        (NodeKind::VariableDeclarationFragment, Some("value")) => Role::Initializer,
        (NodeKind::ArrayCreation, Some("value")) => Role::Initializer,
        (NodeKind::InstanceofExpression, Some("right")) => Role::Type,
        (NodeKind::ArrayInitializer, _) => Role::Element,
        (NodeKind::TypeLiteral, _) | (NodeKind::ArrayType, Some("element")) => Role::Type,
        (NodeKind::ParameterizedType, None) => Role::Type,
        (NodeKind::TryStatement, None) if child_kind == "catch_clause" => Role::Catch,
        (NodeKind::CatchClause, None) if child_kind == "catch_formal_parameter" => Role::Parameter,
        (NodeKind::FieldDeclaration, Some("declarator"))
        | (NodeKind::VariableDeclarationStatement, Some("declarator"))
        | (NodeKind::VariableDeclarationExpression, Some("declarator")) => Role::Fragment,
        (NodeKind::SingleVariableDeclaration, None) if child_kind == java::VARIABLE_DECLARATOR => Role::Fragment,
        (NodeKind::SingleVariableDeclaration, None) if java::is_type(child_kind) => Role::Type,
        (NodeKind::ExpressionStatement, _)
        | (NodeKind::ReturnStatement, _)
        | (NodeKind::ThrowStatement, _)
        | (NodeKind::SynchronizedStatement, None)
        | (NodeKind::ParenthesizedExpression, _) => Role::Expression,
        (NodeKind::LabeledStatement, None) if child_kind != java::IDENTIFIER => Role::Body,
        (NodeKind::BreakStatement, _) | (NodeKind::ContinueStatement, _) | (NodeKind::LabeledStatement, _) => {
            Role::Label
        }
        (NodeKind::UnaryExpression, _) => Role::Operand,
        (_, None) if child_kind == java::MODIFIERS => Role::Modifiers,
        (_, Some("type_parameters")) => Role::TypeParameters,
        _ => field_role(field),
    }
}

fn field_role(field: Option<&str>) -> Role {
    match field {
        Some("name") => Role::Name,
        Some("type") => Role::Type,
        Some("body") => Role::Body,
        Some("condition") => Role::Condition,
        Some("consequence") => Role::Then,
        Some("alternative") => Role::Else,
        Some("object") | Some("array") | Some("value") => Role::Expression,
        Some("left") | Some("right") | Some("operand") | Some("index") => Role::Operand,
        Some("init") => Role::Init,
        Some("update") => Role::Update,
        Some("field") => Role::Name,
        _ => Role::Other,
    }
}

pub(crate) fn kind_of(grammar: &str) -> NodeKind {
    use NodeKind::*;
    match grammar {
        java::PROGRAM => CompilationUnit,
        java::PACKAGE_DECLARATION => PackageDeclaration,
        java::IMPORT_DECLARATION => ImportDeclaration,
        java::ENUM_DECLARATION => EnumDeclaration,
        k if java::is_type_declaration(k) => TypeDeclaration,
        java::ENUM_CONSTANT => EnumConstant,
        java::FIELD_DECLARATION | java::CONSTANT_DECLARATION => FieldDeclaration,
        java::METHOD_DECLARATION | java::CONSTRUCTOR_DECLARATION | "compact_constructor_declaration" => {
            MethodDeclaration
        }
        java::STATIC_INITIALIZER => Initializer,
        java::MODIFIERS => Modifiers,
        "marker_annotation" | "annotation" => Annotation,
        java::FORMAL_PARAMETER | java::SPREAD_PARAMETER | "catch_formal_parameter" => SingleVariableDeclaration,
        java::VARIABLE_DECLARATOR => VariableDeclarationFragment,
        java::BLOCK | java::CONSTRUCTOR_BODY => Block,
        "expression_statement" => ExpressionStatement,
        "local_variable_declaration" => VariableDeclarationStatement,
        "if_statement" => IfStatement,
        "while_statement" => WhileStatement,
        "do_statement" => DoStatement,
        "for_statement" => ForStatement,
        "enhanced_for_statement" => EnhancedForStatement,
        "try_statement" | "try_with_resources_statement" => TryStatement,
        "catch_clause" => CatchClause,
        "return_statement" => ReturnStatement,
        "throw_statement" => ThrowStatement,
        "break_statement" => BreakStatement,
        "continue_statement" => ContinueStatement,
        "switch_expression" | "switch_statement" => SwitchStatement,
        "synchronized_statement" => SynchronizedStatement,
        "labeled_statement" => LabeledStatement,
        "explicit_constructor_invocation" => ConstructorInvocation,
        "assert_statement" | "yield_statement" => OtherStatement,
        "method_invocation" => MethodInvocation,
        "object_creation_expression" => ClassInstanceCreation,
        "array_creation_expression" => ArrayCreation,
        java::ARRAY_INITIALIZER => ArrayInitializer,
        "assignment_expression" => Assignment,
        "binary_expression" => InfixExpression,
        "unary_expression" | "update_expression" => UnaryExpression,
        "field_access" => FieldAccess,
        "array_access" => ArrayAccess,
        "cast_expression" => CastExpression,
        "ternary_expression" => ConditionalExpression,
        "instanceof_expression" => InstanceofExpression,
        "lambda_expression" => LambdaExpression,
        "method_reference" => MethodReference,
        "parenthesized_expression" => ParenthesizedExpression,
        "this" => ThisExpression,
        "super" => SuperExpression,
        "class_literal" => TypeLiteral,
        k if java::is_literal(k) => Literal,
        java::IDENTIFIER => SimpleName,
        java::TYPE_IDENTIFIER => SimpleType,
        java::SCOPED_IDENTIFIER | java::SCOPED_TYPE_IDENTIFIER => QualifiedName,
        k if java::is_primitive_type(k) => PrimitiveType,
        "generic_type" => ParameterizedType,
        "array_type" => ArrayType,
        _ => Other,
    }
}
