//! Node vocabulary of the Java AST arena.

use crate::binding::Binding;
use std::fmt;

/// Index of a node in its `AstTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // declarations
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    TypeDeclaration,
    EnumDeclaration,
    AnonymousClassDeclaration,
    EnumConstant,
    FieldDeclaration,
    MethodDeclaration,
    Initializer,
    Modifiers,
    Annotation,
    SingleVariableDeclaration,
    VariableDeclarationFragment,
    // comments
    Javadoc,
    TagElement,
    TextElement,
    LineComment,
    BlockComment,
    // statements
    Block,
    ExpressionStatement,
    VariableDeclarationStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    EnhancedForStatement,
    TryStatement,
    CatchClause,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    SwitchStatement,
    SynchronizedStatement,
    LabeledStatement,
    EmptyStatement,
    TypeDeclarationStatement,
    ConstructorInvocation,
    OtherStatement,
    // expressions
    VariableDeclarationExpression,
    MethodInvocation,
    ClassInstanceCreation,
    ArrayCreation,
    ArrayInitializer,
    Assignment,
    InfixExpression,
    UnaryExpression,
    FieldAccess,
    ArrayAccess,
    CastExpression,
    ConditionalExpression,
    InstanceofExpression,
    LambdaExpression,
    MethodReference,
    ParenthesizedExpression,
    ThisExpression,
    SuperExpression,
    TypeLiteral,
    Literal,
    // names and types
    SimpleName,
    QualifiedName,
    SimpleType,
    PrimitiveType,
    ParameterizedType,
    ArrayType,
    Other,
}

impl NodeKind {
    pub fn is_statement(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Block
                | ExpressionStatement
                | VariableDeclarationStatement
                | IfStatement
                | WhileStatement
                | DoStatement
                | ForStatement
                | EnhancedForStatement
                | TryStatement
                | ReturnStatement
                | ThrowStatement
                | BreakStatement
                | ContinueStatement
                | SwitchStatement
                | SynchronizedStatement
                | LabeledStatement
                | EmptyStatement
                | TypeDeclarationStatement
                | ConstructorInvocation
                | OtherStatement
        )
    }

    /// Named type declarations.
    pub fn is_type_declaration(self) -> bool {
        matches!(self, NodeKind::TypeDeclaration | NodeKind::EnumDeclaration)
    }

    /// Members that live directly in a type body.
    pub fn is_body_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::FieldDeclaration
                | NodeKind::MethodDeclaration
                | NodeKind::Initializer
                | NodeKind::TypeDeclaration
                | NodeKind::EnumDeclaration
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, NodeKind::Javadoc | NodeKind::LineComment | NodeKind::BlockComment)
    }

    pub fn is_name(self) -> bool {
        matches!(self, NodeKind::SimpleName | NodeKind::QualifiedName)
    }

    /// `VariableDeclaration` in the sense of fields, locals and parameters.
    pub fn is_variable_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::VariableDeclarationFragment | NodeKind::SingleVariableDeclaration
        )
    }

    /// Nodes that carry an argument list.
    pub fn is_invocation(self) -> bool {
        matches!(
            self,
            NodeKind::MethodInvocation
                | NodeKind::ClassInstanceCreation
                | NodeKind::ConstructorInvocation
        )
    }
}

/// Location of a node in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Root,
    Package,
    Import,
    TypeDeclaration,
    BodyDeclaration,
    EnumConstant,
    Javadoc,
    Tag,
    TagFragment,
    Modifiers,
    Name,
    Qualifier,
    TypeParameters,
    ReturnType,
    Type,
    Superclass,
    SuperInterface,
    ThrownException,
    TypeArgument,
    Parameter,
    Fragment,
    Initializer,
    Body,
    Statement,
    Expression,
    Argument,
    Element,
    AnonymousBody,
    Condition,
    Then,
    Else,
    Init,
    Update,
    Catch,
    Finally,
    Operand,
    Label,
    Other,
}

impl Role {
    /// Roles in which a name or type node refers to a type.
    pub fn is_type_reference(self) -> bool {
        matches!(
            self,
            Role::ReturnType
                | Role::Type
                | Role::Superclass
                | Role::SuperInterface
                | Role::ThrownException
                | Role::TypeArgument
        )
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// tree-sitter kind the node was lowered from, or `"synthetic"`.
    pub grammar: &'static str,
    pub role: Role,
    pub start: usize,
    pub length: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub binding: Option<Binding>,
}

impl NodeData {
    pub fn new(kind: NodeKind, grammar: &'static str, role: Role, start: usize, length: usize) -> Self {
        Self {
            kind,
            grammar,
            role,
            start,
            length,
            parent: None,
            children: Vec::new(),
            binding: None,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}
