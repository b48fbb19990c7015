//! Places where statements and body declarations are inserted.

use crate::error::AstError;
use crate::node::{NodeId, NodeKind, Role};
use crate::tree::AstTree;

/// Position for a new or moved statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementTarget {
    Before(NodeId),
    After(NodeId),
    /// First statement of a block, or of a method body.
    First(NodeId),
    /// Last statement of a block, or of a method body.
    Last(NodeId),
}

/// A statement target with methods replaced by their bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementAnchor {
    Statement { statement: NodeId, before: bool },
    Block { block: NodeId, first: bool },
}

impl StatementTarget {
    pub(crate) fn anchor(self, tree: &AstTree) -> Result<StatementAnchor, AstError> {
        let anchor = match self {
            StatementTarget::Before(statement) => StatementAnchor::Statement { statement, before: true },
            StatementTarget::After(statement) => StatementAnchor::Statement { statement, before: false },
            StatementTarget::First(node) => StatementAnchor::Block { block: body_of(tree, node)?, first: true },
            StatementTarget::Last(node) => StatementAnchor::Block { block: body_of(tree, node)?, first: false },
        };
        let node = match anchor {
            StatementAnchor::Statement { statement, .. } => statement,
            StatementAnchor::Block { block, .. } => block,
        };
        if tree.is_dangling(node) {
            return Err(AstError::assertion(format!("target {node} is not part of the unit")));
        }
        Ok(anchor)
    }
}

fn body_of(tree: &AstTree, node: NodeId) -> Result<NodeId, AstError> {
    match tree.kind(node) {
        NodeKind::Block => Ok(node),
        NodeKind::MethodDeclaration | NodeKind::Initializer => tree
            .child_with_role(node, Role::Body)
            .filter(|body| tree.kind(*body) == NodeKind::Block)
            .ok_or_else(|| AstError::assertion(format!("method {node} has no body"))),
        kind => Err(AstError::assertion(format!("{kind:?} can not hold statements"))),
    }
}

/// Position for a new body declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDeclarationTarget {
    Before(NodeId),
    After(NodeId),
    /// First member of a type or anonymous class body.
    First(NodeId),
    /// Last member of a type or anonymous class body.
    Last(NodeId),
}

impl BodyDeclarationTarget {
    /// The type whose body receives the declaration.
    pub(crate) fn owner(self, tree: &AstTree) -> Result<NodeId, AstError> {
        let owner = match self {
            BodyDeclarationTarget::Before(declaration) | BodyDeclarationTarget::After(declaration) => {
                tree.parent(declaration)
            }
            BodyDeclarationTarget::First(owner) | BodyDeclarationTarget::Last(owner) => Some(owner),
        };
        match owner {
            Some(owner) if is_type_body(tree.kind(owner)) && !tree.is_dangling(owner) => Ok(owner),
            _ => Err(AstError::assertion(format!("{self:?} is not inside a type body"))),
        }
    }
}

pub(crate) fn is_type_body(kind: NodeKind) -> bool {
    kind.is_type_declaration() || kind == NodeKind::AnonymousClassDeclaration
}
