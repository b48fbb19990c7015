//! Variable declarations in scope at a position, and collision-free names.

use crate::context::CompilationContext;
use crate::node::{NodeId, NodeKind, Role};
use crate::tree::AstTree;
use std::collections::BTreeSet;

/// Identifier of a named declaration, read from the source.
pub(crate) fn declaration_name<'t>(tree: &AstTree, text: &'t str, declaration: NodeId) -> Option<&'t str> {
    let name = match tree.child_with_role(declaration, Role::Name) {
        Some(name) => name,
        // `T... name` keeps its name in a declarator
        None => {
            let fragment = tree.child_with_role(declaration, Role::Fragment)?;
            tree.child_with_role(fragment, Role::Name)?
        }
    };
    text.get(tree.start(name)..tree.end(name))
}

/// Fragments of a variable declaration statement or expression.
fn fragments(tree: &AstTree, declaration: NodeId) -> Vec<NodeId> {
    tree.children_with_role(declaration, Role::Fragment)
}

fn push_declared_before(tree: &AstTree, block: NodeId, before: impl Fn(NodeId) -> bool, result: &mut Vec<NodeId>) {
    for statement in tree.children_with_role(block, Role::Statement) {
        if !before(statement) {
            break;
        }
        if tree.kind(statement) == NodeKind::VariableDeclarationStatement {
            result.extend(fragments(tree, statement));
        }
    }
}

/// Declarations a reference at `position` can see: earlier locals of the
/// enclosing blocks, catch and loop variables, parameters of the enclosing
/// methods and fields of the enclosing types.
pub(crate) fn visible_at(tree: &AstTree, position: usize) -> Vec<NodeId> {
    let mut result = Vec::new();
    let Some(node) = tree.enclosing_node(position) else {
        return result;
    };
    if tree.kind(node) == NodeKind::Block {
        push_declared_before(tree, node, |s| tree.start(s) < position, &mut result);
    }
    result.extend(visible_along(tree, node));
    result
}

/// Declarations visible from `node` through its ancestors, innermost scope
/// first. Locals of the node itself, when it is a block, are not included.
pub(crate) fn visible_along(tree: &AstTree, node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut child = node;
    for ancestor in tree.ancestors(node) {
        match tree.kind(ancestor) {
            NodeKind::TypeDeclaration | NodeKind::EnumDeclaration | NodeKind::AnonymousClassDeclaration => {
                for declaration in tree.children_with_role(ancestor, Role::BodyDeclaration) {
                    if tree.kind(declaration) == NodeKind::FieldDeclaration {
                        result.extend(fragments(tree, declaration));
                    }
                }
            }
            NodeKind::MethodDeclaration | NodeKind::CatchClause | NodeKind::EnhancedForStatement => {
                result.extend(tree.children_with_role(ancestor, Role::Parameter));
            }
            NodeKind::ForStatement => {
                for init in tree.children_with_role(ancestor, Role::Init) {
                    if tree.kind(init) == NodeKind::VariableDeclarationExpression {
                        result.extend(fragments(tree, init));
                    }
                }
            }
            _ => {}
        }
        if ancestor != node && tree.kind(ancestor) == NodeKind::Block {
            let statement = child;
            push_declared_before(tree, ancestor, |s| s != statement, &mut result);
        }
        child = ancestor;
    }
    result
}

/// Declarations at or after `position` that a new variable could be
/// shadowed by: everything declared later in the enclosing block, or in
/// the non-field members of the enclosing type.
pub(crate) fn after(tree: &AstTree, position: usize) -> Vec<NodeId> {
    let mut result = Vec::new();
    let Some(node) = tree.enclosing_node(position) else {
        return result;
    };
    if let Some(block) = tree.find_ancestor(node, |k| k == NodeKind::Block) {
        for statement in tree.children_with_role(block, Role::Statement) {
            if tree.start(statement) >= position {
                push_declarations(tree, statement, &mut result);
            }
        }
    } else if let Some(owner) = tree.find_ancestor(node, |k| {
        k.is_type_declaration() || k == NodeKind::AnonymousClassDeclaration
    }) {
        for declaration in tree.children_with_role(owner, Role::BodyDeclaration) {
            if tree.kind(declaration) != NodeKind::FieldDeclaration {
                push_declarations(tree, declaration, &mut result);
            }
        }
    }
    result
}

/// Every variable declaration of the unit.
pub(crate) fn all(tree: &AstTree) -> Vec<NodeId> {
    let mut result = Vec::new();
    push_declarations(tree, tree.root(), &mut result);
    result
}

fn push_declarations(tree: &AstTree, root: NodeId, result: &mut Vec<NodeId>) {
    result.extend(
        tree.descendants(root)
            .into_iter()
            .filter(|id| tree.kind(*id).is_variable_declaration()),
    );
}

/// `base` when `is_unique` accepts it, otherwise the first accepted of
/// `base_1`, `base_2`, ...
pub fn generate_unique_name(base: &str, is_unique: impl Fn(&str) -> bool) -> String {
    if is_unique(base) {
        return base.to_string();
    }
    (1..)
        .map(|index| format!("{base}_{index}"))
        .find(|name| is_unique(name))
        .unwrap_or_else(|| base.to_string())
}

impl CompilationContext {
    pub fn variable_declarations_visible_at(&self, position: usize) -> Vec<NodeId> {
        visible_at(self.tree(), position)
    }

    pub fn variable_declarations_after(&self, position: usize) -> Vec<NodeId> {
        after(self.tree(), position)
    }

    pub fn variable_declarations_all(&self) -> Vec<NodeId> {
        all(self.tree())
    }

    /// A variable name that conflicts with nothing visible at, or declared
    /// after, `position`; with no position, with nothing in the unit.
    /// `excluded` does not count as a conflict.
    pub fn unique_variable_name(&self, position: Option<usize>, base: &str, excluded: Option<NodeId>) -> String {
        let mut declarations = match position {
            Some(position) => {
                let mut declarations = self.variable_declarations_visible_at(position);
                declarations.extend(self.variable_declarations_after(position));
                declarations
            }
            None => self.variable_declarations_all(),
        };
        declarations.retain(|d| Some(*d) != excluded);
        self.unique_variable_name_excluding(&declarations, base)
    }

    /// A variable name that differs from the names of `declarations`.
    pub fn unique_variable_name_excluding(&self, declarations: &[NodeId], base: &str) -> String {
        let taken: BTreeSet<&str> = declarations
            .iter()
            .filter_map(|d| declaration_name(self.tree(), self.text(), *d))
            .collect();
        generate_unique_name(base, |name| !taken.contains(name))
    }

    /// A method name used neither by a method of the unit nor by a method
    /// of a declared type's superclass chain.
    pub fn unique_method_name(&self, base: &str) -> String {
        let tree = self.tree();
        let text = self.text();
        let mut taken: BTreeSet<String> = BTreeSet::new();
        for id in tree.descendants(tree.root()) {
            match tree.kind(id) {
                NodeKind::MethodDeclaration => {
                    taken.extend(declaration_name(tree, text, id).map(str::to_string));
                }
                NodeKind::TypeDeclaration => {
                    let mut current = tree.binding(id).and_then(|b| b.as_type()).cloned();
                    while let Some(binding) = current {
                        taken.extend(binding.declared_methods().iter().map(|m| m.name().to_string()));
                        current = binding.superclass().and_then(|s| self.lookup_type(s));
                    }
                }
                _ => {}
            }
        }
        generate_unique_name(base, |name| !taken.contains(name))
    }

    /// A type name not declared anywhere in the unit.
    pub fn unique_type_name(&self, base: &str) -> String {
        let tree = self.tree();
        let taken: BTreeSet<&str> = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|id| tree.kind(*id).is_type_declaration())
            .filter_map(|id| declaration_name(tree, self.text(), id))
            .collect();
        generate_unique_name(base, |name| !taken.contains(name))
    }
}
