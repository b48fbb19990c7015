//! Import management: short names for qualified type references.

use crate::binding::{qualifier, simple_name, Binding};
use crate::context::CompilationContext;
use crate::error::{AstError, ParseError};
use crate::lower::Lowerer;
use crate::node::{NodeData, NodeId, NodeKind, Role};
use crate::resolve::node_text;
use java_surgeon_lang::{java, registry, SupportedLanguage};
use tracing::debug;

impl CompilationContext {
    /// Make `qualified_name` usable by its simple name, adding an import
    /// when needed. Returns the name to write in code: the simple name, or
    /// the qualified one when the simple name is taken.
    pub fn ensure_class_import(&mut self, qualified_name: &str) -> Result<String, AstError> {
        self.transaction("ensure_class_import", |context| context.import_class(qualified_name))
    }

    /// Shorten the qualified type names under `node` through imports.
    /// Returns the node now standing where `node` was, which differs when
    /// `node` itself was a shortened name.
    pub fn resolve_imports(&mut self, node: NodeId) -> Result<NodeId, AstError> {
        self.transaction("resolve_imports", |context| context.shorten_type_names(node))
    }

    pub(crate) fn import_class(&mut self, class_name: &str) -> Result<String, AstError> {
        let class_name: String = class_name.chars().filter(|c| !c.is_whitespace()).collect();
        if !self.config().resolve_imports {
            return Ok(class_name);
        }
        let short_name = simple_name(&class_name).to_string();
        let package = qualifier(&class_name).to_string();
        if package.is_empty() || package == "java.lang" {
            return Ok(short_name);
        }

        {
            let environment = self.environment();
            let tree = self.tree();
            let imports: Vec<_> = environment.imports().iter().filter(|i| !i.is_static).collect();
            if imports.iter().any(|i| !i.on_demand && i.name == class_name) {
                return Ok(short_name);
            }
            if environment.package() == package {
                return Ok(short_name);
            }
            let member_types: Vec<&(NodeId, String)> = environment
                .declared()
                .iter()
                .filter(|(id, _)| tree.find_ancestor(*id, |k| k == NodeKind::Block).is_none())
                .collect();
            if member_types.iter().any(|(_, name)| *name == class_name) {
                return Ok(short_name);
            }

            // conflicts keep the qualified name
            if imports
                .iter()
                .any(|i| !i.on_demand && simple_name(&i.name) == short_name)
            {
                debug!(class_name, "simple name taken by an import");
                return Ok(class_name);
            }
            if member_types
                .iter()
                .any(|(id, _)| environment.name_of(*id) == Some(short_name.as_str()))
            {
                debug!(class_name, "simple name taken by a type declaration");
                return Ok(class_name);
            }
            let on_demand = imports.iter().any(|i| i.on_demand);
            if on_demand && self.simple_reference_exists(&short_name, &class_name) {
                debug!(class_name, "simple name already used in the unit");
                return Ok(class_name);
            }
            if imports.iter().any(|i| i.on_demand && i.name == package) {
                return Ok(short_name);
            }
        }

        self.add_import(&class_name)?;
        Ok(short_name)
    }

    /// Whether a simple type reference spelled `short_name` resolves to
    /// something other than `class_name`.
    fn simple_reference_exists(&self, short_name: &str, class_name: &str) -> bool {
        let tree = self.tree();
        let environment = self.environment();
        tree.descendants(tree.root()).into_iter().any(|id| {
            matches!(tree.kind(id), NodeKind::SimpleType | NodeKind::SimpleName)
                && tree.role(id).is_type_reference()
                && node_text(tree, self.text(), id) == short_name
                && environment.type_name_of(id) != class_name
        })
    }

    fn add_import(&mut self, class_name: &str) -> Result<(), AstError> {
        let eol = self.config().eol.clone();
        let declaration = format!("import {class_name};");
        let tree = self.tree();
        let root = tree.root();
        let last_import = tree.children_with_role(root, Role::Import).last().copied();
        let package = tree.child_with_role(root, Role::Package);
        let (position, source) = match last_import.or(package) {
            Some(anchor) => (tree.end(anchor), format!("{eol}{declaration}")),
            None => (0, format!("{declaration}{eol}")),
        };
        let offset = if position == 0 { 0 } else { position + eol.len() };

        self.replace_text(position, 0, &source)?;
        let import = self.lower_import(offset, &declaration)?;
        self.tree.insert_child_after_roles(root, &[Role::Package, Role::Import], import);
        debug!(class_name, position, "added import");
        Ok(())
    }

    fn lower_import(&mut self, offset: usize, declaration: &str) -> Result<NodeId, AstError> {
        let parsed = registry::parse(SupportedLanguage::Java, declaration)
            .map_err(|e| ParseError::new(declaration, e.to_string()))?;
        let program = parsed.root_node();
        let node = program
            .named_child(0)
            .filter(|n| n.kind() == java::IMPORT_DECLARATION)
            .ok_or_else(|| ParseError::new(declaration, "Expected an import declaration"))?;
        let mut lowerer = Lowerer::new(&mut self.tree, declaration, offset as isize);
        let id = lowerer
            .lower_detached(node, Role::Import)
            .ok_or_else(|| ParseError::new(declaration, "Unsupported import declaration"))?;
        Ok(id)
    }

    pub(crate) fn shorten_type_names(&mut self, node: NodeId) -> Result<NodeId, AstError> {
        if !self.config().resolve_imports {
            return Ok(node);
        }
        let mut result = node;
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            match self.tree.kind(id) {
                NodeKind::ImportDeclaration | NodeKind::PackageDeclaration => continue,
                NodeKind::QualifiedName => {
                    let name: String = self.node_source(id).chars().filter(|c| !c.is_whitespace()).collect();
                    if self.environment().is_known(&name) {
                        let short_name = self.import_class(&name)?;
                        if short_name != name {
                            let replacement = self.replace_with_simple_name(id, &name, &short_name)?;
                            if id == result {
                                result = replacement;
                            }
                            continue;
                        }
                    }
                }
                _ => {}
            }
            pending.extend(self.tree.children(id).iter().rev().copied());
        }
        Ok(result)
    }

    fn replace_with_simple_name(&mut self, id: NodeId, qualified_name: &str, short_name: &str) -> Result<NodeId, AstError> {
        let start = self.tree.start(id);
        let role = self.tree.role(id);
        let binding = self
            .tree
            .binding(id)
            .cloned()
            .or_else(|| self.lookup_type(qualified_name).map(Binding::Type));
        let length = self.tree.length(id);
        self.replace_text(start, length, short_name)?;

        let (kind, grammar) = if role.is_type_reference() {
            (NodeKind::SimpleType, java::TYPE_IDENTIFIER)
        } else {
            (NodeKind::SimpleName, java::IDENTIFIER)
        };
        let simple = self.tree.alloc(NodeData::new(kind, grammar, role, start, short_name.len()));
        self.tree.set_binding(simple, binding);
        self.tree.replace_node(id, simple);
        Ok(simple)
    }
}
