//! Name and binding resolution against the unit and the class path.
//!
//! `TypeEnvironment` answers "which type does this name denote here", finds
//! the method an invocation calls and the declaration a name refers to.
//! `bind` runs it over a subtree and stores the results on the nodes.

use crate::binding::{
    self, Binding, ClassPath, MethodBinding, SynthesizedMethod, SynthesizedType, SynthesizedVariable, TypeBinding,
    VariableBinding, CONSTRUCTOR_NAME,
};
use crate::node::{NodeId, NodeKind, Role};
use crate::scope;
use crate::tree::AstTree;
use java_surgeon_lang::java;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::trace;

const PRIMITIVES: [&str; 9] = ["boolean", "byte", "char", "short", "int", "long", "float", "double", "void"];

pub(crate) fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// One `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Import {
    pub node: NodeId,
    /// Imported name without `static`, `.*` and `;`.
    pub name: String,
    pub on_demand: bool,
    pub is_static: bool,
}

pub(crate) fn imports(tree: &AstTree, text: &str) -> Vec<Import> {
    tree.children_with_role(tree.root(), Role::Import)
        .into_iter()
        .filter_map(|node| {
            let source = text.get(tree.start(node)..tree.end(node))?;
            let body = source.strip_prefix("import")?.trim().trim_end_matches(';').trim();
            let (body, is_static) = match body.strip_prefix("static") {
                Some(rest) if rest.starts_with(char::is_whitespace) => (rest, true),
                _ => (body, false),
            };
            let body: String = body.chars().filter(|c| !c.is_whitespace()).collect();
            let (name, on_demand) = match body.strip_suffix(".*") {
                Some(name) => (name.to_string(), true),
                None => (body, false),
            };
            Some(Import {
                node,
                name,
                on_demand,
                is_static,
            })
        })
        .collect()
}

pub(crate) fn package_name(tree: &AstTree, text: &str) -> String {
    let Some(package) = tree.child_with_role(tree.root(), Role::Package) else {
        return String::new();
    };
    tree.children(package)
        .iter()
        .find(|c| tree.kind(**c).is_name())
        .and_then(|name| text.get(tree.start(*name)..tree.end(*name)))
        .map(|name| name.chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default()
}

pub(crate) fn node_text<'t>(tree: &AstTree, text: &'t str, id: NodeId) -> &'t str {
    text.get(tree.start(id)..tree.end(id)).unwrap_or("")
}

pub(crate) fn has_modifier(tree: &AstTree, text: &str, declaration: NodeId, modifier: &str) -> bool {
    tree.child_with_role(declaration, Role::Modifiers)
        .is_some_and(|modifiers| node_text(tree, text, modifiers).split_whitespace().any(|m| m == modifier))
}

/// What a simple name in an expression refers to.
#[derive(Debug, Clone)]
pub(crate) enum VariableRef {
    Declaration(NodeId),
    Member(Rc<dyn VariableBinding>),
}

/// A parsed fragment that is not part of the text yet.
struct Fragment<'a> {
    root: NodeId,
    /// Real node the fragment is resolved beneath.
    anchor: NodeId,
    position: usize,
    /// Offset the fragment text will be inserted at.
    base: usize,
    source: &'a str,
}

pub(crate) struct TypeEnvironment<'a> {
    tree: &'a AstTree,
    text: &'a str,
    class_path: &'a ClassPath,
    package: String,
    imports: Vec<Import>,
    /// Type declarations with their qualified names.
    declared: Vec<(NodeId, String)>,
    /// Bindings of source types, by qualified name.
    source_types: HashMap<String, Rc<dyn TypeBinding>>,
    fragment: Option<Fragment<'a>>,
    synthesized: RefCell<HashMap<String, Rc<dyn TypeBinding>>>,
}

impl<'a> TypeEnvironment<'a> {
    pub(crate) fn new(tree: &'a AstTree, text: &'a str, class_path: &'a ClassPath) -> Self {
        let mut environment = Self {
            tree,
            text,
            class_path,
            package: package_name(tree, text),
            imports: imports(tree, text),
            declared: Vec::new(),
            source_types: HashMap::new(),
            fragment: None,
            synthesized: RefCell::new(HashMap::new()),
        };
        environment.declare_types(tree.root());
        environment
    }

    /// Resolve the detached subtree `root`, whose text is `source` placed at
    /// `base`, as if it were written at `position`.
    pub(crate) fn with_fragment(mut self, root: NodeId, position: usize, base: usize, source: &'a str) -> Self {
        let anchor = self.tree.enclosing_node(position).unwrap_or(self.tree.root());
        self.fragment = Some(Fragment {
            root,
            anchor,
            position,
            base,
            source,
        });
        self.declare_types(root);
        self
    }

    fn in_fragment(&self, id: NodeId) -> Option<&Fragment<'a>> {
        self.fragment
            .as_ref()
            .filter(|fragment| self.tree.ancestors(id).last() == Some(fragment.root))
    }

    /// Source of a node, read from the fragment for detached nodes.
    pub(crate) fn text_of(&self, id: NodeId) -> &'a str {
        match self.in_fragment(id) {
            Some(fragment) => {
                let start = self.tree.start(id).saturating_sub(fragment.base);
                fragment.source.get(start..start + self.tree.length(id)).unwrap_or("")
            }
            None => node_text(self.tree, self.text, id),
        }
    }

    fn has_modifier(&self, declaration: NodeId, modifier: &str) -> bool {
        self.tree
            .child_with_role(declaration, Role::Modifiers)
            .is_some_and(|modifiers| self.text_of(modifiers).split_whitespace().any(|m| m == modifier))
    }

    pub(crate) fn name_of(&self, declaration: NodeId) -> Option<&'a str> {
        let tree = self.tree;
        let name = match tree.child_with_role(declaration, Role::Name) {
            Some(name) => name,
            None => {
                let fragment = tree.child_with_role(declaration, Role::Fragment)?;
                tree.child_with_role(fragment, Role::Name)?
            }
        };
        Some(self.text_of(name)).filter(|name| !name.is_empty())
    }

    fn declare_types(&mut self, root: NodeId) {
        let tree = self.tree;
        for id in tree.descendants(root) {
            if !tree.kind(id).is_type_declaration() {
                continue;
            }
            let Some(name) = self.name_of(id) else {
                continue;
            };
            let outer = self
                .chain(id)
                .into_iter()
                .skip(1)
                .find(|a| tree.kind(*a).is_type_declaration())
                .and_then(|outer| self.qualified_name_of(outer).map(str::to_string));
            let qualified = match outer {
                Some(outer) => format!("{outer}.{name}"),
                None if self.package.is_empty() => name.to_string(),
                None => format!("{}.{name}", self.package),
            };
            if let Some(Binding::Type(binding)) = tree.binding(id) {
                self.source_types.insert(qualified.clone(), Rc::clone(binding));
            }
            self.declared.push((id, qualified));
        }
    }

    pub(crate) fn package(&self) -> &str {
        &self.package
    }

    pub(crate) fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub(crate) fn declared(&self) -> &[(NodeId, String)] {
        &self.declared
    }

    pub(crate) fn qualified_name_of(&self, declaration: NodeId) -> Option<&str> {
        self.declared
            .iter()
            .find(|(id, _)| *id == declaration)
            .map(|(_, name)| name.as_str())
    }

    /// `node` and its ancestors, continuing at the anchor for fragments.
    pub(crate) fn chain(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain: Vec<NodeId> = self.tree.ancestors(node).collect();
        if let Some(fragment) = self.in_fragment(node) {
            chain.extend(self.tree.ancestors(fragment.anchor));
        }
        chain
    }

    /// Qualified names of the types enclosing `node`, innermost first. An
    /// anonymous class stands for the type it instantiates.
    pub(crate) fn enclosing_types(&self, node: NodeId) -> Vec<String> {
        let tree = self.tree;
        self.chain(node)
            .into_iter()
            .filter_map(|id| match tree.kind(id) {
                k if k.is_type_declaration() => self.qualified_name_of(id).map(str::to_string),
                NodeKind::AnonymousClassDeclaration => {
                    let creation = tree.parent(id)?;
                    let created = tree.child_with_role(creation, Role::Type)?;
                    Some(self.type_name_of(created))
                }
                _ => None,
            })
            .collect()
    }

    /// True when `node` sits in a static method, initializer or field.
    pub(crate) fn in_static_context(&self, node: NodeId) -> bool {
        let tree = self.tree;
        self.chain(node)
            .into_iter()
            .find(|id| tree.kind(*id).is_body_declaration())
            .is_some_and(|declaration| {
                self.has_modifier(declaration, "static")
                    || (tree.kind(declaration) == NodeKind::Initializer && self.text_of(declaration).starts_with("static"))
            })
    }

    pub(crate) fn is_known(&self, qualified_name: &str) -> bool {
        self.declared.iter().any(|(_, name)| name == qualified_name) || self.class_path.contains(qualified_name)
    }

    pub(crate) fn lookup(&self, qualified_name: &str) -> Option<Rc<dyn TypeBinding>> {
        if let Some(binding) = self.source_types.get(qualified_name) {
            return Some(Rc::clone(binding));
        }
        if let Some(binding) = self.synthesized.borrow().get(qualified_name) {
            return Some(Rc::clone(binding));
        }
        if let Some((declaration, _)) = self.declared.iter().find(|(_, name)| name == qualified_name) {
            let binding: Rc<dyn TypeBinding> = Rc::new(self.source_type(*declaration, qualified_name));
            self.synthesized
                .borrow_mut()
                .insert(qualified_name.to_string(), Rc::clone(&binding));
            return Some(binding);
        }
        self.class_path.lookup(qualified_name)
    }

    /// The type a name denotes when written inside `context`.
    pub(crate) fn resolve_type_name(&self, name: &str, context: NodeId) -> Option<String> {
        let name = name.trim();
        if is_primitive(name) {
            return Some(name.to_string());
        }
        if let Some((first, rest)) = name.split_once('.') {
            if self.is_known(name) {
                return Some(name.to_string());
            }
            let outer = self.resolve_type_name(first, context)?;
            let candidate = format!("{outer}.{rest}");
            return self.is_known(&candidate).then_some(candidate);
        }

        let tree = self.tree;
        for id in self.chain(context) {
            if !tree.kind(id).is_type_declaration() {
                continue;
            }
            if self.name_of(id) == Some(name) {
                return self.qualified_name_of(id).map(str::to_string);
            }
            let member = tree
                .children_with_role(id, Role::BodyDeclaration)
                .into_iter()
                .filter(|m| tree.kind(*m).is_type_declaration())
                .find(|m| self.name_of(*m) == Some(name));
            if let Some(member) = member {
                return self.qualified_name_of(member).map(str::to_string);
            }
        }
        for declaration in tree.children_with_role(tree.root(), Role::TypeDeclaration) {
            if self.name_of(declaration) == Some(name) {
                return self.qualified_name_of(declaration).map(str::to_string);
            }
        }
        for import in self.imports.iter().filter(|i| !i.on_demand && !i.is_static) {
            if binding::simple_name(&import.name) == name {
                return Some(import.name.clone());
            }
        }
        let same_package = if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.package)
        };
        if self.class_path.contains(&same_package) {
            return Some(same_package);
        }
        for import in self.imports.iter().filter(|i| i.on_demand && !i.is_static) {
            let candidate = format!("{}.{name}", import.name);
            if self.is_known(&candidate) {
                return Some(candidate);
            }
        }
        let implicit = format!("java.lang.{name}");
        self.class_path.contains(&implicit).then_some(implicit)
    }

    /// Qualified spelling of a type node; unresolvable names keep their
    /// source spelling.
    pub(crate) fn type_name_of(&self, type_node: NodeId) -> String {
        let tree = self.tree;
        let source = self.text_of(type_node);
        match tree.kind(type_node) {
            NodeKind::SimpleType | NodeKind::SimpleName | NodeKind::QualifiedName => {
                let name: String = source.chars().filter(|c| !c.is_whitespace()).collect();
                self.resolve_type_name(&name, type_node).unwrap_or(name)
            }
            NodeKind::ParameterizedType => match tree.children(type_node).first() {
                Some(base) => self.type_name_of(*base),
                None => source.to_string(),
            },
            NodeKind::ArrayType => match tree.child_with_role(type_node, Role::Type) {
                Some(element) => {
                    let dimensions = self.text_of(type_node)
                        .get(tree.length(element)..)
                        .map_or(0, |rest| rest.matches('[').count());
                    format!("{}{}", self.type_name_of(element), "[]".repeat(dimensions))
                }
                None => source.to_string(),
            },
            _ => source.to_string(),
        }
    }

    /// Declared type of a fragment or single variable declaration.
    pub(crate) fn variable_type(&self, declaration: NodeId) -> Option<String> {
        let tree = self.tree;
        let owner = match tree.kind(declaration) {
            NodeKind::VariableDeclarationFragment => tree.parent(declaration)?,
            _ => declaration,
        };
        let type_node = tree.child_with_role(owner, Role::Type)?;
        let mut name = self.type_name_of(type_node);
        if tree.node(declaration).grammar == java::SPREAD_PARAMETER {
            name.push_str("[]");
        }
        Some(name)
    }

    pub(crate) fn variable_binding(&self, declaration: NodeId) -> Option<Rc<dyn VariableBinding>> {
        let tree = self.tree;
        let name = self.name_of(declaration)?;
        let owner = match tree.kind(declaration) {
            NodeKind::VariableDeclarationFragment => tree.parent(declaration)?,
            _ => declaration,
        };
        let field = tree.kind(owner) == NodeKind::FieldDeclaration;
        let declaring_type = if field {
            self.enclosing_types(owner).into_iter().next()
        } else {
            None
        };
        Some(Rc::new(SynthesizedVariable {
            name: name.to_string(),
            type_name: self.variable_type(declaration).unwrap_or_default(),
            field,
            is_static: self.has_modifier(owner, "static"),
            declaring_type,
        }))
    }

    /// Binding of a type declared in the unit.
    pub(crate) fn source_type(&self, declaration: NodeId, qualified_name: &str) -> SynthesizedType {
        let tree = self.tree;
        let is_interface = matches!(
            tree.node(declaration).grammar,
            java::INTERFACE_DECLARATION | java::ANNOTATION_TYPE_DECLARATION
        );
        let superclass = if is_interface || tree.kind(declaration) == NodeKind::EnumDeclaration {
            None
        } else {
            match tree.child_with_role(declaration, Role::Superclass) {
                Some(superclass) => Some(self.type_name_of(superclass)),
                None => Some("java.lang.Object".to_string()),
            }
        };
        let mut binding = SynthesizedType::new(qualified_name)
            .interface(is_interface)
            .with_superclass(superclass);
        for interface in tree.children_with_role(declaration, Role::SuperInterface) {
            binding = binding.with_interface(self.type_name_of(interface));
        }

        let mut methods: Vec<Rc<dyn MethodBinding>> = Vec::new();
        let mut fields: Vec<Rc<dyn VariableBinding>> = Vec::new();
        for member in tree.children_with_role(declaration, Role::BodyDeclaration) {
            match tree.kind(member) {
                NodeKind::MethodDeclaration => methods.push(Rc::new(self.method_of(member, qualified_name))),
                NodeKind::FieldDeclaration => {
                    for fragment in tree.children_with_role(member, Role::Fragment) {
                        fields.extend(self.variable_binding(fragment));
                    }
                }
                _ => {}
            }
        }
        if !is_interface && !methods.iter().any(|m| m.is_constructor()) {
            methods.push(Rc::new(SynthesizedMethod::new(qualified_name, CONSTRUCTOR_NAME)));
        }
        binding.with_methods(methods).with_fields(fields)
    }

    /// Binding of a method declared in source.
    pub(crate) fn method_of(&self, method: NodeId, declaring_type: &str) -> SynthesizedMethod {
        let tree = self.tree;
        let constructor = tree.child_with_role(method, Role::ReturnType).is_none();
        let name = if constructor {
            CONSTRUCTOR_NAME.to_string()
        } else {
            self.name_of(method).unwrap_or_default().to_string()
        };
        let parameters = tree.children_with_role(method, Role::Parameter);
        let varargs = parameters
            .last()
            .is_some_and(|p| tree.node(*p).grammar == java::SPREAD_PARAMETER);
        SynthesizedMethod::new(declaring_type, name)
            .with_parameters(parameters.iter().filter_map(|p| self.variable_type(*p)).collect())
            .with_return_type(
                tree.child_with_role(method, Role::ReturnType)
                    .map_or_else(|| "void".to_string(), |t| self.type_name_of(t)),
            )
            .with_exceptions(
                tree.children_with_role(method, Role::ThrownException)
                    .into_iter()
                    .map(|t| self.type_name_of(t))
                    .collect(),
            )
            .with_static(self.has_modifier(method, "static"))
            .with_varargs(varargs)
    }

    /// Supertypes of `qualified_name`, itself first, breadth first.
    pub(crate) fn hierarchy(&self, qualified_name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([qualified_name.to_string()]);
        let mut result = Vec::new();
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(binding) = self.lookup(&name) {
                queue.extend(binding.superclass().map(str::to_string));
                queue.extend(binding.interfaces().iter().cloned());
            }
            result.push(name);
        }
        result
    }

    /// True when every type of the hierarchy is known.
    pub(crate) fn hierarchy_known(&self, qualified_name: &str) -> bool {
        self.hierarchy(qualified_name).iter().all(|name| self.lookup(name).is_some())
    }

    pub(crate) fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.hierarchy(sub).iter().any(|name| name == sup)
    }

    pub(crate) fn methods_in_hierarchy(&self, qualified_name: &str) -> Vec<Rc<dyn MethodBinding>> {
        self.hierarchy(qualified_name)
            .iter()
            .filter_map(|name| self.lookup(name))
            .flat_map(|binding| binding.declared_methods())
            .collect()
    }

    fn fields_in_hierarchy(&self, qualified_name: &str) -> Vec<Rc<dyn VariableBinding>> {
        self.hierarchy(qualified_name)
            .iter()
            .filter_map(|name| self.lookup(name))
            .flat_map(|binding| binding.declared_fields())
            .collect()
    }

    /// The declaration or member field `name` refers to at `node`.
    pub(crate) fn find_variable(&self, name: &str, node: NodeId) -> Option<VariableRef> {
        let tree = self.tree;
        let mut candidates = scope::visible_along(tree, node);
        if let Some(fragment) = self.in_fragment(node) {
            candidates.extend(scope::visible_at(tree, fragment.position));
        }
        let declaration = candidates.into_iter().find(|d| self.name_of(*d) == Some(name));
        if let Some(declaration) = declaration {
            return Some(VariableRef::Declaration(declaration));
        }
        self.enclosing_types(node)
            .iter()
            .flat_map(|owner| self.fields_in_hierarchy(owner))
            .find(|field| field.name() == name)
            .map(VariableRef::Member)
    }

    fn variable_ref_type(&self, variable: &VariableRef) -> Option<String> {
        match variable {
            VariableRef::Declaration(declaration) => self.variable_type(*declaration),
            VariableRef::Member(field) => Some(field.type_name().to_string()),
        }
    }

    /// Static type of an expression, when it can be told.
    pub(crate) fn expression_type(&self, expression: NodeId) -> Option<String> {
        let tree = self.tree;
        let source = self.text_of(expression);
        let child = |role| tree.child_with_role(expression, role);
        match tree.kind(expression) {
            NodeKind::Literal => literal_type(tree.node(expression).grammar, source),
            NodeKind::SimpleName => match self.find_variable(source, expression) {
                Some(variable) => self.variable_ref_type(&variable),
                None => self.resolve_type_name(source, expression),
            },
            NodeKind::QualifiedName | NodeKind::FieldAccess => {
                let name: String = source.chars().filter(|c| !c.is_whitespace()).collect();
                if tree.kind(expression) == NodeKind::QualifiedName {
                    let first = name.split('.').next().unwrap_or_default();
                    if self.find_variable(first, expression).is_none() {
                        if let Some(type_name) = self.resolve_type_name(&name, expression) {
                            return Some(type_name);
                        }
                    }
                }
                let qualifier = child(Role::Qualifier).or_else(|| child(Role::Expression))?;
                let field = child(Role::Name)?;
                let owner = self.expression_type(qualifier)?;
                let field_name = self.text_of(field);
                self.fields_in_hierarchy(&owner)
                    .into_iter()
                    .find(|f| f.name() == field_name)
                    .map(|f| f.type_name().to_string())
            }
            NodeKind::ThisExpression => self.enclosing_types(expression).into_iter().next(),
            NodeKind::MethodInvocation => self
                .resolve_invocation(expression)
                .map(|method| method.return_type().to_string()),
            NodeKind::ClassInstanceCreation | NodeKind::CastExpression => child(Role::Type).map(|t| self.type_name_of(t)),
            NodeKind::ArrayCreation => child(Role::Type).map(|t| format!("{}[]", self.type_name_of(t))),
            NodeKind::TypeLiteral => Some("java.lang.Class".to_string()),
            NodeKind::ParenthesizedExpression => child(Role::Expression).and_then(|e| self.expression_type(e)),
            NodeKind::Assignment => tree.children(expression).first().and_then(|e| self.expression_type(*e)),
            NodeKind::InfixExpression => {
                let operands: Vec<Option<String>> = tree
                    .children_with_role(expression, Role::Operand)
                    .into_iter()
                    .map(|o| self.expression_type(o))
                    .collect();
                let string = Some("java.lang.String".to_string());
                if operands.contains(&string) && source.contains('+') {
                    return string;
                }
                if ["==", "!=", "<", ">", "&&", "||", "instanceof"].iter().any(|op| source.contains(op)) {
                    return Some("boolean".to_string());
                }
                operands.into_iter().next().flatten()
            }
            NodeKind::InstanceofExpression => Some("boolean".to_string()),
            NodeKind::ConditionalExpression => tree
                .children(expression)
                .get(1)
                .and_then(|e| self.expression_type(*e)),
            _ => None,
        }
    }

    /// The method an invocation or instance creation calls, when one with
    /// that name and arity exists in a known receiver type.
    pub(crate) fn resolve_invocation(&self, invocation: NodeId) -> Option<Rc<dyn MethodBinding>> {
        let tree = self.tree;
        let arguments = tree.children_with_role(invocation, Role::Argument);
        let (receivers, name) = match tree.kind(invocation) {
            NodeKind::MethodInvocation => {
                let name = self.text_of(tree.child_with_role(invocation, Role::Name)?);
                let receivers = match tree.child_with_role(invocation, Role::Expression) {
                    None => self.enclosing_types(invocation),
                    Some(receiver) => match tree.kind(receiver) {
                        NodeKind::ThisExpression => self.enclosing_types(invocation).into_iter().take(1).collect(),
                        NodeKind::SuperExpression => self.superclass_of_enclosing(invocation).into_iter().collect(),
                        _ => self.expression_type(receiver).into_iter().collect(),
                    },
                };
                (receivers, name)
            }
            NodeKind::ClassInstanceCreation => {
                let created = self.type_name_of(tree.child_with_role(invocation, Role::Type)?);
                let binding = self.lookup(&created)?;
                let constructor = binding
                    .declared_methods()
                    .into_iter()
                    .filter(|m| m.is_constructor())
                    .find(|m| m.accepts_arguments(arguments.len()));
                return match constructor {
                    Some(constructor) => Some(constructor),
                    None if arguments.is_empty() => Some(Rc::new(SynthesizedMethod::new(created, CONSTRUCTOR_NAME))),
                    None => None,
                };
            }
            NodeKind::ConstructorInvocation => {
                let is_super = tree
                    .children(invocation)
                    .iter()
                    .any(|c| tree.kind(*c) == NodeKind::SuperExpression);
                let target = if is_super {
                    self.superclass_of_enclosing(invocation)
                } else {
                    self.enclosing_types(invocation).into_iter().next()
                };
                (target.into_iter().collect(), CONSTRUCTOR_NAME)
            }
            _ => return None,
        };

        let argument_types: Vec<Option<String>> = arguments.iter().map(|a| self.expression_type(*a)).collect();
        for receiver in receivers {
            let mut candidates: Vec<Rc<dyn MethodBinding>> = if name == CONSTRUCTOR_NAME {
                self.lookup(&receiver)
                    .map(|b| b.declared_methods())
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|m| m.is_constructor())
                    .collect()
            } else {
                self.methods_in_hierarchy(&receiver)
                    .into_iter()
                    .filter(|m| m.name() == name)
                    .collect()
            };
            candidates.retain(|m| m.accepts_arguments(arguments.len()));
            let exact = candidates.iter().find(|m| self.parameters_match(m.as_ref(), &argument_types));
            if let Some(method) = exact.or(candidates.first()) {
                return Some(Rc::clone(method));
            }
        }
        None
    }

    fn parameters_match(&self, method: &dyn MethodBinding, argument_types: &[Option<String>]) -> bool {
        method
            .parameter_types()
            .iter()
            .zip(argument_types)
            .all(|(parameter, argument)| match argument {
                Some(argument) => self.is_subtype(argument, parameter),
                None => true,
            })
    }

    fn superclass_of_enclosing(&self, node: NodeId) -> Option<String> {
        let current = self.enclosing_types(node).into_iter().next()?;
        self.lookup(&current)?.superclass().map(str::to_string)
    }
}

fn literal_type(grammar: &str, source: &str) -> Option<String> {
    let name = match grammar {
        "string_literal" | "text_block" => "java.lang.String",
        "character_literal" => "char",
        "true" | "false" => "boolean",
        "null_literal" => "null",
        "decimal_floating_point_literal" | "hex_floating_point_literal" => {
            if source.ends_with(['f', 'F']) {
                "float"
            } else {
                "double"
            }
        }
        _ if source.ends_with(['l', 'L']) => "long",
        _ => "int",
    };
    Some(name.to_string())
}

/// Bindings for `root` and every node below it, computed against `environment`.
pub(crate) fn compute_bindings(environment: &TypeEnvironment, root: NodeId) -> Vec<(NodeId, Binding)> {
    let tree = environment.tree;
    let mut result = Vec::new();
    for id in tree.descendants(root) {
        let kind = tree.kind(id);
        let binding = match kind {
            k if k.is_type_declaration() => environment.qualified_name_of(id).map(|name| {
                let binding: Rc<dyn TypeBinding> = Rc::new(environment.source_type(id, name));
                Binding::Type(binding)
            }),
            NodeKind::MethodDeclaration => environment.enclosing_types(id).into_iter().next().map(|owner| {
                let binding: Rc<dyn MethodBinding> = Rc::new(environment.method_of(id, &owner));
                Binding::Method(binding)
            }),
            NodeKind::VariableDeclarationFragment | NodeKind::SingleVariableDeclaration => {
                environment.variable_binding(id).map(Binding::Variable)
            }
            NodeKind::MethodInvocation | NodeKind::ClassInstanceCreation | NodeKind::ConstructorInvocation => {
                environment.resolve_invocation(id).map(Binding::Method)
            }
            NodeKind::SimpleType | NodeKind::QualifiedName | NodeKind::SimpleName | NodeKind::ParameterizedType
                if tree.role(id).is_type_reference() =>
            {
                environment
                    .lookup(&environment.type_name_of(id))
                    .map(Binding::Type)
            }
            NodeKind::SimpleName
                if matches!(
                    tree.role(id),
                    Role::Expression | Role::Argument | Role::Operand | Role::Initializer | Role::Element | Role::Condition
                ) =>
            {
                match environment.find_variable(environment.text_of(id), id) {
                    Some(VariableRef::Declaration(declaration)) => {
                        environment.variable_binding(declaration).map(Binding::Variable)
                    }
                    Some(VariableRef::Member(field)) => Some(Binding::Variable(field)),
                    None => None,
                }
            }
            _ => None,
        };
        if let Some(binding) = binding {
            result.push((id, binding));
        }
    }
    trace!(count = result.len(), "computed bindings");
    result
}

/// Bind the whole unit.
pub(crate) fn bind(tree: &mut AstTree, text: &str, class_path: &ClassPath) {
    let bindings = {
        let environment = TypeEnvironment::new(tree, text, class_path);
        compute_bindings(&environment, tree.root())
    };
    for (id, binding) in bindings {
        tree.set_binding(id, Some(binding));
    }
}

/// Bind a detached fragment whose text will be `source` at `base`.
pub(crate) fn bind_fragment(
    tree: &mut AstTree,
    text: &str,
    class_path: &ClassPath,
    fragment: NodeId,
    position: usize,
    base: usize,
    source: &str,
) {
    let bindings = {
        let environment = TypeEnvironment::new(tree, text, class_path).with_fragment(fragment, position, base, source);
        compute_bindings(&environment, fragment)
    };
    for (id, binding) in bindings {
        tree.set_binding(id, Some(binding));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;

    fn find(context: &CompilationContext, kind: NodeKind, source: &str) -> NodeId {
        let tree = context.tree();
        tree.descendants(tree.root())
            .into_iter()
            .find(|id| tree.kind(*id) == kind && node_text(tree, context.text(), *id) == source)
            .unwrap()
    }

    #[test]
    fn test_imports_and_package() {
        let context = CompilationContext::new(
            "package a.b;\nimport java.util.*;\nimport static java.lang.Math.max;\nimport java.awt.List;\nclass Test {}",
        )
        .unwrap();
        let imports = imports(context.tree(), context.text());
        assert_eq!(imports.len(), 3);
        assert_eq!((imports[0].name.as_str(), imports[0].on_demand), ("java.util", true));
        assert!(imports[1].is_static);
        assert_eq!(imports[1].name, "java.lang.Math.max");
        assert_eq!(imports[2].name, "java.awt.List");
        assert_eq!(package_name(context.tree(), context.text()), "a.b");
    }

    #[test]
    fn test_resolve_type_names() {
        let source = "package test;\nimport java.util.*;\nimport java.awt.List;\nclass Test {\n  class Inner {}\n  Inner a;\n  List b;\n  Map c;\n  String d;\n  Unknown e;\n}";
        let context = CompilationContext::new(source).unwrap();
        let tree = context.tree();
        let environment = TypeEnvironment::new(tree, context.text(), context.class_path());
        let field = |name: &str| {
            let fragment = context
                .variable_declarations_all()
                .into_iter()
                .find(|d| scope::declaration_name(tree, context.text(), *d) == Some(name))
                .unwrap();
            environment.variable_type(fragment).unwrap()
        };
        assert_eq!(field("a"), "test.Test.Inner");
        assert_eq!(field("b"), "java.awt.List");
        assert_eq!(field("c"), "java.util.Map");
        assert_eq!(field("d"), "java.lang.String");
        assert_eq!(field("e"), "Unknown");
    }

    #[test]
    fn test_bindings_of_declarations_and_invocations() {
        let source = "class Test extends java.awt.Container {\n  private int m_value;\n  void foo(String s) {\n    setEnabled(true);\n    bar(s, 1);\n    new java.awt.Button(\"x\");\n  }\n  int bar(String s, int i) {\n    return 0;\n  }\n}";
        let context = CompilationContext::new(source).unwrap();
        let tree = context.tree();

        let declaration = find(&context, NodeKind::TypeDeclaration, source);
        let binding = tree.binding(declaration).unwrap().as_type().unwrap();
        assert_eq!(binding.qualified_name(), "Test");
        assert_eq!(binding.superclass(), Some("java.awt.Container"));

        let call = find(&context, NodeKind::MethodInvocation, "setEnabled(true)");
        let method = tree.binding(call).unwrap().as_method().unwrap();
        assert_eq!(method.declaring_type(), "java.awt.Component");
        assert_eq!(method.signature(), "setEnabled(boolean)");

        let call = find(&context, NodeKind::MethodInvocation, "bar(s, 1)");
        let method = tree.binding(call).unwrap().as_method().unwrap();
        assert_eq!(method.signature(), "bar(java.lang.String,int)");
        assert_eq!(method.return_type(), "int");

        let creation = find(&context, NodeKind::ClassInstanceCreation, "new java.awt.Button(\"x\")");
        let constructor = tree.binding(creation).unwrap().as_method().unwrap();
        assert_eq!(constructor.signature(), "<init>(java.lang.String)");
    }

    #[test]
    fn test_unknown_types_stay_unbound() {
        let source = "class Test {\n  com.foo.Bar m_bar;\n  void foo() {\n    m_bar.baz();\n  }\n}";
        let context = CompilationContext::new(source).unwrap();
        let tree = context.tree();
        let call = find(&context, NodeKind::MethodInvocation, "m_bar.baz()");
        assert!(tree.binding(call).is_none());
        let type_node = find(&context, NodeKind::QualifiedName, "com.foo.Bar");
        assert!(tree.binding(type_node).is_none());
        let fragment = find(&context, NodeKind::VariableDeclarationFragment, "m_bar");
        let variable = tree.binding(fragment).unwrap().as_variable().unwrap();
        assert!(variable.is_field());
        assert_eq!(variable.type_name(), "com.foo.Bar");
    }

    #[test]
    fn test_subtypes_and_hierarchy() {
        let context = CompilationContext::new("class Test implements java.awt.event.ActionListener {}").unwrap();
        let environment = TypeEnvironment::new(context.tree(), context.text(), context.class_path());
        assert!(environment.is_subtype("Test", "java.util.EventListener"));
        assert!(environment.is_subtype("java.io.FileNotFoundException", "java.lang.Exception"));
        assert!(!environment.is_subtype("java.lang.Exception", "java.io.IOException"));
        assert!(environment.hierarchy_known("Test"));
    }
}
