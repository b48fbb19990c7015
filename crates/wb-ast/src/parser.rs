//! Parsing of caller-supplied source into detached, bound AST nodes.
//!
//! A fragment is never parsed on its own. It is written into a scaffolding
//! unit that repeats the package, the imports and the headers of the types
//! enclosing the anchor position, so tree-sitter sees it where it will live.
//! The node found in the scaffolding is lowered with its offsets moved to
//! where the fragment text is going to be inserted, then bound as if it
//! already sat at the anchor.

use crate::binding;
use crate::context::CompilationContext;
use crate::error::{AstError, ParseError};
use crate::lower::Lowerer;
use crate::node::{NodeId, NodeKind, Role};
use crate::resolve::{self, node_text, TypeEnvironment};
use crate::tree::AstTree;
use java_surgeon_core::validate;
use java_surgeon_lang::{java, registry, SupportedLanguage};
use std::collections::HashSet;
use tracing::{debug, trace};
use tree_sitter::Node;

const METHOD_NAME: &str = "__wbp_method";
const FIELD_NAME: &str = "__wbp_field";
const WRAPPER_NAME: &str = "__wbp_Scaffold";

/// Template for the class of the object the code runs in.
pub const CLASS_TEMPLATE: &str = "{wbp_class}";
/// Template for the class literal of the top-level type.
pub const CLASS_TOP_TEMPLATE: &str = "{wbp_classTop}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FragmentKind {
    Expression,
    Statement,
    BodyDeclaration,
    Type,
    Parameter,
}

impl FragmentKind {
    fn describe(self) -> &'static str {
        match self {
            FragmentKind::Expression => "expression",
            FragmentKind::Statement => "statement",
            FragmentKind::BodyDeclaration => "body declaration",
            FragmentKind::Type => "type",
            FragmentKind::Parameter => "variable",
        }
    }

    fn accepts(self, grammar: &str) -> bool {
        match self {
            FragmentKind::Expression => !java::is_statement(grammar) && !java::is_body_declaration(grammar),
            FragmentKind::Statement => java::is_statement(grammar),
            FragmentKind::BodyDeclaration => java::is_body_declaration(grammar),
            FragmentKind::Type => java::is_type(grammar),
            FragmentKind::Parameter => grammar == java::FORMAL_PARAMETER || grammar == java::SPREAD_PARAMETER,
        }
    }
}

/// A lowered fragment and the comments found in its text. The comments are
/// not registered with the unit until the text is inserted.
pub(crate) struct Parsed {
    pub node: NodeId,
    pub comments: Vec<NodeId>,
}

struct Scaffold {
    text: String,
    start: usize,
    end: usize,
}

impl CompilationContext {
    pub fn parse_expression(&mut self, position: usize, offset: usize, source: &str) -> Result<NodeId, ParseError> {
        self.parse_detached("parse_expression", FragmentKind::Expression, position, offset, source, |_, _| Ok(()))
    }

    pub fn parse_statement(&mut self, position: usize, offset: usize, source: &str) -> Result<NodeId, ParseError> {
        self.parse_detached("parse_statement", FragmentKind::Statement, position, offset, source, |_, _| Ok(()))
    }

    pub fn parse_body_declaration(&mut self, position: usize, offset: usize, source: &str) -> Result<NodeId, ParseError> {
        self.parse_detached(
            "parse_body_declaration",
            FragmentKind::BodyDeclaration,
            position,
            offset,
            source,
            |_, _| Ok(()),
        )
    }

    pub fn parse_type(&mut self, position: usize, offset: usize, source: &str) -> Result<NodeId, ParseError> {
        self.parse_detached("parse_type", FragmentKind::Type, position, offset, source, |_, _| Ok(()))
    }

    pub fn parse_simple_name(&mut self, position: usize, offset: usize, source: &str) -> Result<NodeId, ParseError> {
        self.parse_detached("parse_simple_name", FragmentKind::Expression, position, offset, source, |tree, node| {
            if tree.kind(node) == NodeKind::SimpleName {
                Ok(())
            } else {
                Err(format!("\"{source}\" is not a simple name"))
            }
        })
    }

    pub fn parse_qualified_name(&mut self, position: usize, offset: usize, source: &str) -> Result<NodeId, ParseError> {
        self.parse_detached("parse_qualified_name", FragmentKind::Expression, position, offset, source, |tree, node| {
            if tree.kind(node).is_name() {
                Ok(())
            } else {
                Err(format!("\"{source}\" is not a name"))
            }
        })
    }

    /// Parse `Type name` into a single variable declaration.
    pub fn parse_variable(&mut self, position: usize, offset: usize, source: &str) -> Result<NodeId, ParseError> {
        self.parse_detached("parse_variable", FragmentKind::Parameter, position, offset, source, |_, _| Ok(()))
    }

    /// Parse a detached fragment and run `check` on it. On failure the nodes
    /// lowered so far are dropped from the arena.
    fn parse_detached(
        &mut self,
        operation: &'static str,
        kind: FragmentKind,
        position: usize,
        offset: usize,
        source: &str,
        check: impl FnOnce(&AstTree, NodeId) -> Result<(), String>,
    ) -> Result<NodeId, ParseError> {
        self.transaction(operation, |context| {
            let node = context.parse_fragment(kind, position, offset, source)?.node;
            check(&context.tree, node).map_err(|diagnostic| ParseError::new(source, diagnostic))?;
            Ok(node)
        })
        .map_err(|error| match error {
            AstError::Parse(error) => error,
            other => ParseError::new(source, other.to_string()),
        })
    }

    /// Replace the class templates in `source` for code placed at `position`.
    pub fn expand_templates(&self, position: usize, source: &str) -> String {
        if !source.contains(CLASS_TEMPLATE) && !source.contains(CLASS_TOP_TEMPLATE) {
            return source.to_string();
        }
        let environment = TypeEnvironment::new(&self.tree, self.buffer.text(), &self.class_path);
        let anchor = self.tree.enclosing_node(position).unwrap_or(self.tree.root());
        let types = environment.enclosing_types(anchor);
        let relative = |name: &str| {
            let package = environment.package();
            match name.strip_prefix(package).and_then(|n| n.strip_prefix('.')) {
                Some(name) if !package.is_empty() => name.to_string(),
                _ => name.to_string(),
            }
        };
        let top = types.last().map(|t| format!("{}.class", relative(t))).unwrap_or_default();
        let current = if environment.in_static_context(anchor) {
            types.first().map(|t| format!("{}.class", relative(t))).unwrap_or_default()
        } else {
            "getClass()".to_string()
        };
        source.replace(CLASS_TOP_TEMPLATE, &top).replace(CLASS_TEMPLATE, &current)
    }

    /// Parse `source` as a `kind` fragment resolved at `position`, with its
    /// trimmed text starting at `offset + leading whitespace`.
    pub(crate) fn parse_fragment(
        &mut self,
        kind: FragmentKind,
        position: usize,
        offset: usize,
        source: &str,
    ) -> Result<Parsed, ParseError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(ParseError::new(source, format!("Empty {}", kind.describe())));
        }
        let base = offset + (source.len() - source.trim_start().len());
        let scaffold = self.scaffold(kind, position, trimmed);
        trace!(kind = kind.describe(), position, scaffold = %scaffold.text, "parse fragment");

        let parsed = registry::parse(SupportedLanguage::Java, &scaffold.text)
            .map_err(|e| ParseError::new(scaffold.text.clone(), e.to_string()))?;
        let errors = validate::syntax_errors(&parsed, &scaffold.text);
        if !errors.is_empty() {
            debug!(count = errors.len(), "fragment has syntax errors");
            return Err(ParseError::new(scaffold.text.clone(), validate::describe(&errors)));
        }

        let root = parsed.root_node();
        let (node, comments) = locate(root, &scaffold).ok_or_else(|| {
            ParseError::new(scaffold.text.clone(), format!("Expected a single {}", kind.describe()))
        })?;
        if !kind.accepts(node.kind()) {
            return Err(ParseError::new(
                scaffold.text.clone(),
                format!("Expected a {}, found {}", kind.describe(), node.kind()),
            ));
        }

        let shift = base as isize - scaffold.start as isize;
        let (id, comments) = {
            let mut lowerer = Lowerer::new(&mut self.tree, &scaffold.text, shift);
            let javadoc = match kind {
                FragmentKind::BodyDeclaration => comments
                    .iter()
                    .copied()
                    .filter(|c| c.end_byte() <= node.start_byte())
                    .next_back()
                    .filter(|c| is_javadoc(*c, &scaffold.text)),
                _ => None,
            };
            let id = match kind {
                FragmentKind::BodyDeclaration => lowerer.lower_member(node, javadoc),
                FragmentKind::Statement => lowerer.lower_detached(node, Role::Statement),
                FragmentKind::Expression => lowerer.lower_detached(node, Role::Expression),
                FragmentKind::Type => lowerer.lower_detached(node, Role::Type),
                FragmentKind::Parameter => lowerer.lower_detached(node, Role::Parameter),
            };
            for comment in comments.iter().filter(|c| Some(**c) != javadoc) {
                lowerer.lower_comment(*comment);
            }
            (id, lowerer.into_comments())
        };
        let id = id.ok_or_else(|| ParseError::new(scaffold.text.clone(), format!("Unsupported {}", kind.describe())))?;

        resolve::bind_fragment(
            &mut self.tree,
            self.buffer.text(),
            &self.class_path,
            id,
            position,
            base,
            trimmed,
        );
        self.check_invocations(id, position, base, trimmed)
            .map_err(|diagnostic| ParseError::new(scaffold.text.clone(), diagnostic))?;
        Ok(Parsed { node: id, comments })
    }

    fn scaffold(&self, kind: FragmentKind, position: usize, source: &str) -> Scaffold {
        let tree = &self.tree;
        let text = self.buffer.text();
        let root = tree.root();
        let mut unit = String::new();
        if let Some(package) = tree.child_with_role(root, Role::Package) {
            unit.push_str(node_text(tree, text, package));
            unit.push('\n');
        }
        for import in tree.children_with_role(root, Role::Import) {
            unit.push_str(node_text(tree, text, import));
            unit.push('\n');
        }

        let anchor = tree.enclosing_node(position).unwrap_or(root);
        let mut types: Vec<NodeId> = tree
            .ancestors(anchor)
            .filter(|id| tree.kind(*id).is_type_declaration())
            .collect();
        types.reverse();
        let wrapped = types.is_empty() && kind != FragmentKind::BodyDeclaration;
        if wrapped {
            unit.push_str("class ");
            unit.push_str(WRAPPER_NAME);
            unit.push_str(" {\n");
        }
        for declaration in &types {
            unit.push_str(&self.type_header(*declaration));
            unit.push('\n');
            if tree.kind(*declaration) == NodeKind::EnumDeclaration {
                unit.push_str(";\n");
            }
        }

        let environment = TypeEnvironment::new(tree, text, &self.class_path);
        let opener = match types.last() {
            _ if environment.in_static_context(anchor) => format!("static void {METHOD_NAME}() {{\n"),
            Some(innermost) if is_interface(tree.node(*innermost).grammar) => {
                format!("default void {METHOD_NAME}() {{\n")
            }
            Some(innermost) => format!("{}() {{\n", environment.name_of(*innermost).unwrap_or(WRAPPER_NAME)),
            None => format!("{WRAPPER_NAME}() {{\n"),
        };
        let (prefix, suffix) = match kind {
            FragmentKind::Expression => (
                format!("{opener}java.lang.System.out.println("),
                ");\n}\n".to_string(),
            ),
            FragmentKind::Statement => (opener, "\n}\n".to_string()),
            FragmentKind::BodyDeclaration => (String::new(), "\n".to_string()),
            FragmentKind::Type => (String::new(), format!(" {FIELD_NAME};\n")),
            FragmentKind::Parameter => (format!("void {METHOD_NAME}("), ") {\n}\n".to_string()),
        };
        unit.push_str(&prefix);
        let start = unit.len();
        unit.push_str(source);
        let end = unit.len();
        unit.push_str(&suffix);
        for _ in 0..types.len() + usize::from(wrapped) {
            unit.push_str("}\n");
        }
        Scaffold { text: unit, start, end }
    }

    /// Header of a type declaration up to and including its opening brace,
    /// without the Javadoc.
    fn type_header(&self, declaration: NodeId) -> String {
        let tree = &self.tree;
        let text = self.buffer.text();
        let start = tree
            .child_with_role(declaration, Role::Javadoc)
            .map_or(tree.start(declaration), |javadoc| tree.end(javadoc));
        let name_end = tree
            .child_with_role(declaration, Role::Name)
            .map_or(start, |name| tree.end(name));
        let open = text
            .get(name_end..tree.end(declaration))
            .and_then(|rest| rest.find('{'))
            .map_or(tree.end(declaration), |i| name_end + i + 1);
        text.get(start..open).unwrap_or_default().to_string()
    }

    /// Reports an unqualified invocation of a method that none of the
    /// enclosing types has, when their hierarchies are fully known.
    fn check_invocations(&self, fragment: NodeId, position: usize, base: usize, source: &str) -> Result<(), String> {
        let tree = &self.tree;
        let environment = TypeEnvironment::new(tree, self.buffer.text(), &self.class_path)
            .with_fragment(fragment, position, base, source);
        if environment.imports().iter().any(|i| i.is_static) {
            return Ok(());
        }
        let declared_here: HashSet<&str> = tree
            .descendants(fragment)
            .into_iter()
            .filter(|id| tree.kind(*id) == NodeKind::MethodDeclaration)
            .filter_map(|id| environment.name_of(id))
            .collect();

        for id in tree.descendants(fragment) {
            if tree.kind(id) != NodeKind::MethodInvocation
                || tree.binding(id).is_some()
                || tree.child_with_role(id, Role::Expression).is_some()
            {
                continue;
            }
            let local_type = tree.ancestors(id).skip(1).any(|a| {
                tree.kind(a) == NodeKind::AnonymousClassDeclaration || tree.kind(a).is_type_declaration()
            });
            if local_type {
                continue;
            }
            let Some(name) = tree.child_with_role(id, Role::Name).map(|n| environment.text_of(n)) else {
                continue;
            };
            if declared_here.contains(name) {
                continue;
            }
            let owners = environment.enclosing_types(id);
            if owners.is_empty() || !owners.iter().all(|o| environment.hierarchy_known(o)) {
                continue;
            }
            let exists = owners
                .iter()
                .any(|o| environment.methods_in_hierarchy(o).iter().any(|m| m.name() == name));
            if exists {
                continue;
            }
            let arguments: Vec<String> = tree
                .children_with_role(id, Role::Argument)
                .into_iter()
                .map(|a| {
                    environment
                        .expression_type(a)
                        .map_or_else(|| "Object".to_string(), |t| binding::simple_name(&t).to_string())
                })
                .collect();
            return Err(format!(
                "The method {name}({}) is undefined for the type {}",
                arguments.join(", "),
                binding::simple_name(&owners[0])
            ));
        }
        Ok(())
    }
}

fn is_interface(grammar: &str) -> bool {
    grammar == java::INTERFACE_DECLARATION || grammar == java::ANNOTATION_TYPE_DECLARATION
}

fn is_javadoc(node: Node, text: &str) -> bool {
    let source = text.get(node.start_byte()..node.end_byte()).unwrap_or_default();
    node.kind() == java::BLOCK_COMMENT && source.starts_with("/**") && source != "/**/"
}

/// The one node the fragment text parsed into, and comments around it.
fn locate<'t>(root: Node<'t>, scaffold: &Scaffold) -> Option<(Node<'t>, Vec<Node<'t>>)> {
    let found = root.named_descendant_for_byte_range(scaffold.start, scaffold.end)?;
    if found.start_byte() == scaffold.start && found.end_byte() == scaffold.end && !java::is_comment(found.kind()) {
        return Some((found, Vec::new()));
    }
    let mut cursor = found.walk();
    let inside: Vec<Node> = found
        .named_children(&mut cursor)
        .filter(|c| c.start_byte() >= scaffold.start && c.end_byte() <= scaffold.end)
        .collect();
    let (comments, nodes): (Vec<Node>, Vec<Node>) = inside.into_iter().partition(|c| java::is_comment(c.kind()));
    match nodes.as_slice() {
        [node] => Some((*node, comments)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package test;
class Test extends java.awt.Container {
  private int m_value;
  void foo() {
    int a;
  }
  static void bar() {
    int b;
  }
  class Inner {
    void baz() {
      int c;
    }
  }
}";

    fn context() -> CompilationContext {
        CompilationContext::new(SOURCE).unwrap()
    }

    fn at(needle: &str) -> usize {
        SOURCE.find(needle).unwrap()
    }

    #[test]
    fn test_statement_range_follows_offset() {
        let mut context = context();
        let position = at("int a");
        let node = context.parse_statement(position, 100, "  setEnabled(false);\n").unwrap();
        let tree = context.tree();
        assert_eq!(tree.kind(node), NodeKind::ExpressionStatement);
        assert_eq!(tree.start(node), 102);
        assert_eq!(tree.length(node), "setEnabled(false);".len());
        assert!(tree.is_dangling(node));
        let invocation = tree.child_with_role(node, Role::Expression).unwrap();
        let method = tree.binding(invocation).unwrap().as_method().unwrap();
        assert_eq!(method.declaring_type(), "java.awt.Component");
    }

    #[test]
    fn test_expression_sees_fields() {
        let mut context = context();
        let node = context.parse_expression(at("int a"), 0, "m_value").unwrap();
        let variable = context.tree().binding(node).unwrap().as_variable().unwrap();
        assert!(variable.is_field());
        assert_eq!(variable.type_name(), "int");
    }

    #[test]
    fn test_syntax_error_keeps_scaffolding() {
        let mut context = context();
        let error = context.parse_statement(at("int a"), 0, "int x = ;").unwrap_err();
        assert!(error.fragment.contains("class Test extends java.awt.Container {"));
        assert!(error.fragment.contains("int x = ;"));
        assert!(error.fragment.starts_with("package test;"));
        assert!(!error.diagnostic.is_empty());
    }

    #[test]
    fn test_undefined_method() {
        let mut context = context();
        let error = context.parse_statement(at("int a"), 0, "qwerty(1, \"s\");").unwrap_err();
        assert_eq!(
            error.diagnostic,
            "The method qwerty(int, String) is undefined for the type Test"
        );
        assert!(context.parse_statement(at("int a"), 0, "foo();").is_ok());
        assert!(context.parse_statement(at("int c"), 0, "foo();").is_ok());
    }

    #[test]
    fn test_unknown_hierarchy_allows_any_method() {
        let mut context = CompilationContext::new("class Test extends com.foo.Base {\n  void foo() {\n    int a;\n  }\n}").unwrap();
        let position = context.text().find("int a").unwrap();
        let node = context.parse_statement(position, 0, "qwerty();").unwrap();
        let invocation = context.tree().child_with_role(node, Role::Expression).unwrap();
        assert!(context.tree().binding(invocation).is_none());
    }

    #[test]
    fn test_static_context() {
        let mut context = context();
        let error = context.parse_statement(at("int b"), 0, "int = ;").unwrap_err();
        assert!(error.fragment.contains("static void __wbp_method() {"));
        assert!(context.parse_statement(at("int b"), 0, "bar();").is_ok());
        let error = context.parse_statement(at("int a"), 0, "int = ;").unwrap_err();
        assert!(error.fragment.contains("Test() {"));
    }

    #[test]
    fn test_body_declaration_with_javadoc() {
        let mut context = context();
        let source = "/**\n * Doc.\n */\nvoid qux() {\n  // inner\n}";
        let parsed = context
            .parse_fragment(FragmentKind::BodyDeclaration, at("private"), 10, source)
            .unwrap();
        let tree = context.tree();
        assert_eq!(tree.kind(parsed.node), NodeKind::MethodDeclaration);
        assert_eq!(tree.start(parsed.node), 10);
        assert_eq!(tree.length(parsed.node), source.len());
        let javadoc = tree.child_with_role(parsed.node, Role::Javadoc).unwrap();
        assert_eq!(tree.start(javadoc), 10);
        assert_eq!(parsed.comments.len(), 2);
    }

    #[test]
    fn test_types_and_names() {
        let mut context = context();
        let node = context.parse_type(at("private"), 0, "java.util.List<String>").unwrap();
        assert_eq!(context.tree().kind(node), NodeKind::ParameterizedType);
        assert!(context.parse_simple_name(at("int a"), 0, "a.b").is_err());
        let name = context.parse_qualified_name(at("int a"), 0, "a.b").unwrap();
        assert_eq!(context.tree().kind(name), NodeKind::QualifiedName);
        let variable = context.parse_variable(at("int a"), 0, "String text").unwrap();
        assert_eq!(context.tree().kind(variable), NodeKind::SingleVariableDeclaration);
        assert!(context.tree().binding(variable).unwrap().as_variable().is_some());
    }

    #[test]
    fn test_header_of_type_without_modifiers() {
        let source = "/** Doc. */\nclass Test {\n  void foo() {\n    int a;\n  }\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let position = source.find("int a").unwrap();
        assert!(context.parse_statement(position, 0, "int b = 1;").is_ok());
        let error = context.parse_statement(position, 0, "int x = ;").unwrap_err();
        assert!(error.fragment.contains("class Test {"));
        assert!(!error.fragment.contains("Doc."));
    }

    #[test]
    fn test_failed_parse_drops_nodes() {
        let mut context = context();
        let nodes = context.tree().len();
        assert!(context.parse_statement(at("int a"), 0, "int x = ;").is_err());
        assert!(context.parse_statement(at("int a"), 0, "qwerty();").is_err());
        assert!(context.parse_simple_name(at("int a"), 0, "a.b").is_err());
        assert_eq!(context.tree().len(), nodes);
        context.parse_simple_name(at("int a"), 0, "a").unwrap();
        assert!(context.tree().len() > nodes);
    }

    #[test]
    fn test_wrong_fragment_kind() {
        let mut context = context();
        assert!(context.parse_statement(at("int a"), 0, "int a; int b;").is_err());
        assert!(context.parse_expression(at("int a"), 0, "  ").is_err());
    }

    #[test]
    fn test_enum_and_interface_contexts() {
        let source = "enum E {\n  A, B;\n  void foo() {\n    int a;\n  }\n}\ninterface I {\n  void bar();\n}";
        let mut context = CompilationContext::new(source).unwrap();
        let position = source.find("int a").unwrap();
        assert!(context.parse_statement(position, 0, "foo();").is_ok());
        let position = source.find("void bar").unwrap();
        let method = context.parse_body_declaration(position, 0, "void baz();").unwrap();
        assert_eq!(context.tree().kind(method), NodeKind::MethodDeclaration);
    }

    #[test]
    fn test_templates() {
        let context = context();
        assert_eq!(context.expand_templates(at("int a"), "{wbp_class}"), "getClass()");
        assert_eq!(context.expand_templates(at("int b"), "{wbp_class}"), "Test.class");
        assert_eq!(context.expand_templates(at("int c"), "{wbp_classTop}"), "Test.class");
        assert_eq!(context.expand_templates(at("int c"), "f({wbp_class})"), "f(getClass())");
    }
}
