//! The editable compilation unit.
//!
//! A `CompilationContext` owns the source buffer, the AST arena lowered from
//! it, the class path the arena is bound against and, optionally, the
//! storage the text is committed to. All editor operations are methods on
//! it; there is no ambient "current unit".

use crate::binding::{ClassPath, TypeBinding};
use crate::config::EditorConfig;
use crate::error::{AstError, ParseError};
use crate::lower::Lowerer;
use crate::node::{NodeId, NodeKind, Role};
use crate::resolve::{self, TypeEnvironment};
use crate::tree::AstTree;
use java_surgeon_core::{scan, validate, SourceBuffer, TextEdit};
use java_surgeon_lang::{registry, SupportedLanguage};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wb_store::{CommitListener, CommitOutcome, PersistedStorage};

pub struct CompilationContext {
    pub(crate) buffer: SourceBuffer,
    pub(crate) tree: AstTree,
    pub(crate) class_path: Rc<ClassPath>,
    config: EditorConfig,
    storage: Option<Box<dyn PersistedStorage>>,
    listener: Option<Box<dyn CommitListener>>,
    /// Editor text at the last commit.
    committed: String,
    /// Nesting depth of running editor operations.
    depth: usize,
}

impl fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationContext")
            .field("length", &self.buffer.len())
            .field("edits", &self.buffer.edits().len())
            .field("nodes", &self.tree.len())
            .field("has_storage", &self.storage.is_some())
            .finish()
    }
}

impl CompilationContext {
    /// A unit over `source`, bound against the built-in JDK subset.
    pub fn new(source: impl Into<String>) -> Result<Self, AstError> {
        Self::with_class_path(source, Rc::new(ClassPath::with_jdk()))
    }

    pub fn with_class_path(source: impl Into<String>, class_path: Rc<ClassPath>) -> Result<Self, AstError> {
        let source = source.into();
        let mut context = Self {
            config: EditorConfig::detect(&source),
            buffer: SourceBuffer::new(source.clone()),
            tree: AstTree::new(source.len()),
            class_path,
            storage: None,
            listener: None,
            committed: source,
            depth: 0,
        };
        context.reparse()?;
        Ok(context)
    }

    /// A unit over the current text of `storage`, committed back into it.
    pub fn from_storage(storage: Box<dyn PersistedStorage>, class_path: Rc<ClassPath>) -> Result<Self, AstError> {
        let source = storage.current_text()?;
        let mut context = Self::with_class_path(source, class_path)?;
        context.storage = Some(storage);
        Ok(context)
    }

    /// Rebuild the tree and bindings from the current text. Node ids handed
    /// out before are invalid afterwards.
    pub fn reparse(&mut self) -> Result<(), AstError> {
        let text = self.buffer.text();
        let parsed = registry::parse(SupportedLanguage::Java, text).map_err(|e| ParseError::new(text, e.to_string()))?;
        let errors = validate::syntax_errors(&parsed, text);
        if !errors.is_empty() {
            warn!(count = errors.len(), first = %errors[0], "unit has syntax errors");
        }

        let mut tree = AstTree::new(text.len());
        let comments = {
            let mut lowerer = Lowerer::new(&mut tree, text, 0);
            lowerer.lower_program(parsed.root_node());
            lowerer.into_comments()
        };
        for comment in comments {
            tree.register_comment(comment);
        }
        resolve::bind(&mut tree, text, &self.class_path);
        debug!(nodes = tree.len(), comments = tree.raw_comments().len(), "parsed unit");
        self.tree = tree;
        Ok(())
    }

    // ── state ──────────────────────────────────────────────────────────

    /// The current text.
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn tree(&self) -> &AstTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut AstTree {
        &mut self.tree
    }

    pub fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    /// Edits recorded against the text the unit was created from.
    pub fn edits(&self) -> &[TextEdit] {
        self.buffer.edits()
    }

    pub fn class_path(&self) -> &ClassPath {
        &self.class_path
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    /// Turn shortening of qualified type names on or off.
    pub fn set_resolve_imports(&mut self, resolve_imports: bool) {
        self.config.resolve_imports = resolve_imports;
    }

    pub fn set_listener(&mut self, listener: Box<dyn CommitListener>) {
        self.listener = Some(listener);
    }

    pub fn storage(&self) -> Option<&dyn PersistedStorage> {
        match &self.storage {
            Some(storage) => Some(storage.as_ref()),
            None => None,
        }
    }

    pub fn lookup_type(&self, qualified_name: &str) -> Option<Rc<dyn TypeBinding>> {
        self.environment().lookup(qualified_name)
    }

    pub(crate) fn environment(&self) -> TypeEnvironment<'_> {
        TypeEnvironment::new(&self.tree, self.buffer.text(), &self.class_path)
    }

    /// Run `operation` as one transaction: on error the text and the tree
    /// are restored to what they were before the outermost call.
    pub(crate) fn transaction<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, AstError>,
    ) -> Result<T, AstError> {
        if self.depth > 0 {
            return f(self);
        }
        let snapshot = (self.buffer.clone(), self.tree.clone());
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if let Err(e) = &result {
            debug!(operation, error = %e, "operation failed, state restored");
            (self.buffer, self.tree) = snapshot;
        }
        result
    }

    // ── queries ────────────────────────────────────────────────────────

    pub fn char_at(&self, offset: usize) -> Result<char, AstError> {
        Ok(self.buffer.char_at(offset)?)
    }

    /// Zero-based line of `offset`.
    pub fn line_number(&self, offset: usize) -> usize {
        scan::line_number(self.text(), offset)
    }

    pub fn node_source(&self, id: NodeId) -> &str {
        resolve::node_text(&self.tree, self.buffer.text(), id)
    }

    /// The deepest node covering `offset`.
    pub fn enclosing_node(&self, offset: usize) -> Option<NodeId> {
        self.tree.enclosing_node(offset)
    }

    pub fn enclosing_statement(&self, offset: usize) -> Option<NodeId> {
        let node = self.tree.enclosing_node(offset)?;
        self.tree.find_ancestor(node, NodeKind::is_statement)
    }

    pub fn enclosing_block(&self, offset: usize) -> Option<NodeId> {
        let node = self.tree.enclosing_node(offset)?;
        self.tree.find_ancestor(node, |k| k == NodeKind::Block)
    }

    pub fn enclosing_method(&self, offset: usize) -> Option<NodeId> {
        let node = self.tree.enclosing_node(offset)?;
        self.tree.find_ancestor(node, |k| k == NodeKind::MethodDeclaration)
    }

    pub fn enclosing_type(&self, offset: usize) -> Option<NodeId> {
        let node = self.tree.enclosing_node(offset)?;
        self.tree.find_ancestor(node, NodeKind::is_type_declaration)
    }

    /// The public top-level type, or the first one.
    pub fn primary_type(&self) -> Option<NodeId> {
        let types = self.tree.children_with_role(self.tree.root(), Role::TypeDeclaration);
        types
            .iter()
            .copied()
            .find(|t| resolve::has_modifier(&self.tree, self.text(), *t, "public"))
            .or_else(|| types.first().copied())
    }

    /// Statement that `node` belongs to.
    pub(crate) fn statement_of(&self, node: NodeId) -> Option<NodeId> {
        self.tree.find_ancestor(node, NodeKind::is_statement)
    }

    // ── storage ────────────────────────────────────────────────────────

    /// Write the difference between the last committed text and the current
    /// text into the storage, through the listener protocol.
    pub fn commit_changes(&mut self) -> Result<CommitOutcome, AstError> {
        let storage = self.storage.as_deref_mut().ok_or_else(|| AstError::assertion("unit has no storage"))?;
        let listener: Option<&mut dyn CommitListener> = match self.listener.as_deref_mut() {
            Some(listener) => Some(listener),
            None => None,
        };
        let text = self.buffer.text();
        let outcome = wb_store::commit_changes(storage, listener, &self.committed, text)?;
        if outcome != CommitOutcome::Rejected {
            self.committed = text.to_string();
        }
        info!(?outcome, "commit finished");
        Ok(outcome)
    }

    /// Commit, then save the storage when `force` is set or no other editor
    /// holds it as a working copy.
    pub fn save_changes(&mut self, force: bool) -> Result<CommitOutcome, AstError> {
        let storage = self.storage.as_deref_mut().ok_or_else(|| AstError::assertion("unit has no storage"))?;
        let listener: Option<&mut dyn CommitListener> = match self.listener.as_deref_mut() {
            Some(listener) => Some(listener),
            None => None,
        };
        let text = self.buffer.text();
        let outcome = wb_store::save_changes(storage, listener, &self.committed, text, force)?;
        if outcome != CommitOutcome::Rejected {
            self.committed = text.to_string();
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use wb_store::MemoryStorage;

    const SOURCE: &str = "package test;
public class Test {
  void foo() {
    int a;
    {
      int b;
    }
  }
}
class Second {
}";

    #[test]
    fn test_queries() {
        let context = CompilationContext::new(SOURCE).unwrap();
        let position = SOURCE.find("int b").unwrap();
        let statement = context.enclosing_statement(position).unwrap();
        assert_eq!(context.node_source(statement), "int b;");
        let block = context.enclosing_block(position).unwrap();
        assert!(context.node_source(block).starts_with("{\n      int b;"));
        let method = context.enclosing_method(position).unwrap();
        assert!(context.node_source(method).starts_with("void foo()"));
        let type_declaration = context.enclosing_type(position).unwrap();
        assert_eq!(context.primary_type(), Some(type_declaration));
        assert_eq!(context.line_number(position), 5);
        assert_eq!(context.char_at(position).unwrap(), 'i');
        assert!(context.char_at(SOURCE.len() + 1).is_err());
        assert_eq!(context.enclosing_node(SOURCE.len() + 10), None);
    }

    #[test]
    fn test_transaction_restores_state() {
        let mut context = CompilationContext::new(SOURCE).unwrap();
        let nodes = context.tree().len();
        let result: Result<(), AstError> = context.transaction("test", |context| {
            context.buffer.replace(0, 7, "")?;
            context.tree.update_for_replace(&[], 0, 7, 0);
            Err(AstError::assertion("boom"))
        });
        assert!(result.is_err());
        assert_eq!(context.text(), SOURCE);
        assert_eq!(context.tree().len(), nodes);
        assert!(context.edits().is_empty());
    }

    #[test]
    fn test_commit_without_storage() {
        let mut context = CompilationContext::new(SOURCE).unwrap();
        let error = context.commit_changes().unwrap_err();
        assert_eq!(error.code(), crate::error::ErrorCode::Assertion);
    }

    #[derive(Clone, Default)]
    struct Events(Rc<RefCell<Vec<&'static str>>>);

    impl CommitListener for Events {
        fn about_to_commit(&mut self) {
            self.0.borrow_mut().push("about");
        }

        fn commit_done(&mut self) {
            self.0.borrow_mut().push("done");
        }
    }

    #[test]
    fn test_commit_into_memory_storage() {
        let storage = Box::new(MemoryStorage::new(SOURCE));
        let mut context = CompilationContext::from_storage(storage, Rc::new(ClassPath::with_jdk())).unwrap();
        let events = Events::default();
        context.set_listener(Box::new(events.clone()));

        assert_eq!(context.commit_changes().unwrap(), CommitOutcome::Unchanged);
        context.buffer.replace(0, "package test;".len(), "package other;").unwrap();
        let outcome = context.save_changes(false).unwrap();
        assert!(matches!(outcome, CommitOutcome::Written(_)));
        let storage = context.storage().unwrap();
        assert!(storage.current_text().unwrap().starts_with("package other;"));
        assert!(storage.is_consistent_with_memory());
        assert_eq!(*events.0.borrow(), vec!["about", "done", "about", "done"]);
    }

    #[test]
    fn test_reparse_keeps_text() {
        let mut context = CompilationContext::new(SOURCE).unwrap();
        context.reparse().unwrap();
        assert_eq!(context.tree().children_with_role(context.tree().root(), Role::TypeDeclaration).len(), 2);
        assert_eq!(context.config().indent, "  ");
    }
}
