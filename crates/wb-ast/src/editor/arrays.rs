//! Elements of array initializers.

use crate::context::CompilationContext;
use crate::error::AstError;
use crate::node::{NodeId, NodeKind, Role};
use crate::parser::FragmentKind;
use tracing::debug;

impl CompilationContext {
    /// Insert the expression `source` as element `index` of `initializer`.
    pub fn add_array_element(&mut self, initializer: NodeId, index: usize, source: &str) -> Result<NodeId, AstError> {
        self.transaction("add_array_element", |context| {
            context.expect_initializer(initializer)?;
            let source = source.trim();
            let elements = context.tree.children_with_role(initializer, Role::Element);
            let close = context.tree.end(initializer) - 1;
            let position = context.insert_list_item(&elements, index, close, source)?;
            let parsed = context.parse_lines(FragmentKind::Expression, position, position, source, &[source])?;
            let element = context.attach(initializer, Role::Element, index, parsed);
            context.shorten_type_names(element)
        })
    }

    /// Remove element `index` of `initializer`. A missing element is ignored.
    pub fn remove_array_element(&mut self, initializer: NodeId, index: usize) -> Result<(), AstError> {
        self.transaction("remove_array_element", |context| {
            let elements = context.elements(initializer, &[])?;
            if index >= elements.len() {
                return Ok(());
            }
            context.remove_list_item(&elements, index, "}")?;
            debug!(%initializer, index, "removed element");
            Ok(())
        })
    }

    /// Move element `old_index` of `old_initializer` to position `new_index`
    /// of `new_initializer`, which may be the same array. Returns the moved
    /// element.
    pub fn move_array_element(
        &mut self,
        old_initializer: NodeId,
        new_initializer: NodeId,
        old_index: usize,
        new_index: usize,
    ) -> Result<NodeId, AstError> {
        self.transaction("move_array_element", |context| {
            let elements = context.elements(old_initializer, &[old_index])?;
            context.expect_initializer(new_initializer)?;
            let element = elements[old_index];
            let source = context.node_source(element).to_string();
            context.remove_list_item(&elements, old_index, "}")?;

            let elements = context.tree.children_with_role(new_initializer, Role::Element);
            let close = context.tree.end(new_initializer) - 1;
            let position = context.insert_list_item(&elements, new_index, close, &source)?;
            context.tree.insert_child_in_role(new_initializer, Role::Element, new_index, element);
            context.tree.move_node(element, position);
            debug!(%element, old_index, new_index, "moved element");
            Ok(element)
        })
    }

    /// Swap two elements of `initializer`, text and nodes.
    pub fn exchange_array_elements(&mut self, initializer: NodeId, index_1: usize, index_2: usize) -> Result<(), AstError> {
        self.transaction("exchange_array_elements", |context| {
            let elements = context.elements(initializer, &[index_1, index_2])?;
            if index_1 == index_2 {
                return Ok(());
            }
            let (low, high) = (index_1.min(index_2), index_1.max(index_2));
            let (first, second) = (elements[low], elements[high]);
            let (first_start, first_length) = (context.tree.start(first), context.tree.length(first));
            let (second_start, second_length) = (context.tree.start(second), context.tree.length(second));
            let first_source = context.node_source(first).to_string();
            let second_source = context.node_source(second).to_string();

            context.tree.detach(first);
            context.tree.detach(second);
            context.replace_text(second_start, second_length, &first_source)?;
            context.replace_text(first_start, first_length, &second_source)?;
            let moved_start = second_start + second_length - first_length;
            context.tree.move_node(first, moved_start);
            context.tree.move_node(second, first_start);
            context.tree.insert_child_in_role(initializer, Role::Element, low, second);
            context.tree.insert_child_in_role(initializer, Role::Element, high, first);
            debug!(%initializer, low, high, "exchanged elements");
            Ok(())
        })
    }

    fn expect_initializer(&self, initializer: NodeId) -> Result<(), AstError> {
        match self.tree.kind(initializer) {
            NodeKind::ArrayInitializer => Ok(()),
            kind => Err(AstError::assertion(format!("{kind:?} is not an array initializer"))),
        }
    }

    /// Elements of `initializer`, checking that each of `indexes` exists.
    fn elements(&self, initializer: NodeId, indexes: &[usize]) -> Result<Vec<NodeId>, AstError> {
        self.expect_initializer(initializer)?;
        let elements = self.tree.children_with_role(initializer, Role::Element);
        match indexes.iter().find(|i| **i >= elements.len()) {
            Some(index) => Err(AstError::assertion(format!("{initializer} has no element {index}"))),
            None => Ok(elements),
        }
    }
}
