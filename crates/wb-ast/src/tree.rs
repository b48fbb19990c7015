//! Arena of AST nodes with the central source-range bookkeeping.
//!
//! Every text edit made through the editor is mirrored here: node ranges are
//! shifted, grown or shrunk so that they keep covering the same text.

use crate::binding::Binding;
use crate::node::{NodeData, NodeId, NodeKind, Role};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct AstTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    /// Comment nodes in source order; Javadoc nodes are also tree children.
    comments: Vec<NodeId>,
    removed_comments: HashSet<NodeId>,
}

impl AstTree {
    /// A tree holding only a compilation unit covering `length` bytes.
    pub fn new(length: usize) -> Self {
        let root = NodeData::new(NodeKind::CompilationUnit, "program", Role::Root, 0, length);
        Self {
            nodes: vec![root],
            root: NodeId(0),
            comments: Vec::new(),
            removed_comments: HashSet::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn role(&self, id: NodeId) -> Role {
        self.node(id).role
    }

    pub fn start(&self, id: NodeId) -> usize {
        self.node(id).start
    }

    pub fn length(&self, id: NodeId) -> usize {
        self.node(id).length
    }

    pub fn end(&self, id: NodeId) -> usize {
        self.node(id).end()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn binding(&self, id: NodeId) -> Option<&Binding> {
        self.node(id).binding.as_ref()
    }

    pub fn children_with_role(&self, id: NodeId, role: Role) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.role(*child) == role)
            .collect()
    }

    pub fn child_with_role(&self, id: NodeId, role: Role) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.role(*child) == role)
    }

    /// Index of `id` among the siblings sharing its role.
    pub fn index_in_role(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children_with_role(parent, self.role(id))
            .iter()
            .position(|sibling| *sibling == id)
    }

    /// `id` and its ancestors, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent(*current))
    }

    /// `id` and all nodes below it, in preorder.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// True once the node, or one of its ancestors, is no longer attached
    /// to the compilation unit.
    pub fn is_dangling(&self, id: NodeId) -> bool {
        self.ancestors(id).last() != Some(self.root)
    }

    /// The deepest node with `start <= offset < end`.
    pub fn enclosing_node(&self, offset: usize) -> Option<NodeId> {
        let covers = |id: NodeId| self.start(id) <= offset && offset < self.end(id);
        if !covers(self.root) {
            return None;
        }
        let mut current = self.root;
        while let Some(child) = self.children(current).iter().copied().find(|c| covers(*c)) {
            current = child;
        }
        Some(current)
    }

    /// Nearest ancestor-or-self matching `predicate`.
    pub fn find_ancestor(&self, id: NodeId, predicate: impl Fn(NodeKind) -> bool) -> Option<NodeId> {
        self.ancestors(id).find(|a| predicate(self.kind(*a)))
    }

    // ── structure ──────────────────────────────────────────────────────

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    pub(crate) fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Insert `child` with `role` so that it is the `index`-th child among
    /// siblings of that role; appended after them when `index` is past the end.
    pub(crate) fn insert_child_in_role(&mut self, parent: NodeId, role: Role, index: usize, child: NodeId) {
        self.node_mut(child).role = role;
        let siblings = self.children_with_role(parent, role);
        let position = match siblings.get(index) {
            Some(sibling) => self.child_position(parent, *sibling),
            None => match siblings.last() {
                Some(last) => self.child_position(parent, *last) + 1,
                None => self.children(parent).len(),
            },
        };
        self.insert_child(parent, position, child);
    }

    /// Insert `child` right after the last child whose role is in `after`,
    /// or first when none exists.
    pub(crate) fn insert_child_after_roles(&mut self, parent: NodeId, after: &[Role], child: NodeId) {
        let position = self
            .children(parent)
            .iter()
            .rposition(|c| after.contains(&self.role(*c)))
            .map(|p| p + 1)
            .unwrap_or(0);
        self.insert_child(parent, position, child);
    }

    fn child_position(&self, parent: NodeId, child: NodeId) -> usize {
        self.children(parent)
            .iter()
            .position(|c| *c == child)
            .unwrap_or(0)
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parent(child) {
            self.node_mut(parent).children.retain(|c| *c != child);
            self.node_mut(child).parent = None;
        }
    }

    /// Put `replacement` where `original` is, with the same role.
    pub(crate) fn replace_node(&mut self, original: NodeId, replacement: NodeId) {
        self.detach(replacement);
        let role = self.role(original);
        self.node_mut(replacement).role = role;
        if let Some(parent) = self.parent(original) {
            let position = self.child_position(parent, original);
            self.node_mut(parent).children[position] = replacement;
            self.node_mut(replacement).parent = Some(parent);
            self.node_mut(original).parent = None;
        }
    }

    pub(crate) fn swap_children(&mut self, parent: NodeId, a: NodeId, b: NodeId) {
        let pa = self.child_position(parent, a);
        let pb = self.child_position(parent, b);
        self.node_mut(parent).children.swap(pa, pb);
    }

    pub(crate) fn set_range(&mut self, id: NodeId, start: usize, length: usize) {
        let node = self.node_mut(id);
        node.start = start;
        node.length = length;
    }

    /// Keep the end, move the start.
    pub(crate) fn set_start_keep_end(&mut self, id: NodeId, start: usize) {
        let end = self.end(id);
        self.set_range(id, start, end.saturating_sub(start));
    }

    pub(crate) fn set_end(&mut self, id: NodeId, end: usize) {
        let start = self.start(id);
        self.set_range(id, start, end.saturating_sub(start));
    }

    pub(crate) fn set_binding(&mut self, id: NodeId, binding: Option<Binding>) {
        self.node_mut(id).binding = binding;
    }

    /// Shift `id` and its whole subtree so that it starts at `start`.
    pub(crate) fn move_node(&mut self, id: NodeId, start: usize) {
        let delta = start as isize - self.start(id) as isize;
        for node in self.descendants(id) {
            let data = self.node_mut(node);
            data.start = offset(data.start, delta);
        }
    }

    // ── comments ───────────────────────────────────────────────────────

    /// All comment nodes ever registered, removed ones included.
    pub fn raw_comments(&self) -> &[NodeId] {
        &self.comments
    }

    pub fn is_removed_comment(&self, id: NodeId) -> bool {
        self.removed_comments.contains(&id)
    }

    pub(crate) fn register_comment(&mut self, id: NodeId) {
        let start = self.start(id);
        let position = self
            .comments
            .iter()
            .position(|c| self.start(*c) > start)
            .unwrap_or(self.comments.len());
        self.comments.insert(position, id);
    }

    /// Mark comments lying fully inside `[start, start + length)` as
    /// removed and return them.
    pub(crate) fn remove_comments_within(&mut self, start: usize, length: usize) -> Vec<NodeId> {
        let end = start + length;
        let inside: Vec<NodeId> = self
            .comments
            .iter()
            .copied()
            .filter(|c| !self.removed_comments.contains(c))
            .filter(|c| self.start(*c) >= start && self.end(*c) <= end)
            .collect();
        self.removed_comments.extend(inside.iter().copied());
        inside
    }

    // ── range bookkeeping ──────────────────────────────────────────────

    /// Nodes reachable from the root, then the given free comments that are
    /// not already part of the tree. Each node appears once.
    fn live_nodes(&self, comments: &[NodeId]) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut result = Vec::new();
        for id in self.descendants(self.root) {
            seen[id.index()] = true;
            result.push(id);
        }
        for comment in comments {
            if !seen[comment.index()] {
                seen[comment.index()] = true;
                result.push(*comment);
            }
        }
        result
    }

    /// The first live node that `[start, end)` enters or leaves without
    /// covering it, if any.
    pub(crate) fn straddled_node(&self, comments: &[NodeId], start: usize, end: usize) -> Option<NodeId> {
        self.live_nodes(comments).into_iter().find(|id| {
            let position = self.start(*id);
            let node_end = self.end(*id);
            // starts inside the node, ends outside
            (position < start && start < node_end && end > node_end)
                // starts outside the node, ends inside
                || (position < end && end < node_end && start < position)
        })
    }

    /// Mirror `text[start..start + old_length]` being replaced by
    /// `new_length` bytes.
    pub(crate) fn update_for_replace(&mut self, comments: &[NodeId], start: usize, old_length: usize, new_length: usize) {
        let old_end = start + old_length;
        let difference = new_length as isize - old_length as isize;
        for id in self.live_nodes(comments) {
            let root = id == self.root;
            let node = self.node_mut(id);
            let position = node.start;
            let end = node.end();
            if end <= start {
                // before the changed region
            } else if position >= old_end && !root {
                node.start = offset(position, difference);
            } else if position <= start && end >= old_end {
                node.length = offset(node.length, difference);
            }
        }
    }

    /// Mirror the text `[start, start + length)` being cut and inserted at
    /// `target` (a position in the text before the cut).
    pub(crate) fn update_for_move(&mut self, comments: &[NodeId], target: usize, start: usize, length: usize) {
        let b_pos = start;
        let b_len = length;
        let b_end = b_pos + b_len;
        let t_pos = target;
        for id in self.live_nodes(comments) {
            let node = self.node_mut(id);
            let n_pos = node.start;
            let n_len = node.length;
            let n_end = n_pos + n_len;
            let moved = if b_pos > t_pos {
                if n_pos >= b_end || n_end <= t_pos || (n_pos < t_pos && n_end > b_end) {
                    None
                } else if n_pos >= b_pos && n_end <= b_end {
                    // inside the moved block
                    Some((t_pos + n_pos - b_pos, n_len))
                } else if n_pos >= t_pos && n_end <= b_pos {
                    // between target and source
                    Some((n_pos + b_len, n_len))
                } else if n_pos < t_pos && n_end > t_pos {
                    // contains the target
                    Some((n_pos, n_len + b_len))
                } else {
                    // contains the source
                    Some((n_pos + b_len, n_len.saturating_sub(b_len)))
                }
            } else if n_end <= b_pos || n_pos >= t_pos || (n_pos < b_pos && n_end > t_pos) {
                None
            } else if n_pos >= b_pos && n_end <= b_end {
                Some(((t_pos + n_pos).saturating_sub(b_len + b_pos), n_len))
            } else if n_pos >= b_end && n_end <= t_pos {
                Some((n_pos - b_len, n_len))
            } else if n_pos < t_pos && n_end > t_pos {
                Some((n_pos.saturating_sub(b_len), n_len + b_len))
            } else {
                Some((n_pos, n_len.saturating_sub(b_len)))
            };
            if let Some((position, length)) = moved {
                node.start = position;
                node.length = length;
            }
        }
    }
}

fn offset(value: usize, delta: isize) -> usize {
    (value as isize + delta).max(0) as usize
}
