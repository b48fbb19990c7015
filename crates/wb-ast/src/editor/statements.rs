//! Adding, removing and moving statements.

use crate::context::CompilationContext;
use crate::error::AstError;
use crate::node::{NodeData, NodeId, NodeKind, Role};
use crate::parser::FragmentKind;
use crate::target::{StatementAnchor, StatementTarget};
use java_surgeon_core::format::{extract_line_prefix, indented_source};
use java_surgeon_core::scan;
use java_surgeon_lang::java;
use tracing::debug;

impl CompilationContext {
    /// Insert the statement written as `lines` at `target`. Leading tabs of
    /// a line are nesting levels. Returns the new statement.
    pub fn add_statement(&mut self, lines: &[impl AsRef<str>], target: StatementTarget) -> Result<NodeId, AstError> {
        self.transaction("add_statement", |context| context.insert_statement(lines, target))
    }

    /// Delete `statement` with its trailing comment. A dangling statement is
    /// left alone; the sole statement of a nested block takes the block
    /// with it.
    pub fn remove_statement(&mut self, statement: NodeId) -> Result<(), AstError> {
        self.transaction("remove_statement", |context| context.delete_statement(statement))
    }

    /// Delete the statement that contains `node`.
    pub fn remove_enclosing_statement(&mut self, node: NodeId) -> Result<(), AstError> {
        self.transaction("remove_enclosing_statement", |context| {
            let statement = context
                .statement_of(node)
                .ok_or_else(|| AstError::assertion(format!("{node} is not inside a statement")))?;
            context.delete_statement(statement)
        })
    }

    /// Move `statement`, with the comment lines above it, to `target`.
    /// Moving a statement to where it already is changes nothing.
    pub fn move_statement(&mut self, statement: NodeId, target: StatementTarget) -> Result<(), AstError> {
        self.transaction("move_statement", |context| context.relocate_statement(statement, target))
    }

    /// Wrap `statement` into a new block. Returns the block.
    pub fn enclose_in_block(&mut self, statement: NodeId) -> Result<NodeId, AstError> {
        self.transaction("enclose_in_block", |context| {
            let block = context.insert_statement(&["{", "}"], StatementTarget::Before(statement))?;
            context.relocate_statement(statement, StatementTarget::First(block))?;
            Ok(block)
        })
    }

    /// Move the statements of `block` in front of it and delete the block.
    pub fn inline_block(&mut self, block: NodeId) -> Result<(), AstError> {
        self.transaction("inline_block", |context| {
            if context.tree.kind(block) != NodeKind::Block {
                return Err(AstError::assertion(format!("{block} is not a block")));
            }
            for statement in context.tree.children_with_role(block, Role::Statement) {
                context.relocate_statement(statement, StatementTarget::Before(block))?;
            }
            context.delete_statement(block)
        })
    }

    /// Offset just past `statement` and its end-of-line comment.
    pub fn statement_end_index(&self, statement: NodeId) -> usize {
        scan::statement_end_index(self.text(), self.tree.end(statement))
    }

    /// The block `statement` sits in. A statement that is the bare body of
    /// an `if`, a loop and the like is wrapped into braces first.
    pub(crate) fn ensure_parent_block(&mut self, statement: NodeId) -> Result<NodeId, AstError> {
        let parent = self
            .tree
            .parent(statement)
            .ok_or_else(|| AstError::assertion(format!("{statement} is not part of the unit")))?;
        if self.tree.kind(parent) == NodeKind::Block {
            return Ok(parent);
        }
        let eol = self.config().eol.clone();
        let single_indent = self.config().indent.clone();
        let indent = self.indent_at(self.tree.start(parent));
        let last_in_parent = self.tree.end(parent) == self.tree.end(statement);

        let statement_start = self.tree.start(statement);
        let block_position = scan::index_of_any_but_backward(self.text(), " \t\r\n", statement_start).map_or(0, |i| i + 1);
        let head = format!(" {{{eol}{indent}{single_indent}");
        let source = format!("{head}{eol}{indent}}}");
        let statement_position = block_position + head.len();
        self.replace_text(block_position, statement_start - block_position, &source)?;

        let statement_start = self.tree.start(statement);
        let statement_length = self.statement_end_index(statement) - statement_start;
        self.move_source(statement_position, statement_start, statement_length)?;

        let block = self.tree.alloc(NodeData::new(
            NodeKind::Block,
            java::BLOCK,
            Role::Statement,
            block_position + 1,
            source.len() - 1 + statement_length,
        ));
        self.tree.replace_node(statement, block);
        self.tree.insert_child_in_role(block, Role::Statement, 0, statement);
        if last_in_parent {
            let end = self.tree.end(block);
            self.tree.set_end(parent, end);
        }
        debug!(%statement, %block, "wrapped statement into a block");
        Ok(block)
    }

    /// Indentation for statements directly inside `block`.
    fn block_indent(&self, block: NodeId) -> String {
        extract_line_prefix(self.text(), self.tree.start(block)) + &self.config().indent
    }

    /// Put the closing brace of `block` on its own line, indented like the
    /// line holding the open brace.
    fn break_before_close(&mut self, block: NodeId) -> Result<(), AstError> {
        let close = self.tree.end(block) - 1;
        let text = self.text();
        if text[scan::line_begin(text, close)..close].trim().is_empty() {
            return Ok(());
        }
        let position = close - self.indent_at(close).len();
        let indent = extract_line_prefix(text, self.tree.start(block));
        let eol = self.config().eol.clone();
        self.replace_text(position, close - position, &format!("{eol}{indent}"))
    }

    fn insert_statement(&mut self, lines: &[impl AsRef<str>], target: StatementTarget) -> Result<NodeId, AstError> {
        let eol = self.config().eol.clone();
        let single_indent = self.config().indent.clone();
        let statement = match target.anchor(&self.tree)? {
            StatementAnchor::Statement { statement: target, before } => {
                let block = self.ensure_parent_block(target)?;
                let target_start = self.tree.start(target);
                let indent = self.indent_at(target_start);
                let index = self.tree.index_in_role(target).unwrap_or(0);
                let source = indented_source(lines, &indent, &single_indent, &eol);
                let source = self.expand_templates(target_start, &source);
                if before {
                    let position = scan::skip_whitespace_and_pure_eolc_to_left(self.text(), target_start);
                    let parsed = self.parse_lines(FragmentKind::Statement, position, position, &source, lines)?;
                    self.replace_text(position, 0, &format!("{source}{eol}"))?;
                    self.attach(block, Role::Statement, index, parsed)
                } else {
                    let position = self.statement_end_index(target);
                    let offset = position + eol.len();
                    let parsed = self.parse_lines(FragmentKind::Statement, position, offset, &source, lines)?;
                    self.replace_text(position, 0, &format!("{eol}{source}"))?;
                    self.attach(block, Role::Statement, index + 1, parsed)
                }
            }
            StatementAnchor::Block { block, first } => {
                let indent = self.block_indent(block);
                let source = indented_source(lines, &indent, &single_indent, &eol);
                if !first || self.tree.children_with_role(block, Role::Statement).is_empty() {
                    self.break_before_close(block)?;
                }
                if first {
                    let position = self.tree.start(block) + 1;
                    let source = self.expand_templates(position, &source);
                    let offset = position + eol.len();
                    let parsed = self.parse_lines(FragmentKind::Statement, position, offset, &source, lines)?;
                    self.replace_text(position, 0, &format!("{eol}{source}"))?;
                    self.attach(block, Role::Statement, 0, parsed)
                } else {
                    let close = self.tree.end(block) - 1;
                    let position = close - self.indent_at(close).len();
                    let source = self.expand_templates(position, &source);
                    let parsed = self.parse_lines(FragmentKind::Statement, position, position, &source, lines)?;
                    self.replace_text(position, 0, &format!("{source}{eol}"))?;
                    self.attach(block, Role::Statement, usize::MAX, parsed)
                }
            }
        };
        debug!(%statement, ?target, "added statement");
        self.shorten_type_names(statement)
    }

    pub(crate) fn delete_statement(&mut self, statement: NodeId) -> Result<(), AstError> {
        if self.tree.is_dangling(statement) {
            return Ok(());
        }
        let block = match self.tree.parent(statement) {
            Some(parent) if self.tree.kind(parent) == NodeKind::Block => parent,
            _ => return Err(AstError::assertion(format!("{statement} is not inside a block"))),
        };
        let statements = self.tree.children_with_role(block, Role::Statement);
        if statements.len() == 1 && self.tree.parent(block).map(|p| self.tree.kind(p)) == Some(NodeKind::Block) {
            return self.delete_statement(block);
        }
        let index = statements.iter().position(|s| *s == statement).unwrap_or(0);
        let start = match index {
            0 => self.tree.start(block) + 1,
            _ => self.tree.end(statements[index - 1]),
        };
        let end = self.statement_end_index(statement);
        self.tree.detach(statement);
        self.replace_text(start, end - start, "")?;
        debug!(%statement, start, end, "removed statement");
        Ok(())
    }

    /// Whether moving `statement` to `anchor` would leave it where it is.
    fn is_in_place(&self, statement: NodeId, anchor: StatementAnchor) -> bool {
        let parent = self.tree.parent(statement);
        let index = self.tree.index_in_role(statement);
        match anchor {
            StatementAnchor::Statement { statement: target, before } => {
                if target == statement {
                    return true;
                }
                if parent != self.tree.parent(target) {
                    return false;
                }
                match (index, self.tree.index_in_role(target)) {
                    (Some(index), Some(target_index)) if before => index + 1 == target_index,
                    (Some(index), Some(target_index)) => index == target_index + 1,
                    _ => false,
                }
            }
            StatementAnchor::Block { block, first } => {
                if parent != Some(block) {
                    return false;
                }
                let count = self.tree.children_with_role(block, Role::Statement).len();
                match index {
                    Some(index) if first => index == 0,
                    Some(index) => index + 1 == count,
                    None => false,
                }
            }
        }
    }

    fn relocate_statement(&mut self, statement: NodeId, target: StatementTarget) -> Result<(), AstError> {
        let anchor = target.anchor(&self.tree)?;
        if self.is_in_place(statement, anchor) {
            return Ok(());
        }
        let eol = self.config().eol.clone();
        let source_block = self.ensure_parent_block(statement)?;
        let target_block = match anchor {
            StatementAnchor::Statement { statement: target, .. } => self.ensure_parent_block(target)?,
            StatementAnchor::Block { block, .. } => block,
        };

        // cut from the first comment line above the statement
        let source_begin = scan::skip_whitespace_and_pure_eolc_to_left(self.text(), self.tree.start(statement));
        let source_length = self.statement_end_index(statement) - source_begin;
        let eol_begin = scan::skip_single_eol_to_left(self.text(), source_begin);
        self.replace_text(eol_begin, source_begin - eol_begin, "")?;
        let source_begin = eol_begin;

        let (position, indent, index) = match anchor {
            StatementAnchor::Statement { statement: target, before } => {
                let target_start = self.tree.start(target);
                let indent = self.indent_at(target_start);
                let target_index = self.tree.index_in_role(target).unwrap_or(0);
                if before {
                    let position = scan::skip_whitespace_and_pure_eolc_to_left(self.text(), target_start);
                    let position = self.move_source(position, source_begin, source_length)?;
                    self.replace_text(position + source_length, 0, &eol)?;
                    (position, indent, target_index)
                } else {
                    let position = self.statement_end_index(target);
                    let position = self.move_source(position, source_begin, source_length)?;
                    self.replace_text(position, 0, &eol)?;
                    (position + eol.len(), indent, target_index + 1)
                }
            }
            StatementAnchor::Block { block, first } => {
                let indent = self.block_indent(block);
                if first {
                    let position = self.tree.start(block) + 1;
                    let position = self.move_source(position, source_begin, source_length)?;
                    self.replace_text(position, 0, &eol)?;
                    (position + eol.len(), indent, 0)
                } else {
                    let close = self.tree.end(block) - 1;
                    let position = close - self.indent_at(close).len();
                    let position = self.move_source(position, source_begin, source_length)?;
                    self.replace_text(position + source_length, 0, &eol)?;
                    (position, indent, self.tree.children_with_role(block, Role::Statement).len())
                }
            }
        };

        let mut index = index;
        if source_block == target_block && self.tree.index_in_role(statement).is_some_and(|i| i < index) {
            index -= 1;
        }
        self.tree.detach(statement);
        self.tree.insert_child_in_role(target_block, Role::Statement, index, statement);
        self.reindent_source(position, source_length, &indent)?;
        debug!(%statement, ?target, "moved statement");
        Ok(())
    }
}
