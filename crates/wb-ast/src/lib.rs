//! wb-ast: source-preserving structural editing of a Java compilation unit.
//!
//! A `CompilationContext` owns the source buffer, an AST lowered from it and
//! a class path oracle. Editor operations change the text through the buffer
//! and keep every node's range in step with it, so the tree never needs a
//! reparse between edits. Fragments of Java source are parsed in the scope
//! of a position, imports are added on demand, and each operation either
//! applies completely or leaves text and tree untouched.

pub mod binding;
mod comments;
pub mod config;
pub mod context;
mod editor;
pub mod error;
mod imports;
mod lower;
pub mod node;
mod parser;
mod resolve;
mod scope;
pub mod target;
pub mod tree;

pub use binding::{
    Binding, ClassPath, MethodBinding, SynthesizedMethod, SynthesizedType, SynthesizedVariable, TypeBinding,
    VariableBinding,
};
pub use config::EditorConfig;
pub use context::CompilationContext;
pub use editor::split_lines;
pub use error::{AstError, ErrorCode, ParseError};
pub use node::{NodeData, NodeId, NodeKind, Role};
pub use parser::{CLASS_TEMPLATE, CLASS_TOP_TEMPLATE};
pub use scope::generate_unique_name;
pub use target::{BodyDeclarationTarget, StatementTarget};
pub use tree::AstTree;
pub use wb_store::{CommitOutcome, MemoryStorage, PersistedStorage};
