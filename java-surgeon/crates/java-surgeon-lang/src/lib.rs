//! java-surgeon-lang: Language-specific intelligence.
//!
//! This crate knows which tree-sitter grammar to use for which file types,
//! and provides the grammar vocabulary the AST lowering relies on.

pub mod registry;

#[cfg(feature = "java")]
pub mod java;

use thiserror::Error;
use tree_sitter::Language;

#[derive(Debug, Clone, Error)]
pub enum LangError {
    #[error("Unsupported language: {0}")]
    Unsupported(String),
    #[error("Grammar for {0} is not compiled in")]
    NotCompiled(String),
    #[error("Grammar version mismatch with tree-sitter: {0}")]
    VersionMismatch(String),
}

/// Supported language identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedLanguage {
    Java,
}

impl SupportedLanguage {
    /// Parse a language string into a SupportedLanguage.
    pub fn from_name(s: &str) -> Result<Self, LangError> {
        match s.to_lowercase().as_str() {
            "java" => Ok(Self::Java),
            other => Err(LangError::Unsupported(other.to_string())),
        }
    }

    /// Detect language from a file extension.
    pub fn from_extension(ext: &str) -> Result<Self, LangError> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "java" => Ok(Self::Java),
            other => Err(LangError::Unsupported(other.to_string())),
        }
    }

    /// Get the tree-sitter Language for this language.
    pub fn ts_language(&self) -> Result<Language, LangError> {
        match self {
            #[cfg(feature = "java")]
            Self::Java => Ok(tree_sitter_java::LANGUAGE.into()),
            #[allow(unreachable_patterns)]
            other => Err(LangError::NotCompiled(format!("{:?}", other))),
        }
    }
}
