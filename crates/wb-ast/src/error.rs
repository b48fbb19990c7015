use java_surgeon_core::BufferError;
use serde::Serialize;
use thiserror::Error;
use wb_store::StoreError;

/// A fragment the parser could not accept, with the exact source it saw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Can not parse fragment: {diagnostic}")]
pub struct ParseError {
    /// Source given to the parser: the scaffolding unit, or the caller's
    /// lines for an outer error.
    pub fragment: String,
    pub diagnostic: String,
    #[source]
    pub cause: Option<Box<ParseError>>,
}

impl ParseError {
    pub fn new(fragment: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            diagnostic: diagnostic.into(),
            cause: None,
        }
    }

    /// Wrap `cause` in an error about the caller-supplied `fragment`.
    pub fn wrap(fragment: impl Into<String>, cause: ParseError) -> Self {
        Self {
            fragment: fragment.into(),
            diagnostic: cause.diagnostic.clone(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The innermost error, which carries the scaffolding source.
    pub fn root_cause(&self) -> &ParseError {
        let mut error = self;
        while let Some(cause) = &error.cause {
            error = cause;
        }
        error
    }
}

#[derive(Debug, Error)]
pub enum AstError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("Replace [{start}..{end}) crosses a node boundary")]
    EditorReplace { start: usize, end: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Stable identifier of an error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    BadLocation,
    RangeConflict,
    EditorReplace,
    Parse,
    NotFound,
    Assertion,
    Storage,
}

impl AstError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AstError::Buffer(BufferError::BadLocation { .. }) => ErrorCode::BadLocation,
            AstError::Buffer(BufferError::RangeConflict { .. }) => ErrorCode::RangeConflict,
            AstError::Buffer(BufferError::NotFound { .. }) => ErrorCode::NotFound,
            AstError::EditorReplace { .. } => ErrorCode::EditorReplace,
            AstError::Parse(_) => ErrorCode::Parse,
            AstError::Assertion(_) => ErrorCode::Assertion,
            AstError::Store(_) => ErrorCode::Storage,
        }
    }

    /// Ordered message parameters: fragment and diagnostic for parse
    /// errors, nothing for range errors.
    pub fn parameters(&self) -> Vec<String> {
        match self {
            AstError::Parse(e) => vec![e.fragment.clone(), e.diagnostic.clone()],
            AstError::Assertion(message) => vec![message.clone()],
            AstError::Store(e) => vec![e.to_string()],
            AstError::Buffer(_) | AstError::EditorReplace { .. } => Vec::new(),
        }
    }

    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        AstError::Assertion(message.into())
    }
}
