//! Parse-time error type.

use std::fmt;

use purl_common::Span;

/// A single recoverable parse error, anchored to the token span where
/// recovery kicked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {:?}: {}", self.span, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Errors raised while splicing `import` expressions together, separate
/// from in-file syntax errors since they carry a file path rather than
/// just a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Neither an absolute path nor any `libDirs` entry had the file.
    NotFound { path: String, searched: Vec<String> },
    Io { path: String, message: String },
    Parse { path: String, errors: Vec<ParseError> },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound { path, searched } => {
                write!(f, "import `{}` not found (searched: {})", path, searched.join(", "))
            }
            ResolveError::Io { path, message } => {
                write!(f, "could not read import `{}`: {}", path, message)
            }
            ResolveError::Parse { path, errors } => {
                write!(f, "import `{}` failed to parse ({} error(s))", path, errors.len())
            }
        }
    }
}

impl std::error::Error for ResolveError {}
