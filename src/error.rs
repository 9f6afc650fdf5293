//! Error types shared by the model, the source adapters and the emitters.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for apidecl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading, parsing or writing API collections.
#[derive(Debug, Error)]
pub enum Error {
    /// Text that is neither a point version nor a valid range.
    #[error("invalid version or range {input:?}: {source}")]
    InvalidVersion {
        input: String,
        #[source]
        source: semver::Error,
    },

    /// A `||` separated range with nothing between the separators.
    #[error("empty branch in version range {0:?}")]
    EmptyRangeBranch(String),

    /// Syntax error in a documentation table source file.
    #[error("lua syntax error at {line}:{column}: {message}")]
    Lua {
        line: usize,
        column: usize,
        message: String,
    },

    /// A record reached an adapter without a field it cannot do without.
    #[error("{kind} is missing required field `{field}` ({context})")]
    MissingField {
        kind: &'static str,
        field: &'static str,
        context: String,
    },

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("unknown format: {0}. Use lua, markdown, or json")]
    UnknownFormat(String),

    /// `ApiBuilder::merge` was called before any collection was added.
    #[error("cannot merge an empty builder: add at least one collection")]
    EmptyBuilder,

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing(kind: &'static str, field: &'static str, context: impl Into<String>) -> Self {
        Error::MissingField {
            kind,
            field,
            context: context.into(),
        }
    }
}
