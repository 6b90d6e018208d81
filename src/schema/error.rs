//! Schema loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a [`SchemaGraph`](super::SchemaGraph).
///
/// Lookups never fail: an unresolvable reference or a missing field simply
/// yields no metadata.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("walking {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no schema file with stem {0:?}")]
    UnknownSchema(String),
}

impl SchemaError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        SchemaError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
