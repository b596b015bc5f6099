//! Errors raised while lexing or evaluating a template.
//!
//! Every variant is fatal for the evaluation that raised it: no partial
//! output is returned.  Undefined plain variable references are *not*
//! errors; they render as their own directive text.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading, lexing or evaluating a template.
#[derive(Error, Debug)]
pub enum Error {
    /// No lexical rule matches at `offset`.
    #[error("no token matches at offset {offset}: {snippet:?}")]
    Lex { offset: usize, snippet: String },

    /// `..undef::` of a name that is not bound.
    #[error("cannot undefine '{key}' at offset {offset}: not defined")]
    UndefinedKey { key: String, offset: usize },

    /// A directive is missing required tokens or its matching `..end::`.
    #[error("malformed {directive} at offset {offset}: {reason}")]
    MalformedDirective {
        directive: &'static str,
        offset: usize,
        reason: String,
    },

    /// A `..for::` range did not evaluate to two integers.
    #[error("loop range at offset {offset} is not two integers: {text:?}")]
    NonIntegerRange { text: String, offset: usize },

    /// Indexing a non-sequence, or an index out of bounds.
    #[error("cannot index '{name}' with {index} at offset {offset}: {reason}")]
    Index {
        name: String,
        index: String,
        reason: String,
        offset: usize,
    },

    /// A token or value had an incompatible type for the operation.
    #[error("type mismatch at offset {offset}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    /// The template file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Byte offset into the template source, when the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Lex { offset, .. }
            | Error::UndefinedKey { offset, .. }
            | Error::MalformedDirective { offset, .. }
            | Error::NonIntegerRange { offset, .. }
            | Error::Index { offset, .. }
            | Error::TypeMismatch { offset, .. } => Some(*offset),
            Error::Io { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
