//! Loader failures.

use std::io;

use thiserror::Error;

/// Why a document could not be loaded.
///
/// Malformed markup is never a load failure. Encoding problems are only
/// fatal when the settings ask for it.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An encoding label was not recognized.
    #[error("unknown encoding label `{0}`")]
    UnknownEncoding(String),

    /// The document declared an encoding other than the one it was read
    /// with, and could not be reparsed.
    #[error("document declares {declared} but was read as {actual}")]
    EncodingMismatch {
        /// Declared encoding.
        declared: &'static str,
        /// Encoding in use.
        actual: &'static str,
    },

    /// Undecodable bytes were found and the document declared no encoding.
    #[error("undecodable input at {line}:{column} read as {encoding}")]
    EncodingError {
        /// Encoding in use.
        encoding: &'static str,
        /// Line of the first bad character.
        line: usize,
        /// Column of the first bad character.
        column: usize,
    },
}
