//! Fatal error taxonomy
//!
//! Only errors that abort a whole run live here. Per-file problems are folded
//! into `RenderResult` and never reach this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    /// An input path could not be stat'ed.
    #[error("cannot resolve input path {}: {source}", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A glob given as an input could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The ignore file exists but could not be read.
    #[error("cannot read ignore file {}: {source}", path.display())]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The on-disk size of the written output differs from the in-memory text.
    #[error(
        "file size mismatch after writing {}: expected {expected} bytes, found {actual}",
        path.display()
    )]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

pub type DigestResult<T> = std::result::Result<T, DigestError>;
