//! Ignore-file loading
//!
//! Newline-delimited patterns; blank lines and `#` comments are skipped.
//! A missing file means "no custom patterns".

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

use crate::core::error::{DigestError, DigestResult};

/// Read patterns from `path`.
pub fn read_ignore_file(path: &Path) -> DigestResult<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            info!("📄 Found ignore file {}", path.display());
            Ok(parse_ignore_patterns(&content))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("❓ No ignore file found at {}", path.display());
            Ok(Vec::new())
        }
        Err(source) => Err(DigestError::IgnoreFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
