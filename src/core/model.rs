//! Pipeline data model
//!
//! Candidates flow from the scanner through the verdict gate into the renderer;
//! the aggregation flow folds the render results into a summary.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A file discovered during path resolution, not yet filtered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateFile {
    /// Directory the relative path is anchored to
    pub base_dir: PathBuf,

    /// Path relative to `base_dir`, always '/'-separated
    pub relative_path: String,
}

impl CandidateFile {
    pub fn new(base_dir: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            relative_path: relative_path.into(),
        }
    }

    /// The joined path that uniquely identifies this file.
    pub fn absolute_path(&self) -> PathBuf {
        self.base_dir.join(&self.relative_path)
    }

    /// Extension of the relative path without the leading dot ("" when none).
    pub fn extension(&self) -> &str {
        Path::new(&self.relative_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
    }
}

/// Outcome of the ignore gate for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Included,
    ExcludedDefault,
    ExcludedCustom,
}

impl Verdict {
    pub fn is_included(self) -> bool {
        self == Verdict::Included
    }
}

/// Rendered Markdown for one candidate plus its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub snippet: String,
    pub verdict: Verdict,
    pub is_binary_or_svg: bool,
    pub token_count: usize,

    /// Heading path shown in the output (empty when nothing was rendered)
    pub display_path: String,

    /// Set when a stat/read failure dropped the file
    pub unreadable: bool,
}

impl RenderResult {
    /// A result for a file the gate rejected.
    pub fn excluded(verdict: Verdict) -> Self {
        Self {
            snippet: String::new(),
            verdict,
            is_binary_or_svg: false,
            token_count: 0,
            display_path: String::new(),
            unreadable: false,
        }
    }

    /// A result for a file that could not be stat'ed or read.
    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::excluded(Verdict::ExcludedDefault)
        }
    }

    pub fn is_included(&self) -> bool {
        self.verdict.is_included()
    }
}

/// One entry of the included-file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludedFile {
    pub path: String,
    pub tokens: usize,
}

/// Counts and sizes reported at the end of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregationSummary {
    pub total_found: usize,
    pub included: usize,
    pub excluded_default: usize,
    pub excluded_custom: usize,

    /// Subset of `excluded_default` dropped because of I/O failures
    pub unreadable: usize,

    pub binary_and_svg: usize,
    pub output_bytes: u64,

    /// `None` when the output exceeded the estimation ceiling
    pub estimated_tokens: Option<usize>,

    pub elapsed_ms: u64,
    pub dry_run: bool,
    pub output_path: String,

    /// Included files in output order
    pub files: Vec<IncludedFile>,
}

impl AggregationSummary {
    /// Tally one render result into the counters.
    pub fn record(&mut self, result: &RenderResult) {
        match result.verdict {
            Verdict::Included => {
                self.included += 1;
                if result.is_binary_or_svg {
                    self.binary_and_svg += 1;
                }
                self.files.push(IncludedFile {
                    path: result.display_path.clone(),
                    tokens: result.token_count,
                });
            }
            Verdict::ExcludedDefault => {
                self.excluded_default += 1;
                if result.unreadable {
                    self.unreadable += 1;
                }
            }
            Verdict::ExcludedCustom => self.excluded_custom += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_absolute_path() {
        let candidate = CandidateFile::new("/project", "src/main.rs");
        assert_eq!(
            candidate.absolute_path(),
            PathBuf::from("/project/src/main.rs")
        );
    }

    #[test]
    fn test_candidate_extension() {
        assert_eq!(CandidateFile::new("/p", "a/b.test.ts").extension(), "ts");
        assert_eq!(CandidateFile::new("/p", "Makefile").extension(), "");
        assert_eq!(CandidateFile::new("/p", ".gitignore").extension(), "");
    }

    #[test]
    fn test_unreadable_counts_as_default_exclusion() {
        let mut summary = AggregationSummary::default();
        summary.record(&RenderResult::unreadable());
        summary.record(&RenderResult::excluded(Verdict::ExcludedCustom));

        assert_eq!(summary.excluded_default, 1);
        assert_eq!(summary.unreadable, 1);
        assert_eq!(summary.excluded_custom, 1);
        assert_eq!(summary.included, 0);
    }

    #[test]
    fn test_record_included_binary() {
        let mut summary = AggregationSummary::default();
        summary.record(&RenderResult {
            snippet: "# logo.png\n\n".to_string(),
            verdict: Verdict::Included,
            is_binary_or_svg: true,
            token_count: 10,
            display_path: "logo.png".to_string(),
            unreadable: false,
        });

        assert_eq!(summary.included, 1);
        assert_eq!(summary.binary_and_svg, 1);
        assert_eq!(
            summary.files,
            vec![IncludedFile {
                path: "logo.png".to_string(),
                tokens: 10
            }]
        );
    }

    #[test]
    fn test_verdict_serializes_snake_case() {
        let json = serde_json::to_string(&Verdict::ExcludedCustom).unwrap();
        assert_eq!(json, "\"excluded_custom\"");
    }
}
