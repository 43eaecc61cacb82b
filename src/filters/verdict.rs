//! Ignore resolution
//!
//! Assigns exactly one verdict per candidate. First matching rule wins:
//! 1. the output file itself -> excluded (default)
//! 2. CLI `--ignore` patterns -> excluded (custom), even over includes
//! 3. ignore-file patterns -> excluded (custom)
//! 4. default ignores, when enabled -> excluded (default)
//! 5. include patterns given but none match -> excluded (custom)
//! 6. otherwise included

use std::path::PathBuf;
use tracing::debug;

use crate::core::model::{CandidateFile, Verdict};
use crate::filters::patterns::PatternPredicate;

type Predicate = Box<dyn PatternPredicate + Send + Sync>;

pub struct IgnoreResolver {
    output_path: PathBuf,
    defaults: Option<Predicate>,
    custom: Option<Predicate>,
    cli: Option<Predicate>,
    include: Option<Predicate>,
}

impl IgnoreResolver {
    /// A resolver that only rejects `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            defaults: None,
            custom: None,
            cli: None,
            include: None,
        }
    }

    /// Enable the default ignore set.
    pub fn with_defaults(mut self, predicate: impl PatternPredicate + Send + Sync + 'static) -> Self {
        self.defaults = Some(Box::new(predicate));
        self
    }

    /// Patterns loaded from the ignore file.
    pub fn with_custom(mut self, predicate: impl PatternPredicate + Send + Sync + 'static) -> Self {
        self.custom = Some(Box::new(predicate));
        self
    }

    /// Patterns passed with `--ignore`.
    pub fn with_cli(mut self, predicate: impl PatternPredicate + Send + Sync + 'static) -> Self {
        self.cli = Some(Box::new(predicate));
        self
    }

    /// Restrict output to paths matching `predicate`.
    pub fn with_include(mut self, predicate: impl PatternPredicate + Send + Sync + 'static) -> Self {
        self.include = Some(Box::new(predicate));
        self
    }

    pub fn verdict(&self, candidate: &CandidateFile) -> Verdict {
        let path = candidate.relative_path.as_str();

        if candidate.absolute_path() == self.output_path {
            debug!("Skipping output file: {}", self.output_path.display());
            return Verdict::ExcludedDefault;
        }

        if matches(&self.cli, path) {
            debug!("File ignored by CLI patterns: {}", path);
            return Verdict::ExcludedCustom;
        }

        if matches(&self.custom, path) {
            debug!("File ignored by ignore-file patterns: {}", path);
            return Verdict::ExcludedCustom;
        }

        if matches(&self.defaults, path) {
            debug!("File ignored by default patterns: {}", path);
            return Verdict::ExcludedDefault;
        }

        if let Some(include) = &self.include {
            if !include.matches(path) {
                debug!("File not selected by any include pattern: {}", path);
                return Verdict::ExcludedCustom;
            }
        }

        Verdict::Included
    }
}

fn matches(predicate: &Option<Predicate>, path: &str) -> bool {
    predicate.as_ref().is_some_and(|p| p.matches(path))
}
