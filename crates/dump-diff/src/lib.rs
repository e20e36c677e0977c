//! Dump comparison engine.
//!
//! Compares two dump artifacts line by line. Artifacts are first passed
//! through a [`Normalizer`] that masks per-repository metadata (UUIDs,
//! commit dates, user-supplied patterns) without changing the line count,
//! then diffed with Myers' algorithm. The outcome is a [`ComparisonResult`]:
//! either equivalent, or a list of [`Divergence`]s with line and byte ranges.

pub mod algorithm;
pub mod format;
pub mod normalize;

use std::path::{Path, PathBuf};

use bstr::BString;

pub use normalize::{NormalizeRules, Normalizer};

/// Options controlling comparison.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Number of context lines around each divergence (default 3).
    pub context_lines: u32,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self { context_lines: 3 }
    }
}

/// Outcome of comparing two dump artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonResult {
    /// Identical after normalization.
    Equivalent,
    /// At least one region differs.
    Diverged(Vec<Divergence>),
}

impl ComparisonResult {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, ComparisonResult::Equivalent)
    }

    /// The divergences, empty when equivalent.
    pub fn divergences(&self) -> &[Divergence] {
        match self {
            ComparisonResult::Equivalent => &[],
            ComparisonResult::Diverged(d) => d,
        }
    }

    /// Lines present only in the second artifact.
    pub fn insertions(&self) -> usize {
        self.divergences().iter().map(Divergence::insertions).sum()
    }

    /// Lines present only in the first artifact.
    pub fn deletions(&self) -> usize {
        self.divergences().iter().map(Divergence::deletions).sum()
    }

    /// One-line summary, e.g. `equivalent` or `2 divergences (+3 -1 lines)`.
    pub fn summary(&self) -> String {
        match self {
            ComparisonResult::Equivalent => "equivalent".to_string(),
            ComparisonResult::Diverged(d) => format!(
                "{} divergence{} (+{} -{} lines)",
                d.len(),
                if d.len() == 1 { "" } else { "s" },
                self.insertions(),
                self.deletions()
            ),
        }
    }
}

/// A contiguous region where the artifacts differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Start line in the first artifact (1-based, includes leading context).
    pub old_start: u32,
    /// Number of lines from the first artifact.
    pub old_count: u32,
    /// Start line in the second artifact (1-based, includes leading context).
    pub new_start: u32,
    /// Number of lines from the second artifact.
    pub new_count: u32,
    /// Byte offset of the first differing line in the first artifact.
    pub old_offset: u64,
    /// Byte offset of the first differing line in the second artifact.
    pub new_offset: u64,
    /// Lines in this region.
    pub lines: Vec<DiffLine>,
}

impl Divergence {
    pub fn insertions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Addition(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Deletion(_)))
            .count()
    }
}

/// A single line in a divergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Unchanged context line.
    Context(BString),
    /// Line only in the second artifact.
    Addition(BString),
    /// Line only in the first artifact.
    Deletion(BString),
}

/// Error types for comparison.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("cannot read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mask pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Compare two in-memory artifacts as-is.
pub fn compare(old: &[u8], new: &[u8], options: &CompareOptions) -> ComparisonResult {
    if old == new {
        return ComparisonResult::Equivalent;
    }
    let divergences = algorithm::diff_divergences(old, new, options.context_lines);
    if divergences.is_empty() {
        ComparisonResult::Equivalent
    } else {
        ComparisonResult::Diverged(divergences)
    }
}

/// Read, normalize and compare two artifact files.
pub fn compare_files(
    old: &Path,
    new: &Path,
    normalizer: &Normalizer,
    options: &CompareOptions,
) -> Result<ComparisonResult, DiffError> {
    let read = |path: &Path| {
        std::fs::read(path).map_err(|source| DiffError::Read {
            path: path.to_path_buf(),
            source,
        })
    };
    let old_data = read(old)?;
    let new_data = read(new)?;
    Ok(compare(
        &normalizer.normalize(&old_data),
        &normalizer.normalize(&new_data),
        options,
    ))
}
