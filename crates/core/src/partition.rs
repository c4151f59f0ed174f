//! Per-save document partitioning.
//!
//! When a single document is saved only the artifacts whose original
//! `documents` globs cover that file have to regenerate, and only for that
//! file. Every other artifact gets an empty document set, which the engine
//! treats as nothing to do.

use crate::config::{Documents, GenerationConfig, OriginalDocuments};
use crate::paths::relative_to_root;
use crate::{Error, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

/// Ordered glob patterns with multimatch semantics.
///
/// Patterns apply in order: a positive pattern that matches selects the
/// path, a `!`-prefixed pattern that matches deselects it again. A leading
/// negation has nothing to remove. `*` stops at `/`, `**` crosses it.
#[derive(Debug, Clone)]
pub struct DocumentMatcher {
    rules: Vec<(bool, GlobMatcher)>,
}

impl DocumentMatcher {
    /// Compile `patterns`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Glob`] for an invalid pattern.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let rules = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                let (negated, glob) = match pattern.strip_prefix('!') {
                    Some(rest) => (true, rest),
                    None => (false, pattern),
                };
                let matcher = GlobBuilder::new(glob)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| Error::glob(pattern, e))?
                    .compile_matcher();
                Ok((negated, matcher))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Return true if `path` survives the pattern list
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.rules.iter().fold(false, |selected, (negated, matcher)| {
            if matcher.is_match(path) {
                !negated
            } else {
                selected
            }
        })
    }
}

/// What a partition decided for each artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionReport {
    /// The config has a top-level schema; documents were set unfiltered
    pub single_artifact: bool,
    /// Original output paths of artifacts that will regenerate
    pub selected: Vec<String>,
    /// Original output paths of artifacts skipped for this save
    pub skipped: Vec<String>,
}

impl PartitionReport {
    /// Return true if at least one artifact (or the single artifact) runs
    #[must_use]
    pub fn has_work(&self) -> bool {
        self.single_artifact || !self.selected.is_empty()
    }
}

/// Narrow `config` to the saved file.
///
/// In single-artifact mode the top-level `documents` becomes `saved`. In
/// multi-artifact mode each artifact is matched by its original patterns
/// (looked up through `originalOutputPath`) against `saved` relative to
/// `root`: a match sets its documents to `saved`, no match (or no patterns)
/// empties them.
///
/// # Errors
///
/// Returns [`Error::Glob`] if an original pattern is invalid.
pub fn partition_documents(
    config: &mut GenerationConfig,
    saved: &Path,
    root: &Path,
    original: &OriginalDocuments,
) -> Result<PartitionReport> {
    let saved_display = saved.to_string_lossy().into_owned();

    if config.is_single_artifact() {
        config.documents = Some(Documents::Pattern(saved_display));
        return Ok(PartitionReport {
            single_artifact: true,
            ..PartitionReport::default()
        });
    }

    let relative = relative_to_root(saved, root);
    let mut report = PartitionReport::default();

    let Some(generates) = config.generates.as_mut() else {
        return Ok(report);
    };

    for (output_path, artifact) in generates.iter_mut() {
        let original_output = artifact
            .original_output_path
            .clone()
            .unwrap_or_else(|| output_path.clone());

        let matched = match original.artifact_documents(&original_output) {
            Some(documents) => DocumentMatcher::new(&documents.patterns())?.is_match(&relative),
            None => false,
        };

        tracing::debug!(
            artifact = %original_output,
            file = %relative,
            matched,
            "Partitioned artifact documents"
        );

        if matched {
            artifact.documents = Some(Documents::Pattern(saved_display.clone()));
            report.selected.push(original_output);
        } else {
            artifact.documents = Some(Documents::none());
            report.skipped.push(original_output);
        }
    }

    Ok(report)
}

/// Put the original document patterns back for a full run.
///
/// Multi-artifact configs get each artifact's patterns from the snapshot.
/// Single-artifact configs get the top-level patterns, absolutized against
/// `root`.
pub fn restore_documents(config: &mut GenerationConfig, root: &Path, original: &OriginalDocuments) {
    if config.is_single_artifact() {
        config.documents = original.documents.as_ref().map(|d| d.absolutize(root));
        return;
    }

    if let Some(generates) = config.generates.as_mut() {
        for (output_path, artifact) in generates.iter_mut() {
            let original_output = artifact
                .original_output_path
                .as_deref()
                .unwrap_or(output_path.as_str());
            artifact.documents = original.artifact_documents(original_output).cloned();
        }
    }
}
