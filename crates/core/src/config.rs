//! Codegen configuration model.
//!
//! Only the fields this crate reads or rewrites are typed. Everything else
//! (`plugins`, `config`, `hooks`, `overwrite`, ...) is kept in `extra` and
//! handed back to the engine untouched.

use crate::paths::{resolve_path, resolve_pattern};
use crate::schema::SchemaRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name fragment identifying presets that emit files next to each operation
pub const NEAR_OPERATION_FILE_PRESET: &str = "near-operation-file";

/// Output path → artifact settings, in declaration order
pub type Generates = IndexMap<String, ArtifactSettings>;

/// Document glob pattern(s)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Documents {
    /// A single pattern or file path
    Pattern(String),
    /// Several patterns; empty means "no documents"
    Patterns(Vec<String>),
}

impl Documents {
    /// The empty document set, which makes the engine skip an artifact
    #[must_use]
    pub const fn none() -> Self {
        Self::Patterns(Vec::new())
    }

    /// All patterns as string slices
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Pattern(pattern) => vec![pattern.as_str()],
            Self::Patterns(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }

    /// Return true when there is no pattern at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Patterns(patterns) if patterns.is_empty())
    }

    /// Resolve every pattern against `root`, keeping negations.
    #[must_use]
    pub fn absolutize(&self, root: &Path) -> Self {
        match self {
            Self::Pattern(pattern) => Self::Pattern(resolve_pattern(pattern, root)),
            Self::Patterns(patterns) => {
                Self::Patterns(patterns.iter().map(|p| resolve_pattern(p, root)).collect())
            }
        }
    }
}

/// Options for the artifact's preset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetConfig {
    /// Working directory the preset resolves documents against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Remaining preset options
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Settings of a single entry in `generates`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSettings {
    /// Schema for this artifact only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    /// Documents for this artifact only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Documents>,
    /// Preset name (e.g. `near-operation-file`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Preset options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_config: Option<PresetConfig>,
    /// Key this artifact had before output paths were made absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_output_path: Option<String>,
    /// Plugins, plugin config and anything else
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ArtifactSettings {
    /// Return true if the preset emits one file per operation document
    #[must_use]
    pub fn uses_near_operation_file_preset(&self) -> bool {
        self.preset
            .as_deref()
            .is_some_and(|preset| preset.contains(NEAR_OPERATION_FILE_PRESET))
    }
}

/// A codegen configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Top-level schema; its presence selects single-artifact mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    /// Top-level documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Documents>,
    /// Artifacts keyed by output path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generates: Option<Generates>,
    /// Remaining top-level options
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Document patterns captured right after load, before any path rewriting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginalDocuments {
    /// Top-level `documents` as written
    pub documents: Option<Documents>,
    /// Deep copy of `generates` as written
    pub generates: Option<Generates>,
}

impl OriginalDocuments {
    /// Original patterns of the artifact that was declared under `output_path`
    #[must_use]
    pub fn artifact_documents(&self, output_path: &str) -> Option<&Documents> {
        self.generates
            .as_ref()
            .and_then(|generates| generates.get(output_path))
            .and_then(|artifact| artifact.documents.as_ref())
    }
}

impl GenerationConfig {
    /// Return true if a top-level schema drives generation
    #[must_use]
    pub const fn is_single_artifact(&self) -> bool {
        self.schema.is_some()
    }

    /// Rewrite every filesystem reference to an absolute path.
    ///
    /// Returns the pristine document patterns, captured before any rewrite,
    /// which later drive per-save matching.
    pub fn absolutize(&mut self, root: &Path) -> OriginalDocuments {
        let original = OriginalDocuments {
            documents: self.documents.clone(),
            generates: self.generates.clone(),
        };

        if let Some(schema) = self.schema.as_mut() {
            schema.normalize_in_place(root);
            if let Some(documents) = self.documents.as_mut() {
                *documents = documents.absolutize(root);
            }
        }

        if let Some(generates) = self.generates.take() {
            let root_display = root.to_string_lossy().into_owned();
            let mut absolute = Generates::with_capacity(generates.len());
            for (output_path, mut artifact) in generates {
                if let Some(schema) = artifact.schema.as_mut() {
                    schema.normalize_in_place(root);
                }
                if artifact.uses_near_operation_file_preset() {
                    let preset_config = artifact.preset_config.get_or_insert_with(PresetConfig::default);
                    if preset_config.cwd.as_deref().is_none_or(|cwd| cwd.trim().is_empty()) {
                        tracing::debug!(
                            output = %output_path,
                            cwd = %root_display,
                            "Setting preset cwd to project root"
                        );
                        preset_config.cwd = Some(root_display.clone());
                    }
                }
                let absolute_output = resolve_path(&output_path, root);
                artifact.original_output_path = Some(output_path);
                absolute.insert(absolute_output, artifact);
            }
            self.generates = Some(absolute);
        }

        original
    }
}
