//! Config file discovery.
//!
//! An explicitly configured path always wins. Otherwise the project root is
//! searched for the conventional codegen config names, in priority order:
//!
//! | priority | name |
//! |----------|------|
//! | 1–5 | `codegen.json`, `codegen.yaml`, `codegen.yml`, `codegen.js`, `codegen.config.js` |
//! | 6–9 | `.codegenrc.json`, `.codegenrc.yaml`, `.codegenrc.yml`, `.codegenrc.js` |
//! | 10 | `package.json` |

use crate::paths::resolve_path;
use crate::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Module name used by `@graphql-codegen/cli` for its config files
pub const DEFAULT_MODULE_NAME: &str = "codegen";

const EXTENSIONS: &[&str] = &["json", "yaml", "yml", "js", "config.js"];

/// Candidate config file names for `module_name`, highest priority first.
///
/// Dotfile variants exist for every extension except `config.js`.
#[must_use]
pub fn search_places(module_name: &str) -> Vec<String> {
    let regular = EXTENSIONS.iter().map(|ext| format!("{module_name}.{ext}"));
    let dot = EXTENSIONS
        .iter()
        .filter(|ext| **ext != "config.js")
        .map(|ext| format!(".{module_name}rc.{ext}"));
    regular
        .chain(dot)
        .chain(std::iter::once("package.json".to_string()))
        .collect()
}

/// Locates the codegen config for a project
#[derive(Debug)]
pub struct ConfigLocator {
    candidates: Vec<String>,
    glob_set: GlobSet,
}

impl ConfigLocator {
    /// Create a locator for `module_name`
    ///
    /// # Errors
    ///
    /// Returns an error if a candidate name cannot be compiled into a glob.
    pub fn new(module_name: &str) -> Result<Self> {
        let candidates = search_places(module_name);
        let mut builder = GlobSetBuilder::new();
        for candidate in &candidates {
            let escaped = globset::escape(candidate);
            builder.add(Glob::new(&escaped).map_err(|e| Error::glob(candidate.clone(), e))?);
        }
        let glob_set = builder
            .build()
            .map_err(|e| Error::glob(candidates.join(","), e))?;
        Ok(Self {
            candidates,
            glob_set,
        })
    }

    /// Resolve the config path for `root`.
    ///
    /// `explicit` is absolutized and returned as-is, without checking that
    /// it exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when no candidate exists, or an I/O
    /// error if `root` cannot be listed.
    pub fn locate(&self, root: &Path, explicit: Option<&str>) -> Result<PathBuf> {
        if let Some(explicit) = explicit.filter(|p| !p.trim().is_empty()) {
            let path = PathBuf::from(resolve_path(explicit, root));
            tracing::debug!(path = %path.display(), "Using configured config file path");
            return Ok(path);
        }

        let entries = std::fs::read_dir(root)
            .map_err(|e| Error::io(e, Some(root.to_path_buf()), "listing project root"))?;

        let mut best: Option<(usize, PathBuf)> = None;
        for entry in entries.filter_map(std::result::Result::ok) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(priority) = self.glob_set.matches(entry.file_name()).into_iter().min() else {
                continue;
            };
            if best.as_ref().is_none_or(|(current, _)| priority < *current) {
                best = Some((priority, path));
            }
        }

        match best {
            Some((_, path)) => {
                tracing::debug!(path = %path.display(), "Discovered codegen config");
                Ok(path)
            }
            None => Err(Error::ConfigNotFound {
                root: root.to_path_buf(),
                candidates: self.candidates.clone(),
            }),
        }
    }
}

/// Locate the config for `root` using the default module name.
///
/// # Errors
///
/// See [`ConfigLocator::locate`].
pub fn locate_config(root: &Path, explicit: Option<&str>) -> Result<PathBuf> {
    ConfigLocator::new(DEFAULT_MODULE_NAME)?.locate(root, explicit)
}
