//! Host settings and the save gate.
//!
//! Settings live in the `graphql-codegen` section of the project's
//! `.vscode/settings.json`, either as dotted keys
//! (`"graphql-codegen.filePathToWatch": "src/**"`) or as a nested object.
//! The file is JSONC, so comments and trailing commas are accepted.

use crate::partition::DocumentMatcher;
use crate::paths::relative_to_root;
use crate::session::SessionOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Settings section name
pub const SETTINGS_SECTION: &str = "graphql-codegen";

/// Settings file, relative to the project root
pub const SETTINGS_FILE: &str = ".vscode/settings.json";

/// Options controlling which saves trigger generation and where the config is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Suffixes of files that declare GraphQL documents
    #[serde(rename = "fileExtensionsDeclaringGraphQLDocuments")]
    pub file_extensions: Vec<String>,
    /// Only saves matching this glob trigger generation
    pub file_path_to_watch: Option<String>,
    /// Explicit codegen config path
    pub config_file_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_extensions: vec!["graphql".to_string(), "gql".to_string()],
            file_path_to_watch: None,
            config_file_path: None,
        }
    }
}

impl Settings {
    /// Read the settings for the project at `root`.
    ///
    /// A missing settings file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::io(e, Some(path), "reading settings")),
        };
        Self::parse(&contents, &path)
    }

    /// Parse settings from JSONC `contents` read from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `contents` is not valid JSONC or a setting has
    /// the wrong type.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        let parsed = jsonc_parser::parse_to_value(contents, &jsonc_parser::ParseOptions::default())
            .map_err(|err| {
                Error::configuration(format!("Failed to parse {}: {err}", path.display()))
            })?;
        let Some(parsed) = parsed else {
            return Ok(Self::default());
        };

        let section = extract_section(convert_jsonc_to_serde_value(parsed));
        serde_json::from_value(Value::Object(section)).map_err(|source| Error::Json {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Return true if saving `path` should trigger generation.
    ///
    /// The file name has to end with one of the configured extensions, and
    /// when a watch glob is set it has to match the path as given or
    /// relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Glob`] if the watch glob is invalid.
    pub fn should_generate_for(&self, path: &Path, root: &Path) -> Result<bool> {
        let display = path.to_string_lossy();
        if !self
            .file_extensions
            .iter()
            .any(|ext| display.ends_with(ext.as_str()))
        {
            return Ok(false);
        }

        let Some(glob) = self
            .file_path_to_watch
            .as_deref()
            .filter(|glob| !glob.trim().is_empty())
        else {
            return Ok(true);
        };

        let matcher = DocumentMatcher::new(&[glob])?;
        Ok(matcher.is_match(&display) || matcher.is_match(&relative_to_root(path, root)))
    }

    /// Session options derived from these settings
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            config_file_path: self.config_file_path.clone(),
            ..SessionOptions::default()
        }
    }
}

/// Collect the settings section from a whole settings document.
///
/// Dotted keys win over the same key in a nested section object.
fn extract_section(document: Value) -> serde_json::Map<String, Value> {
    let Value::Object(entries) = document else {
        return serde_json::Map::new();
    };

    let mut section = match entries.get(SETTINGS_SECTION) {
        Some(Value::Object(nested)) => nested.clone(),
        _ => serde_json::Map::new(),
    };

    let prefix = format!("{SETTINGS_SECTION}.");
    for (key, value) in entries {
        if let Some(name) = key.strip_prefix(&prefix) {
            section.insert(name.to_string(), value);
        }
    }
    section
}

fn convert_jsonc_to_serde_value(value: jsonc_parser::JsonValue) -> Value {
    match value {
        jsonc_parser::JsonValue::Null => Value::Null,
        jsonc_parser::JsonValue::Boolean(b) => Value::Bool(b),
        jsonc_parser::JsonValue::Number(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::Number(i.into())
            } else if let Ok(f) = n.parse::<f64>() {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        jsonc_parser::JsonValue::String(s) => Value::String(s.to_string()),
        jsonc_parser::JsonValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(convert_jsonc_to_serde_value)
                .collect(),
        ),
        jsonc_parser::JsonValue::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (key, convert_jsonc_to_serde_value(value)))
                .collect(),
        ),
    }
}
