//! Schema references and their normalization.
//!
//! A codegen `schema` field takes one of three shapes:
//!
//! ```yaml
//! schema: schema.graphql                 # a single path or URL
//! schema: [a.graphql, b.graphql]         # a list of references
//! schema:                                # a path with per-schema options
//!   https://api.example.com/graphql:
//!     headers: { Authorization: token }
//! ```
//!
//! [`SchemaRef::normalize`] resolves every path in any of these shapes
//! against the project root.

use crate::paths::resolve_path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A schema reference as written in a codegen config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    /// A single path, glob or URL
    Path(String),
    /// An ordered list of references
    PathList(Vec<SchemaRef>),
    /// Paths mapped to loader options (`{ "<path>": { ...options } }`)
    PathWithOptions(IndexMap<String, serde_json::Value>),
}

impl SchemaRef {
    /// Resolve every path in this reference against `root`.
    ///
    /// Lists keep their order and length. Mappings keep every entry in order,
    /// re-keyed under the resolved path with the options value untouched.
    #[must_use]
    pub fn normalize(&self, root: &Path) -> Self {
        match self {
            Self::Path(path) => Self::Path(resolve_path(path, root)),
            Self::PathList(items) => Self::PathList(items.iter().map(|s| s.normalize(root)).collect()),
            Self::PathWithOptions(entries) => Self::PathWithOptions(
                entries
                    .iter()
                    .map(|(path, options)| (resolve_path(path, root), options.clone()))
                    .collect(),
            ),
        }
    }

    /// Normalize in place.
    pub fn normalize_in_place(&mut self, root: &Path) {
        *self = self.normalize(root);
    }
}

impl From<&str> for SchemaRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn root() -> PathBuf {
        PathBuf::from("/work/project")
    }

    #[test]
    fn test_single_path() {
        let schema = SchemaRef::from("schema.graphql");
        assert_eq!(
            schema.normalize(&root()),
            SchemaRef::Path("/work/project/schema.graphql".to_string())
        );
    }

    #[test]
    fn test_list_is_elementwise_and_order_preserving() {
        let schema = SchemaRef::PathList(vec![
            SchemaRef::from("b.graphql"),
            SchemaRef::from("https://api.example.com/graphql"),
            SchemaRef::from("a.graphql"),
        ]);
        let SchemaRef::PathList(items) = schema.normalize(&root()) else {
            panic!("expected a list");
        };
        assert_eq!(
            items,
            vec![
                SchemaRef::from("/work/project/b.graphql"),
                SchemaRef::from("https://api.example.com/graphql"),
                SchemaRef::from("/work/project/a.graphql"),
            ]
        );
    }

    #[test]
    fn test_mapping_is_rekeyed_with_options_unchanged() {
        let options = json!({ "headers": { "Authorization": "Bearer x" }, "loader": "./loader.js" });
        let mut entries = IndexMap::new();
        entries.insert("schema.graphql".to_string(), options.clone());
        let normalized = SchemaRef::PathWithOptions(entries).normalize(&root());

        let SchemaRef::PathWithOptions(entries) = normalized else {
            panic!("expected a mapping");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("/work/project/schema.graphql"), Some(&options));
    }

    #[test]
    fn test_mapping_keeps_every_entry() {
        let mut entries = IndexMap::new();
        entries.insert("first.graphql".to_string(), json!({}));
        entries.insert("second.graphql".to_string(), json!({ "noRequire": true }));
        let SchemaRef::PathWithOptions(entries) = SchemaRef::PathWithOptions(entries).normalize(&root())
        else {
            panic!("expected a mapping");
        };
        let keys: Vec<_> = entries.keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["/work/project/first.graphql", "/work/project/second.graphql"]
        );
    }

    #[test]
    fn test_list_containing_mapping() {
        let schema: SchemaRef = serde_json::from_value(json!([
            "local.graphql",
            { "remote.graphql": { "noRequire": true } }
        ]))
        .unwrap();
        let normalized = schema.normalize(&root());
        assert_eq!(
            serde_json::to_value(&normalized).unwrap(),
            json!([
                "/work/project/local.graphql",
                { "/work/project/remote.graphql": { "noRequire": true } }
            ])
        );
    }

    #[test]
    fn test_deserialize_shapes() {
        let single: SchemaRef = serde_json::from_value(json!("schema.graphql")).unwrap();
        assert!(matches!(single, SchemaRef::Path(_)));

        let list: SchemaRef = serde_json::from_value(json!(["a.graphql"])).unwrap();
        assert!(matches!(list, SchemaRef::PathList(_)));

        let mapping: SchemaRef =
            serde_json::from_value(json!({ "a.graphql": { "skipGraphQLImport": true } })).unwrap();
        assert!(matches!(mapping, SchemaRef::PathWithOptions(_)));
    }

    #[test]
    fn test_normalize_in_place() {
        let mut schema = SchemaRef::from("schema.graphql");
        schema.normalize_in_place(&root());
        assert_eq!(schema, SchemaRef::from("/work/project/schema.graphql"));
    }
}
