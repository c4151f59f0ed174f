//! Engine backed by the project's own `@graphql-codegen/cli` install.
//!
//! JSON and YAML configs are parsed in-process; `package.json` contributes
//! its `codegen` field; script configs (`codegen.js`, `codegen.config.js`,
//! ...) are evaluated with `node`. Generation writes the prepared config to
//! a temporary JSON file and runs `node_modules/.bin/graphql-codegen` on it.

use super::{CodegenContext, CodegenEngine, EngineProvider};
use crate::config::GenerationConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// npm package providing the codegen CLI
pub const CODEGEN_PACKAGE: &str = "@graphql-codegen/cli";

/// Evaluates a CommonJS config module and prints it as JSON.
const EVALUATE_CONFIG_SCRIPT: &str = "const p = require('path').resolve(process.argv[1]); \
     const m = require(p); \
     const c = m && m.__esModule && m.default ? m.default : m; \
     process.stdout.write(JSON.stringify(c));";

/// Looks for `@graphql-codegen/cli` under the project's `node_modules`
#[derive(Debug, Clone)]
pub struct NodeEngineProvider {
    project_root: PathBuf,
    node: String,
}

impl NodeEngineProvider {
    /// Create a provider for the project at `project_root`
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            node: "node".to_string(),
        }
    }

    /// Use a specific `node` executable for script configs
    #[must_use]
    pub fn with_node_binary(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    /// Directory the codegen package is expected in
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        CODEGEN_PACKAGE
            .split('/')
            .fold(self.project_root.join("node_modules"), |dir, part| dir.join(part))
    }
}

impl EngineProvider for NodeEngineProvider {
    fn engine(&self) -> Result<Arc<dyn CodegenEngine>> {
        let package_dir = self.package_dir();
        if !package_dir.is_dir() {
            tracing::warn!(location = %package_dir.display(), "Codegen CLI is not installed");
            return Err(Error::DependencyMissing {
                location: package_dir,
            });
        }
        Ok(Arc::new(NodeCliEngine {
            project_root: self.project_root.clone(),
            node: self.node.clone(),
        }))
    }
}

/// Engine running the codegen CLI installed in the project
#[derive(Debug, Clone)]
pub struct NodeCliEngine {
    project_root: PathBuf,
    node: String,
}

impl NodeCliEngine {
    /// Path of the `graphql-codegen` executable shim
    #[must_use]
    pub fn bin_path(&self) -> PathBuf {
        let name = if cfg!(windows) {
            "graphql-codegen.cmd"
        } else {
            "graphql-codegen"
        };
        self.project_root.join("node_modules").join(".bin").join(name)
    }

    async fn read_config(&self, path: &Path) -> Result<GenerationConfig> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

        if file_name == "package.json" {
            let manifest: serde_json::Value = parse_json(&read_file(path).await?, path)?;
            let codegen = manifest.get("codegen").cloned().ok_or_else(|| {
                Error::configuration(format!("{} has no 'codegen' field", path.display()))
            })?;
            return serde_json::from_value(codegen).map_err(|source| Error::Json {
                source,
                path: path.to_path_buf(),
            });
        }

        match extension {
            "json" => parse_json(&interpolate_env(&read_file(path).await?, env_var), path),
            "yaml" | "yml" => parse_yaml(&interpolate_env(&read_file(path).await?, env_var), path),
            _ => {
                let value = self.evaluate_script(path).await?;
                serde_json::from_value(value).map_err(|source| Error::Json {
                    source,
                    path: path.to_path_buf(),
                })
            }
        }
    }

    async fn evaluate_script(&self, path: &Path) -> Result<serde_json::Value> {
        tracing::debug!(path = %path.display(), node = %self.node, "Evaluating script config");
        let output = Command::new(&self.node)
            .arg("-e")
            .arg(EVALUATE_CONFIG_SCRIPT)
            .arg(path)
            .current_dir(&self.project_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), format!("running {}", self.node)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::configuration(format!(
                "Failed to evaluate {}: {}",
                path.display(),
                stderr.trim()
            )));
        }
        parse_json(&String::from_utf8_lossy(&output.stdout), path)
    }
}

#[async_trait]
impl CodegenEngine for NodeCliEngine {
    async fn create_context(&self, config_path: &Path) -> Result<CodegenContext> {
        tracing::info!(path = %config_path.display(), "Loading codegen config");
        let config = self.read_config(config_path).await?;
        Ok(CodegenContext::new(config_path, config))
    }

    async fn generate(&self, context: &CodegenContext) -> Result<()> {
        let contents = serde_json::to_vec_pretty(context.config()).map_err(|source| Error::Json {
            source,
            path: context.config_path().to_path_buf(),
        })?;

        let mut config_file = tempfile::Builder::new()
            .prefix("gqlwatch-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| Error::io(e, None, "creating temporary codegen config"))?;
        config_file
            .write_all(&contents)
            .map_err(|e| Error::io(e, Some(config_file.path().to_path_buf()), "writing temporary codegen config"))?;

        let bin = self.bin_path();
        tracing::info!(
            bin = %bin.display(),
            cwd = %context.cwd().display(),
            "Running graphql-codegen"
        );

        let output = Command::new(&bin)
            .arg("--config")
            .arg(config_file.path())
            .current_dir(context.cwd())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::io(e, Some(bin.clone()), "spawning graphql-codegen"))?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(status = %output.status, stderr = %stderr.trim(), "graphql-codegen failed");
        Err(Error::generation(
            format!("graphql-codegen exited with {}", output.status),
            collect_errors(&stderr, &stdout),
        ))
    }

    fn name(&self) -> &'static str {
        "graphql-codegen-cli"
    }
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(e, Some(path.to_path_buf()), "reading codegen config"))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Expand `${NAME}` and `${NAME:default}` references.
///
/// An unset variable without a default expands to an empty string.
fn interpolate_env(contents: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let Ok(reference) = regex::Regex::new(r"\$\{([^}]+)\}") else {
        return contents.to_string();
    };
    reference
        .replace_all(contents, |caps: &regex::Captures<'_>| {
            let (name, default) = match caps[1].split_once(':') {
                Some((name, default)) => (name.trim(), Some(default.trim().trim_matches(['"', '\'']))),
                None => (caps[1].trim(), None),
            };
            lookup(name)
                .or_else(|| default.map(str::to_string))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Parse a YAML config, applying `<<` merge keys first.
fn parse_yaml(contents: &str, path: &Path) -> Result<GenerationConfig> {
    let yaml_error = |source: serde_yaml::Error| Error::Yaml {
        source,
        path: path.to_path_buf(),
    };
    let mut value: serde_yaml::Value = serde_yaml::from_str(contents).map_err(yaml_error)?;
    value.apply_merge().map_err(yaml_error)?;
    serde_yaml::from_value(value).map_err(yaml_error)
}

fn parse_json<T: serde::de::DeserializeOwned>(contents: &str, path: &Path) -> Result<T> {
    serde_json::from_str(contents).map_err(|source| Error::Json {
        source,
        path: path.to_path_buf(),
    })
}

/// Pick the error lines out of the CLI output.
///
/// Lines mentioning an error win; without any, every non-empty stderr line
/// is kept.
fn collect_errors(stderr: &str, stdout: &str) -> Vec<String> {
    let is_error_line =
        |line: &&str| line.starts_with('✖') || line.starts_with("Error") || line.contains("Error:");

    let flagged: Vec<String> = stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .filter(is_error_line)
        .map(str::to_string)
        .collect();
    if !flagged.is_empty() {
        return flagged;
    }

    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Documents;
    use crate::schema::SchemaRef;
    use tempfile::TempDir;

    fn engine_for(dir: &TempDir) -> Arc<dyn CodegenEngine> {
        std::fs::create_dir_all(dir.path().join("node_modules/@graphql-codegen/cli")).unwrap();
        NodeEngineProvider::new(dir.path()).engine().unwrap()
    }

    #[test]
    fn test_provider_reports_missing_package() {
        let dir = TempDir::new().unwrap();
        let Err(err) = NodeEngineProvider::new(dir.path()).engine() else {
            panic!("expected the engine to be missing");
        };
        match err {
            Error::DependencyMissing { location } => {
                assert!(location.ends_with("node_modules/@graphql-codegen/cli"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_provider_finds_installed_package() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        assert_eq!(engine.name(), "graphql-codegen-cli");
    }

    #[tokio::test]
    async fn test_create_context_from_yaml() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let path = dir.path().join("codegen.yml");
        std::fs::write(
            &path,
            "schema: schema.graphql\ndocuments: 'src/**/*.graphql'\noverwrite: true\n",
        )
        .unwrap();

        let context = engine.create_context(&path).await.unwrap();
        assert_eq!(context.config().schema, Some(SchemaRef::from("schema.graphql")));
        assert_eq!(
            context.config().documents,
            Some(Documents::Pattern("src/**/*.graphql".to_string()))
        );
        assert_eq!(context.config_path(), path);
        assert_eq!(context.cwd(), dir.path());
    }

    #[tokio::test]
    async fn test_yaml_merge_keys_are_applied() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let path = dir.path().join("codegen.yml");
        std::fs::write(
            &path,
            "common: &common\n  schema: api.graphql\n  documents: 'src/api/**/*.graphql'\n  plugins: [typescript]\n\
             generates:\n  src/api/types.ts:\n    <<: *common\n    config:\n      skipTypename: true\n",
        )
        .unwrap();

        let context = engine.create_context(&path).await.unwrap();
        let generates = context.config().generates.as_ref().unwrap();
        let artifact = &generates["src/api/types.ts"];
        assert_eq!(artifact.schema, Some(SchemaRef::from("api.graphql")));
        assert_eq!(
            artifact.documents,
            Some(Documents::Pattern("src/api/**/*.graphql".to_string()))
        );
        assert!(!artifact.extra.contains_key("<<"));
        assert!(artifact.extra.contains_key("plugins"));
        assert!(artifact.extra.contains_key("config"));
    }

    #[test]
    fn test_interpolate_env() {
        let lookup = |name: &str| (name == "API_URL").then(|| "https://api.test/graphql".to_string());
        assert_eq!(
            interpolate_env("schema: ${API_URL}\n", lookup),
            "schema: https://api.test/graphql\n"
        );
        assert_eq!(
            interpolate_env("schema: ${MISSING:schema.graphql}", lookup),
            "schema: schema.graphql"
        );
        assert_eq!(interpolate_env(r#"a: "${MISSING:'x'}""#, lookup), r#"a: "x""#);
        assert_eq!(interpolate_env("a: ${MISSING}", lookup), "a: ");
        assert_eq!(interpolate_env("no references", lookup), "no references");
    }

    #[tokio::test]
    async fn test_yaml_config_defaults_apply_for_unset_variables() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let path = dir.path().join("codegen.yml");
        std::fs::write(
            &path,
            "schema: ${GQLWATCH_TEST_UNSET_SCHEMA:schema.graphql}\n",
        )
        .unwrap();

        let context = engine.create_context(&path).await.unwrap();
        assert_eq!(context.config().schema, Some(SchemaRef::from("schema.graphql")));
    }

    #[tokio::test]
    async fn test_script_config_with_missing_node_binary() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/@graphql-codegen/cli")).unwrap();
        let path = dir.path().join("codegen.js");
        std::fs::write(&path, "module.exports = { schema: 'schema.graphql' };\n").unwrap();

        let engine = NodeEngineProvider::new(dir.path())
            .with_node_binary("gqlwatch-no-such-node")
            .engine()
            .unwrap();
        let err = engine.create_context(&path).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("gqlwatch-no-such-node"));
    }

    #[tokio::test]
    async fn test_create_context_from_json() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let path = dir.path().join("codegen.json");
        std::fs::write(
            &path,
            r#"{ "generates": { "src/types.ts": { "documents": ["src/**/*.graphql"], "plugins": ["typescript"] } } }"#,
        )
        .unwrap();

        let context = engine.create_context(&path).await.unwrap();
        let generates = context.config().generates.as_ref().unwrap();
        assert!(generates.contains_key("src/types.ts"));
    }

    #[tokio::test]
    async fn test_create_context_from_package_json() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let path = dir.path().join("package.json");
        std::fs::write(
            &path,
            r#"{ "name": "app", "codegen": { "schema": "schema.graphql" } }"#,
        )
        .unwrap();

        let context = engine.create_context(&path).await.unwrap();
        assert!(context.config().is_single_artifact());
    }

    #[tokio::test]
    async fn test_package_json_without_codegen_field() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let path = dir.path().join("package.json");
        std::fs::write(&path, r#"{ "name": "app" }"#).unwrap();

        let err = engine.create_context(&path).await.unwrap_err();
        assert!(err.to_string().contains("has no 'codegen' field"));
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_reported_with_path() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let path = dir.path().join("codegen.yaml");
        std::fs::write(&path, "generates: [unclosed\n").unwrap();

        let err = engine.create_context(&path).await.unwrap_err();
        assert!(matches!(err, Error::Yaml { .. }));
        assert!(err.to_string().contains("codegen.yaml"));
    }

    #[tokio::test]
    async fn test_missing_config_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let engine = engine_for(&dir);
        let err = engine
            .create_context(&dir.path().join("codegen.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_collect_errors_prefers_flagged_lines() {
        let stderr = "  ✔ Parse Configuration\n  ✖ src/types.ts\n    Error: Unknown type \"Userr\"\n";
        assert_eq!(
            collect_errors(stderr, ""),
            vec!["✖ src/types.ts", "Error: Unknown type \"Userr\""]
        );
    }

    #[test]
    fn test_collect_errors_falls_back_to_stderr() {
        assert_eq!(
            collect_errors("\nsomething went wrong\n\n", "irrelevant"),
            vec!["something went wrong"]
        );
        assert!(collect_errors("", "").is_empty());
    }
}
