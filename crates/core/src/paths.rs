//! Path resolution against the project root.
//!
//! Every filesystem reference found in a codegen config is made absolute by
//! anchoring it at the project root. Absolute paths and URL-like references
//! (`https://…`, `file://…`) pass through untouched. Joining is the only
//! transformation applied: `..` and `.` segments are kept as written and the
//! target is never checked for existence.

use std::path::Path;

/// Return true if `reference` starts with a URL scheme followed by `://`.
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`.
/// Windows drive prefixes (`C:\`) are not schemes.
#[must_use]
pub fn is_url_like(reference: &str) -> bool {
    let Some((scheme, _)) = reference.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolve a filesystem reference against `root`.
///
/// Absolute paths and URL-like strings are returned unchanged; anything
/// else is joined onto `root`.
#[must_use]
pub fn resolve_path(reference: &str, root: &Path) -> String {
    if Path::new(reference).is_absolute() || is_url_like(reference) {
        return reference.to_string();
    }
    root.join(reference).to_string_lossy().into_owned()
}

/// Resolve a glob pattern against `root`, keeping a leading `!` negation.
#[must_use]
pub fn resolve_pattern(pattern: &str, root: &Path) -> String {
    match pattern.strip_prefix('!') {
        Some(negated) => format!("!{}", resolve_path(negated, root)),
        None => resolve_path(pattern, root),
    }
}

/// Express `path` relative to `root` with `/` separators.
///
/// Paths outside of `root` are returned as given (still `/`-separated) so
/// they can be matched against absolute patterns.
#[must_use]
pub fn relative_to_root(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn root() -> PathBuf {
        PathBuf::from("/work/project")
    }

    #[test]
    fn test_relative_path_is_joined_onto_root() {
        for reference in ["schema.graphql", "src/api/schema.graphql", "../shared/schema.graphql"] {
            assert_eq!(
                resolve_path(reference, &root()),
                root().join(reference).to_string_lossy()
            );
        }
    }

    #[test]
    fn test_dot_segments_are_not_normalized() {
        assert_eq!(
            resolve_path("./src/../schema.graphql", &root()),
            "/work/project/./src/../schema.graphql"
        );
    }

    #[test]
    fn test_absolute_path_is_identity() {
        assert_eq!(
            resolve_path("/etc/schema.graphql", &root()),
            "/etc/schema.graphql"
        );
    }

    #[test]
    fn test_url_is_identity() {
        for url in [
            "http://localhost:4000/graphql",
            "https://api.example.com/graphql",
            "file:///tmp/schema.graphql",
            "git+ssh://host/repo",
        ] {
            assert_eq!(resolve_path(url, &root()), url);
        }
    }

    #[test]
    fn test_is_url_like() {
        assert!(is_url_like("https://example.com"));
        assert!(is_url_like("svn+ssh://example.com"));
        assert!(!is_url_like("schema.graphql"));
        assert!(!is_url_like("C:\\schema.graphql"));
        assert!(!is_url_like("://missing-scheme"));
        assert!(!is_url_like("1http://digit-first"));
        assert!(!is_url_like("src/http://nested"));
    }

    #[test]
    fn test_missing_target_is_not_an_error() {
        let resolved = resolve_path("does/not/exist.graphql", &root());
        assert_eq!(resolved, "/work/project/does/not/exist.graphql");
    }

    #[test]
    fn test_resolve_pattern_keeps_negation() {
        assert_eq!(
            resolve_pattern("!src/**/*.skip.graphql", &root()),
            "!/work/project/src/**/*.skip.graphql"
        );
        assert_eq!(
            resolve_pattern("src/**/*.graphql", &root()),
            "/work/project/src/**/*.graphql"
        );
    }

    #[test]
    fn test_relative_to_root() {
        assert_eq!(
            relative_to_root(Path::new("/work/project/src/api/users.graphql"), &root()),
            "src/api/users.graphql"
        );
    }

    #[test]
    fn test_relative_to_root_outside_root() {
        assert_eq!(
            relative_to_root(Path::new("/elsewhere/users.graphql"), &root()),
            "/elsewhere/users.graphql"
        );
    }
}
