//! Path/URI Resolver: turns `scheme:path[#fragment]` references into
//! absolute filesystem paths rooted at a repo checkout.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::model::Repo;
use crate::repo::RepoManager;

/// A parsed `scheme:path[#fragment]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRef {
    pub scheme: String,
    pub path: String,
    pub fragment: Option<String>,
}

const DEFAULT_SCHEME: &str = "root";

/// Parse a reference string. A bare path with no `scheme:` prefix defaults
/// to the `root` repo. A `#fragment` suffix addresses a nested key within
/// the referenced YAML document.
pub fn parse_ref(src: &str) -> ParsedRef {
    let (rest, fragment) = match src.split_once('#') {
        Some((rest, frag)) => (rest, Some(frag.to_string())),
        None => (src, None),
    };

    match rest.split_once(':') {
        Some((scheme, path)) => ParsedRef {
            scheme: scheme.to_string(),
            path: path.to_string(),
            fragment,
        },
        None => ParsedRef {
            scheme: DEFAULT_SCHEME.to_string(),
            path: rest.to_string(),
            fragment,
        },
    }
}

/// Resolves references against a fixed set of repos rooted at a workspace
/// directory.
pub struct Resolver<'a> {
    root: PathBuf,
    repos: &'a HashMap<String, Repo>,
}

impl<'a> Resolver<'a> {
    pub fn new(root: impl Into<PathBuf>, repos: &'a HashMap<String, Repo>) -> Self {
        Self {
            root: root.into(),
            repos,
        }
    }

    /// Resolve a reference to an absolute filesystem path, without
    /// appending any default filename.
    pub fn resolve_path(&self, src: &str) -> CoreResult<PathBuf> {
        let parsed = parse_ref(src);
        let repo = self
            .repos
            .get(&parsed.scheme)
            .ok_or_else(|| CoreError::UnknownScheme(parsed.scheme.clone()))?;
        let mgr = RepoManager::new(repo, &self.root);
        Ok(mgr.repo_dir().join(&parsed.path))
    }

    /// Resolve a stack source reference to its `stack.yaml` file, inserting
    /// a `stack/` path segment when the reference names a bare stack id
    /// (single path component with no subdirectory).
    pub fn resolve_stack_path(&self, src: &str) -> CoreResult<PathBuf> {
        let parsed = parse_ref(src);
        let repo = self
            .repos
            .get(&parsed.scheme)
            .ok_or_else(|| CoreError::UnknownScheme(parsed.scheme.clone()))?;
        let mgr = RepoManager::new(repo, &self.root);

        let mut path = PathBuf::from(&parsed.path);
        if !parsed.path.contains('/') {
            path = PathBuf::from("stack").join(&parsed.path);
        }

        let mut full = mgr.repo_dir().join(path);
        if full.extension().and_then(|e| e.to_str()) != Some("yaml") {
            full = full.join("stack.yaml");
        }
        Ok(full)
    }

    /// Resolve a module source reference to its module directory.
    pub fn resolve_module_path(&self, src: &str) -> CoreResult<PathBuf> {
        self.resolve_path(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ref_defaults_to_root_scheme() {
        let parsed = parse_ref("cluster/dev.yaml");
        assert_eq!(parsed.scheme, "root");
        assert_eq!(parsed.path, "cluster/dev.yaml");
        assert_eq!(parsed.fragment, None);
    }

    #[test]
    fn parse_ref_splits_scheme_and_fragment() {
        let parsed = parse_ref("core:versions.yaml#providers/aws");
        assert_eq!(parsed.scheme, "core");
        assert_eq!(parsed.path, "versions.yaml");
        assert_eq!(parsed.fragment.as_deref(), Some("providers/aws"));
    }

    #[test]
    fn resolve_stack_path_inserts_stack_segment_for_bare_id() {
        let mut repos = HashMap::new();
        repos.insert(
            "core".to_string(),
            Repo {
                name: "core".to_string(),
                url: "https://example.com/core.git".to_string(),
                branch: "main".to_string(),
                tag: "latest".to_string(),
                local: false,
            },
        );
        let resolver = Resolver::new("/workspace", &repos);
        let path = resolver.resolve_stack_path("core:webapp").unwrap();
        assert_eq!(
            path,
            PathBuf::from("/workspace/repo/core/stack/webapp/stack.yaml")
        );
    }

    #[test]
    fn resolve_stack_path_respects_explicit_subdir() {
        let mut repos = HashMap::new();
        repos.insert(
            "root".to_string(),
            Repo {
                name: "root".to_string(),
                url: "./".to_string(),
                branch: "main".to_string(),
                tag: "latest".to_string(),
                local: true,
            },
        );
        let resolver = Resolver::new("/workspace", &repos);
        let path = resolver.resolve_stack_path("stack/webapp").unwrap();
        assert_eq!(path, PathBuf::from("/workspace/./stack/webapp/stack.yaml"));
    }

    #[test]
    fn resolve_unknown_scheme_errors() {
        let repos = HashMap::new();
        let resolver = Resolver::new("/workspace", &repos);
        assert!(matches!(
            resolver.resolve_path("missing:foo"),
            Err(CoreError::UnknownScheme(s)) if s == "missing"
        ));
    }
}
