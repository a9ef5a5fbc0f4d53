//! Spec Loader: reads a YAML source file, optionally Jinja-renders it,
//! resolves `!include` tags, merges a caller-supplied base document under
//! the parsed result, and deserializes into a target type.

use std::path::{Path, PathBuf};

use minijinja::Environment;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use stackctl_core::{merge_mappings, HasSpec, Resolver, SpecHandle};
use stackctl_templates::resolve_includes;

use crate::error::SpecResult;

/// A single loaded spec document: the source path, the rendered text (if
/// Jinja was involved), and the final merged YAML value.
#[derive(Debug, Clone)]
pub struct Spec {
    pub path: PathBuf,
    pub rendered: Option<String>,
    pub data: Value,
}

impl Spec {
    /// Load `path`, Jinja-render it through `env` (when given), resolve
    /// `!include` tags, then deep-merge the parsed document on top of
    /// `merge_from` (the parsed document wins on scalar conflicts).
    pub fn load(
        path: impl Into<PathBuf>,
        env: Option<&Environment<'static>>,
        merge_from: Option<&Mapping>,
        render_ctx: &serde_json::Value,
        resolver: Option<&Resolver<'_>>,
    ) -> SpecResult<Self> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)?;

        let rendered = match env {
            Some(env) => Some(stackctl_templates::render_str(env, &text, render_ctx)?),
            None => None,
        };

        let source = rendered.as_deref().unwrap_or(&text);
        let parsed: Value = serde_yaml::from_str(source)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let resolved = resolve_includes(parsed, base_dir, resolver)?;

        let data = match (merge_from, resolved.as_mapping()) {
            (Some(base), Some(overlay)) => Value::Mapping(merge_mappings(base, overlay)),
            (None, _) => resolved,
            (Some(_), None) => resolved,
        };

        Ok(Self {
            path,
            rendered,
            data,
        })
    }

    /// Deserialize the merged document into `T`.
    pub fn parse_as<T: DeserializeOwned>(&self) -> SpecResult<T> {
        Ok(serde_yaml::from_value(self.data.clone())?)
    }

    /// Deserialize the merged document into `T` and record this document's
    /// provenance (source path, rendered text) on it, so `T` can later
    /// answer "what file, and what did it render to" without re-reading the
    /// source off disk.
    pub fn parse_obj_as<T: DeserializeOwned + HasSpec>(&self) -> SpecResult<T> {
        let mut value: T = self.parse_as()?;
        value.set_spec(SpecHandle {
            path: self.path.clone(),
            rendered: self.rendered.clone(),
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize)]
    struct Doc {
        name: String,
        count: i64,
    }

    #[test]
    fn loads_plain_yaml_without_jinja() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        std::fs::write(&path, "name: widget\ncount: 3\n").unwrap();

        let spec = Spec::load(&path, None, None, &serde_json::json!({}), None).unwrap();
        let doc: Doc = spec.parse_as().unwrap();
        assert_eq!(doc.name, "widget");
        assert_eq!(doc.count, 3);
    }

    #[test]
    fn parsed_document_wins_over_merge_from() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        std::fs::write(&path, "name: widget\n").unwrap();

        let mut base = Mapping::new();
        base.insert(Value::from("name"), Value::from("base-name"));
        base.insert(Value::from("count"), Value::from(9));

        let spec = Spec::load(&path, None, Some(&base), &serde_json::json!({}), None).unwrap();
        let doc: Doc = spec.parse_as().unwrap();
        assert_eq!(doc.name, "widget");
        assert_eq!(doc.count, 9);
    }

    #[test]
    fn renders_jinja_before_parsing_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        std::fs::write(&path, "name: {{ cluster }}\ncount: 1\n").unwrap();

        let env = stackctl_templates::build_environment(dir.path());
        let spec = Spec::load(&path, Some(&env), None, &serde_json::json!({"cluster": "dev"}), None).unwrap();
        let doc: Doc = spec.parse_as().unwrap();
        assert_eq!(doc.name, "dev");
    }

    #[test]
    fn resolves_includes_after_rendering() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("child.yaml"), "count: 7\n").unwrap();
        std::fs::write(
            dir.path().join("doc.yaml"),
            "name: widget\nextra: !include child.yaml\n",
        )
        .unwrap();

        let spec = Spec::load(&dir.path().join("doc.yaml"), None, None, &serde_json::json!({}), None).unwrap();
        let extra = spec.data.as_mapping().unwrap().get("extra").unwrap();
        assert_eq!(extra.as_mapping().unwrap().get("count"), Some(&Value::from(7)));
    }
}
