//! `!include PATH[#FRAGMENT]` YAML tag resolution.
//!
//! Mirrors a custom YAML-loader tag: any node tagged `!include` names
//! another YAML file (optionally followed by `#a/b/c` to descend into a
//! nested mapping of the included document). Included documents are
//! parsed and recursively resolved in turn, bounded by a maximum nesting
//! depth so a self-referential chain fails loudly instead of hanging.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use stackctl_core::Resolver;

use crate::error::{TemplateError, TemplateResult};

const INCLUDE_TAG: &str = "!include";
const MAX_DEPTH: usize = 32;

/// Load a YAML file from `path`, resolving any `!include` tags found
/// within it (and transitively within whatever they include). `resolver`,
/// when given, routes scheme-prefixed references (`core:schemas.yaml`)
/// into the named repo's checkout instead of failing; bare references
/// still resolve relative to the including file's own directory.
pub fn load_with_includes(path: &Path, resolver: Option<&Resolver<'_>>) -> TemplateResult<Value> {
    load_with_includes_at_depth(path, 0, resolver)
}

/// Resolve `!include` tags in an already-parsed document. Used when the
/// top-level document text was Jinja-rendered before YAML parsing, so the
/// parse can't be driven directly from the file on disk.
pub fn resolve_includes(value: Value, base_dir: &Path, resolver: Option<&Resolver<'_>>) -> TemplateResult<Value> {
    resolve_value(value, base_dir, 0, resolver)
}

fn load_with_includes_at_depth(path: &Path, depth: usize, resolver: Option<&Resolver<'_>>) -> TemplateResult<Value> {
    if depth > MAX_DEPTH {
        return Err(TemplateError::IncludeDepthExceeded {
            path: path.display().to_string(),
            max: MAX_DEPTH,
        });
    }

    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&text)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_value(value, base_dir, depth, resolver)
}

fn resolve_value(value: Value, base_dir: &Path, depth: usize, resolver: Option<&Resolver<'_>>) -> TemplateResult<Value> {
    match value {
        Value::Tagged(tagged) if tagged.tag.to_string() == INCLUDE_TAG => {
            let reference = tagged
                .value
                .as_str()
                .ok_or_else(|| TemplateError::NotFound(format!("{INCLUDE_TAG}: non-string reference")))?
                .to_string();
            resolve_include(&reference, base_dir, depth, resolver)
        }
        Value::Mapping(map) => {
            let mut resolved = serde_yaml::Mapping::new();
            for (key, val) in map {
                resolved.insert(key, resolve_value(val, base_dir, depth, resolver)?);
            }
            Ok(Value::Mapping(resolved))
        }
        Value::Sequence(seq) => {
            let resolved: Result<Vec<_>, _> = seq
                .into_iter()
                .map(|item| resolve_value(item, base_dir, depth, resolver))
                .collect();
            Ok(Value::Sequence(resolved?))
        }
        other => Ok(other),
    }
}

fn resolve_include(reference: &str, base_dir: &Path, depth: usize, resolver: Option<&Resolver<'_>>) -> TemplateResult<Value> {
    let (rel_path, fragment) = match reference.split_once('#') {
        Some((p, f)) => (p, Some(f)),
        None => (reference, None),
    };

    // A `scheme:path` reference routes through the URI resolver into the
    // named repo's checkout; a bare path stays relative to the including
    // file, same as before.
    let full_path: PathBuf = match rel_path.split_once(':') {
        Some(_) => {
            let resolver = resolver.ok_or_else(|| {
                TemplateError::NotFound(format!("{INCLUDE_TAG}: no resolver available for scheme-qualified reference {rel_path}"))
            })?;
            resolver.resolve_path(rel_path)?
        }
        None => base_dir.join(rel_path),
    };
    let included = load_with_includes_at_depth(&full_path, depth + 1, resolver)?;

    match fragment {
        Some(fragment) => get_fragment(&included, fragment, &full_path),
        None => Ok(included),
    }
}

/// Descend into `data` along a `/`-separated path of mapping keys.
fn get_fragment(data: &Value, fragment: &str, path: &Path) -> TemplateResult<Value> {
    let mut current = data.clone();
    for segment in fragment.split('/').filter(|s| !s.is_empty()) {
        let mapping = current.as_mapping().ok_or_else(|| TemplateError::FragmentNotFound {
            path: path.display().to_string(),
            fragment: fragment.to_string(),
        })?;
        current = mapping
            .get(Value::String(segment.to_string()))
            .cloned()
            .ok_or_else(|| TemplateError::FragmentNotFound {
                path: path.display().to_string(),
                fragment: fragment.to_string(),
            })?;
    }
    Ok(current)
}
