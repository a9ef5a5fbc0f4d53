//! Template environment: a minijinja `Environment` wired with the filters
//! and globals the core repo's templates expect.

use std::path::{Path, PathBuf};

use minijinja::value::Value as JinjaValue;
use minijinja::{path_loader, Environment};

use crate::error::TemplateResult;

/// Build a template environment rooted at `template_root`, with a
/// filesystem loader plus the `from_yaml`/`to_json` filters and `readfile`
/// global the original template set relies on.
pub fn build_environment(template_root: impl AsRef<Path>) -> Environment<'static> {
    let root: PathBuf = template_root.as_ref().to_path_buf();
    let mut env = Environment::new();
    env.set_loader(path_loader(root.clone()));
    env.add_filter("from_yaml", from_yaml_filter);
    env.add_filter("to_json", to_json_filter);
    env.add_global("readfile", make_readfile(root));
    env
}

fn from_yaml_filter(value: String) -> Result<JinjaValue, minijinja::Error> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(&value).map_err(|e| {
        minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("from_yaml: {e}"),
        )
    })?;
    Ok(JinjaValue::from_serialize(&parsed))
}

fn to_json_filter(value: JinjaValue) -> Result<String, minijinja::Error> {
    serde_json::to_string(&value).map_err(|e| {
        minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, format!("to_json: {e}"))
    })
}

fn make_readfile(root: PathBuf) -> impl Fn(String) -> Result<String, minijinja::Error> + Send + Sync + 'static {
    move |relpath: String| {
        std::fs::read_to_string(root.join(&relpath)).map_err(|e| {
            minijinja::Error::new(
                minijinja::ErrorKind::InvalidOperation,
                format!("readfile({relpath}): {e}"),
            )
        })
    }
}

/// Render a standalone template string (not looked up via the loader)
/// against the given context, e.g. for a stack/module source file that
/// carries its own Jinja markup before becoming YAML.
pub fn render_str(env: &Environment<'static>, source: &str, ctx: &serde_json::Value) -> TemplateResult<String> {
    let tmpl = env.template_from_str(source)?;
    Ok(tmpl.render(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_yaml_filter_parses_nested_structures() {
        let env = build_environment(".");
        let tmpl = env
            .template_from_str("{{ (src | from_yaml).name }}")
            .unwrap();
        let mut ctx = std::collections::HashMap::new();
        ctx.insert("src", "name: foo\n");
        assert_eq!(tmpl.render(ctx).unwrap(), "foo");
    }

    #[test]
    fn readfile_reads_relative_to_template_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("note.txt"), "hello").unwrap();
        let env = build_environment(dir.path());
        let tmpl = env.template_from_str("{{ readfile('note.txt') }}").unwrap();
        assert_eq!(tmpl.render(()).unwrap(), "hello");
    }
}
