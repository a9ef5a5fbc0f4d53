//! End-to-end coverage of `build_module`: the scope-merge precedence,
//! backend key, and dependency projection invariants a single module build
//! must satisfy.

use std::collections::HashMap;

use minijinja::Environment;
use serde_yaml::Mapping;

use stackctl_core::{Backend, Cluster, ClusterStack, Module, Repo, Resolver, Stack};
use stackctl_iac::{build_module, ModuleBuildInput};
use stackctl_secrets::MockSecretStore;

fn local_repos() -> HashMap<String, Repo> {
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
    repos
}

fn var(key: &str, value: impl Into<serde_yaml::Value>) -> Mapping {
    let mut m = Mapping::new();
    m.insert(key.into(), value.into());
    m
}

#[tokio::test]
async fn build_places_module_under_cluster_stack_module_and_backend_key() {
    let workspace = tempfile::TempDir::new().unwrap();
    let repos = local_repos();
    let resolver = Resolver::new(workspace.path(), &repos);

    let cluster = Cluster {
        name: "dev".to_string(),
        vars: Mapping::new(),
        stacks: HashMap::new(),
        backend: None,
        spec: None,
    };
    let cluster_stack = ClusterStack {
        name: Some("foo".to_string()),
        src: None,
        vars: Mapping::new(),
        module_vars: HashMap::new(),
        r#override: Mapping::new(),
        backend: None,
        operations: Mapping::new(),
    };
    let mut modules = HashMap::new();
    let module = Module {
        name: Some("bar".to_string()),
        src: "root:stack/foo/bar".to_string(),
        vars: Mapping::new(),
        module_vars: Mapping::new(),
        built_vars: Mapping::new(),
        providers: vec![],
        provider_overrides: Mapping::new(),
        inputs: vec![],
        deps: vec![],
        backend: None,
        secrets: HashMap::new(),
        schemas: None,
    };
    modules.insert("bar".to_string(), module.clone());
    let stack = Stack {
        name: Some("foo".to_string()),
        src: None,
        modules,
        operations: HashMap::new(),
        vars: Mapping::new(),
        backend: None,
        stack_schema: serde_json::Value::Null,
        spec: None,
    };

    let project_vars = Mapping::new();
    let providers = HashMap::new();
    let build_root = workspace.path().join("build");
    let jinja_env: Environment<'static> = Environment::new();
    let secret_store = MockSecretStore::new();

    let input = ModuleBuildInput {
        cluster: &cluster,
        cluster_stack_name: "foo",
        cluster_stack: &cluster_stack,
        stack_name: "foo",
        stack: &stack,
        module_name: "bar",
        module: &module,
        project_vars: &project_vars,
        project_root: workspace.path(),
        build_root: &build_root,
        dns_zone: "example.com",
        providers: &providers,
        resolver: &resolver,
        project_backend: Some(&Backend::default()),
    };

    let built = build_module(&input, &jinja_env, &secret_store).await.unwrap();

    assert_eq!(built.build_path, build_root.join("dev").join("foo").join("bar"));
    assert_eq!(built.backend.config.get("key"), Some(&serde_yaml::Value::from("dev/foo-bar")));
}

#[tokio::test]
async fn cluster_stack_module_vars_outrank_module_vars_for_a_derived_key() {
    let workspace = tempfile::TempDir::new().unwrap();
    let repos = local_repos();
    let resolver = Resolver::new(workspace.path(), &repos);

    let cluster = Cluster {
        name: "dev".to_string(),
        vars: Mapping::new(),
        stacks: HashMap::new(),
        backend: None,
        spec: None,
    };

    let mut module_vars = HashMap::new();
    module_vars.insert("bar".to_string(), var("group", "blue"));
    let cluster_stack = ClusterStack {
        name: Some("foo".to_string()),
        src: None,
        vars: Mapping::new(),
        module_vars,
        r#override: Mapping::new(),
        backend: None,
        operations: Mapping::new(),
    };

    let module = Module {
        name: Some("bar".to_string()),
        src: "root:stack/foo/bar".to_string(),
        vars: var("group", "canary"),
        module_vars: Mapping::new(),
        built_vars: Mapping::new(),
        providers: vec![],
        provider_overrides: Mapping::new(),
        inputs: vec![],
        deps: vec![],
        backend: None,
        secrets: HashMap::new(),
        schemas: None,
    };
    let mut modules = HashMap::new();
    modules.insert("bar".to_string(), module.clone());
    let stack = Stack {
        name: Some("foo".to_string()),
        src: None,
        modules,
        operations: HashMap::new(),
        vars: Mapping::new(),
        backend: None,
        stack_schema: serde_json::Value::Null,
        spec: None,
    };

    let project_vars = Mapping::new();
    let providers = HashMap::new();
    let build_root = workspace.path().join("build");
    let jinja_env: Environment<'static> = Environment::new();
    let secret_store = MockSecretStore::new();

    let input = ModuleBuildInput {
        cluster: &cluster,
        cluster_stack_name: "foo",
        cluster_stack: &cluster_stack,
        stack_name: "foo",
        stack: &stack,
        module_name: "bar",
        module: &module,
        project_vars: &project_vars,
        project_root: workspace.path(),
        build_root: &build_root,
        dns_zone: "example.com",
        providers: &providers,
        resolver: &resolver,
        project_backend: None,
    };

    let built = build_module(&input, &jinja_env, &secret_store).await.unwrap();
    let group = built.variables.iter().find(|v| v.name == "group").unwrap();
    assert_eq!(group.value, serde_yaml::Value::from("blue"));
}

#[tokio::test]
async fn dependency_abspath_is_rooted_under_cluster_then_stack_then_module() {
    let workspace = tempfile::TempDir::new().unwrap();
    let repos = local_repos();
    let resolver = Resolver::new(workspace.path(), &repos);

    let cluster = Cluster {
        name: "dev".to_string(),
        vars: Mapping::new(),
        stacks: HashMap::new(),
        backend: None,
        spec: None,
    };
    let cluster_stack = ClusterStack {
        name: Some("foo".to_string()),
        src: None,
        vars: Mapping::new(),
        module_vars: HashMap::new(),
        r#override: Mapping::new(),
        backend: None,
        operations: Mapping::new(),
    };
    let module = Module {
        name: Some("bar".to_string()),
        src: "root:stack/foo/bar".to_string(),
        vars: Mapping::new(),
        module_vars: Mapping::new(),
        built_vars: Mapping::new(),
        providers: vec![],
        provider_overrides: Mapping::new(),
        inputs: vec![],
        deps: vec!["dns/zone".to_string(), "database".to_string()],
        backend: None,
        secrets: HashMap::new(),
        schemas: None,
    };
    let mut modules = HashMap::new();
    modules.insert("bar".to_string(), module.clone());
    let stack = Stack {
        name: Some("foo".to_string()),
        src: None,
        modules,
        operations: HashMap::new(),
        vars: Mapping::new(),
        backend: None,
        stack_schema: serde_json::Value::Null,
        spec: None,
    };

    let project_vars = Mapping::new();
    let providers = HashMap::new();
    let build_root = workspace.path().join("build");
    let jinja_env: Environment<'static> = Environment::new();
    let secret_store = MockSecretStore::new();

    let input = ModuleBuildInput {
        cluster: &cluster,
        cluster_stack_name: "foo",
        cluster_stack: &cluster_stack,
        stack_name: "foo",
        stack: &stack,
        module_name: "bar",
        module: &module,
        project_vars: &project_vars,
        project_root: workspace.path(),
        build_root: &build_root,
        dns_zone: "example.com",
        providers: &providers,
        resolver: &resolver,
        project_backend: None,
    };

    let built = build_module(&input, &jinja_env, &secret_store).await.unwrap();
    let cross = built.dependencies.iter().find(|d| d.name == "dns/zone").unwrap();
    assert_eq!(cross.abspath, build_root.join("dev").join("dns").join("zone").to_string_lossy());
    let same = built.dependencies.iter().find(|d| d.name == "database").unwrap();
    assert_eq!(same.abspath, build_root.join("dev").join("foo").join("database").to_string_lossy());
}

#[tokio::test]
async fn secret_status_reflects_store_contents() {
    let workspace = tempfile::TempDir::new().unwrap();
    let repos = local_repos();
    let resolver = Resolver::new(workspace.path(), &repos);

    let cluster = Cluster {
        name: "dev".to_string(),
        vars: Mapping::new(),
        stacks: HashMap::new(),
        backend: None,
        spec: None,
    };
    let cluster_stack = ClusterStack {
        name: Some("foo".to_string()),
        src: None,
        vars: Mapping::new(),
        module_vars: HashMap::new(),
        r#override: Mapping::new(),
        backend: None,
        operations: Mapping::new(),
    };

    let mut secrets = HashMap::new();
    secrets.insert(
        "db-password".to_string(),
        stackctl_core::ModuleSecret {
            name: Some("db-password".to_string()),
            secret_type: Some("password".to_string()),
            secret_schema: None,
            required: true,
            status: stackctl_core::ModuleSecretStatus::Unknown,
        },
    );
    secrets.insert(
        "api-key".to_string(),
        stackctl_core::ModuleSecret {
            name: Some("api-key".to_string()),
            secret_type: Some("password".to_string()),
            secret_schema: None,
            required: false,
            status: stackctl_core::ModuleSecretStatus::Unknown,
        },
    );

    let module = Module {
        name: Some("bar".to_string()),
        src: "root:stack/foo/bar".to_string(),
        vars: Mapping::new(),
        module_vars: Mapping::new(),
        built_vars: Mapping::new(),
        providers: vec![],
        provider_overrides: Mapping::new(),
        inputs: vec![],
        deps: vec![],
        backend: None,
        secrets,
        schemas: None,
    };
    let mut modules = HashMap::new();
    modules.insert("bar".to_string(), module.clone());

    let mut schema = serde_json::Map::new();
    let mut schemas = serde_json::Map::new();
    schemas.insert("password".to_string(), serde_json::json!({"type": "string"}));
    let mut components = serde_json::Map::new();
    components.insert("schemas".to_string(), serde_json::Value::Object(schemas));
    schema.insert("components".to_string(), serde_json::Value::Object(components));

    let stack = Stack {
        name: Some("foo".to_string()),
        src: None,
        modules,
        operations: HashMap::new(),
        vars: Mapping::new(),
        backend: None,
        stack_schema: serde_json::Value::Object(schema),
        spec: None,
    };

    let project_vars = Mapping::new();
    let providers = HashMap::new();
    let build_root = workspace.path().join("build");
    let jinja_env: Environment<'static> = Environment::new();
    let secret_store = MockSecretStore::new();
    let path = stackctl_secrets::SecretPath::new("dev", "foo", "bar");
    secret_store
        .seed(&path, "db-password", stackctl_secrets::Secret::default())
        .await;

    let input = ModuleBuildInput {
        cluster: &cluster,
        cluster_stack_name: "foo",
        cluster_stack: &cluster_stack,
        stack_name: "foo",
        stack: &stack,
        module_name: "bar",
        module: &module,
        project_vars: &project_vars,
        project_root: workspace.path(),
        build_root: &build_root,
        dns_zone: "example.com",
        providers: &providers,
        resolver: &resolver,
        project_backend: None,
    };

    let built = build_module(&input, &jinja_env, &secret_store).await.unwrap();
    assert_eq!(built.secrets["db-password"].status, stackctl_core::ModuleSecretStatus::Exists);
    assert_eq!(built.secrets["api-key"].status, stackctl_core::ModuleSecretStatus::NotExists);
    assert_eq!(
        built.secrets["db-password"].secret_schema,
        Some(serde_json::json!({"type": "string"}))
    );
}
