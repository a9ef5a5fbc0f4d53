//! Handlers for the External API Facade. Each one configures a fresh
//! [`Orchestrator`] from `AppState::root`; none share state across
//! requests.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::response::{Json, Redirect};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_yaml::Mapping;

use stackctl_iac::attach_secret_statuses;
use stackctl_orchestrator::{BuildTarget, Orchestrator};
use stackctl_secrets::{attach_schema, Secret, SecretPath, SecretStore};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/config", get(get_config))
        .route("/clusters/", get(list_clusters))
        .route("/cluster/:cluster", get(get_cluster))
        .route("/stack/:cluster/:stack", get(get_stack))
        .route("/module/:cluster/:stack/:module", get(get_module))
        .route("/vars/:cluster/:stack/:module", post(write_module_vars))
        .route("/secret/:cluster/:stack/:module", get(list_secrets))
        .route("/secret/:cluster/:stack/:module/:name", get(read_secret))
        .route("/secret/:cluster/:stack/:module/:name", post(write_secret))
        .route("/build/:cluster", get(build_cluster))
        .with_state(AppState::from_env())
}

async fn root() -> Redirect {
    Redirect::to("/ui/index.html")
}

fn configure(state: &AppState) -> ApiResult<Orchestrator> {
    Ok(Orchestrator::configure(&state.root)?)
}

async fn get_config(State(state): State<AppState>) -> ApiResult<Json<stackctl_core::Config>> {
    let orchestrator = configure(&state)?;
    Ok(Json(orchestrator.config))
}

async fn list_clusters(State(state): State<AppState>) -> ApiResult<Json<HashMap<String, stackctl_core::Cluster>>> {
    let orchestrator = configure(&state)?;
    Ok(Json(orchestrator.clusters))
}

async fn get_cluster(State(state): State<AppState>, Path(cluster): Path<String>) -> ApiResult<Json<stackctl_core::Cluster>> {
    let orchestrator = configure(&state)?;
    let found = orchestrator
        .clusters
        .get(&cluster)
        .cloned()
        .ok_or_else(|| ApiError::ClusterNotFound(cluster))?;
    Ok(Json(found))
}

async fn get_stack(
    State(state): State<AppState>,
    Path((cluster, stack)): Path<(String, String)>,
) -> ApiResult<Json<stackctl_core::Stack>> {
    let orchestrator = configure(&state)?;
    ensure_stack(&orchestrator, &cluster, &stack)?;
    let (_, _, mut parsed) = orchestrator.resolve_stack(&cluster, &stack)?;
    for (module_name, module) in parsed.modules.iter_mut() {
        attach_secret_statuses(
            &mut module.secrets,
            &cluster,
            &stack,
            module_name,
            &parsed.stack_schema,
            orchestrator.secret_store.as_ref(),
        )
        .await;
    }
    Ok(Json(parsed))
}

async fn get_module(
    State(state): State<AppState>,
    Path((cluster, stack, module)): Path<(String, String, String)>,
) -> ApiResult<Json<stackctl_core::Module>> {
    let orchestrator = configure(&state)?;
    ensure_stack(&orchestrator, &cluster, &stack)?;
    let (_, _, parsed) = orchestrator.resolve_stack(&cluster, &stack)?;
    let mut found = parsed
        .modules
        .get(&module)
        .cloned()
        .ok_or_else(|| ApiError::ModuleNotFound(module.clone(), stack.clone()))?;
    attach_secret_statuses(
        &mut found.secrets,
        &cluster,
        &stack,
        &module,
        &parsed.stack_schema,
        orchestrator.secret_store.as_ref(),
    )
    .await;
    Ok(Json(found))
}

async fn write_module_vars(
    State(state): State<AppState>,
    Path((cluster, stack, module)): Path<(String, String, String)>,
    Json(vars): Json<Mapping>,
) -> ApiResult<Json<stackctl_core::Cluster>> {
    let vars_dir = state.root.join("vars").join(&cluster).join(&stack).join(&module);
    std::fs::create_dir_all(&vars_dir)?;
    std::fs::write(vars_dir.join("vars.yaml"), serde_yaml::to_string(&vars)?)?;

    let mut orchestrator = configure(&state)?;
    let target = BuildTarget {
        cluster: cluster.clone(),
        stack: Some(stack),
    };
    orchestrator.build(Some(&target)).await?;

    let found = orchestrator
        .clusters
        .get(&cluster)
        .cloned()
        .ok_or(ApiError::ClusterNotFound(cluster))?;
    Ok(Json(found))
}

async fn list_secrets(
    State(state): State<AppState>,
    Path((cluster, stack, module)): Path<(String, String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    let orchestrator = configure(&state)?;
    let path = SecretPath::new(cluster, stack, module);
    let names = orchestrator.secret_store.list(&path).await?;
    Ok(Json(names))
}

async fn read_secret(
    State(state): State<AppState>,
    Path((cluster, stack, module, name)): Path<(String, String, String, String)>,
) -> ApiResult<Json<Secret>> {
    let orchestrator = configure(&state)?;
    ensure_stack(&orchestrator, &cluster, &stack)?;
    let (_, _, parsed_stack) = orchestrator.resolve_stack(&cluster, &stack)?;
    let path = SecretPath::new(cluster, stack, module);
    let mut secret = orchestrator
        .secret_store
        .read(&path, &name)
        .await?
        .ok_or(ApiError::SecretNotFound(name))?;
    attach_schema(&mut secret, &parsed_stack.stack_schema);
    Ok(Json(secret))
}

#[derive(Deserialize)]
struct SecretWriteBody {
    secret_type: Option<String>,
    secret: HashMap<String, String>,
}

async fn write_secret(
    State(state): State<AppState>,
    Path((cluster, stack, module, name)): Path<(String, String, String, String)>,
    Json(body): Json<SecretWriteBody>,
) -> ApiResult<Json<()>> {
    let orchestrator = configure(&state)?;
    let path = SecretPath::new(cluster.clone(), stack.clone(), module.clone());
    let secret = Secret {
        name: Some(name.clone()),
        module_name: Some(module),
        stack_name: Some(stack),
        cluster_name: Some(cluster),
        secret_type: body.secret_type,
        data: body.secret,
        ..Default::default()
    };
    orchestrator.secret_store.write(&path, &name, secret).await?;
    Ok(Json(()))
}

async fn build_cluster(State(state): State<AppState>, Path(cluster): Path<String>) -> ApiResult<Json<stackctl_core::Cluster>> {
    let mut orchestrator = configure(&state)?;
    if !orchestrator.clusters.contains_key(&cluster) {
        return Err(ApiError::ClusterNotFound(cluster));
    }
    let target = BuildTarget {
        cluster: cluster.clone(),
        stack: None,
    };
    orchestrator.build(Some(&target)).await?;
    let found = orchestrator.clusters.get(&cluster).cloned().ok_or(ApiError::ClusterNotFound(cluster))?;
    Ok(Json(found))
}

fn ensure_stack(orchestrator: &Orchestrator, cluster: &str, stack: &str) -> ApiResult<()> {
    let cluster_model = orchestrator
        .clusters
        .get(cluster)
        .ok_or_else(|| ApiError::ClusterNotFound(cluster.to_string()))?;
    if !cluster_model.stacks.contains_key(stack) {
        return Err(ApiError::StackNotFound(stack.to_string(), cluster.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_redirects_to_ui() {
        let app = Router::new().route("/", get(root));
        let response = app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/ui/index.html");
    }

    #[tokio::test]
    async fn missing_cluster_is_reported_as_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("stackd.yaml"),
            "project:\n  name: demo\n  domain: example.com\n",
        )
        .unwrap();
        std::env::set_var(stackctl_orchestrator::STACKCTL_VAULT_TOKEN_VAR, "test-token");

        let state = AppState { root: dir.path().to_path_buf() };
        let orchestrator = configure(&state).unwrap();
        let result = ensure_stack(&orchestrator, "missing", "any");
        assert!(matches!(result, Err(ApiError::ClusterNotFound(_))));
    }
}
