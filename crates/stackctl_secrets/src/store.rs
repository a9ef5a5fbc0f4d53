//! `SecretStore`: the facade every secret backend implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::error::SecretsResult;

/// A single secret as stored at `cluster/stack/module/name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub stack_name: Option<String>,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub secret_type: Option<String>,
    #[serde(default)]
    pub secret_schema: Option<JsonValue>,
    #[serde(default)]
    pub data: HashMap<String, String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

/// A KV-v2-shaped path scoped to a module: `cluster/stack/module`.
#[derive(Debug, Clone)]
pub struct SecretPath {
    pub cluster: String,
    pub stack: String,
    pub module: String,
}

impl SecretPath {
    pub fn new(cluster: impl Into<String>, stack: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            stack: stack.into(),
            module: module.into(),
        }
    }

    pub fn mount_path(&self) -> String {
        format!("{}/{}/{}", self.cluster, self.stack, self.module)
    }
}

/// Look up `secret_type` under a stack's `schema.components.schemas`, the
/// shape a `Secret`/`ModuleSecret`'s `secret_schema` is attached from. `None`
/// if the stack schema doesn't declare that type.
pub fn schema_for<'a>(stack_schema: &'a JsonValue, secret_type: &str) -> Option<&'a JsonValue> {
    stack_schema.get("components")?.get("schemas")?.get(secret_type)
}

/// Attach `secret_schema` onto `secret` from the owning stack's schema, by
/// its `secret_type`. No-op if either is missing.
pub fn attach_schema(secret: &mut Secret, stack_schema: &JsonValue) {
    if let Some(secret_type) = secret.secret_type.as_deref() {
        secret.secret_schema = schema_for(stack_schema, secret_type).cloned();
    }
}

/// Facade over a secret backend: list, read, and write secrets scoped to a
/// module. Implementations must treat "path does not exist yet" as an
/// empty list, not an error — a module with no secrets written is the
/// common case.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List secret names under a module's path. Returns an empty list if
    /// the path has never been written to.
    async fn list(&self, path: &SecretPath) -> SecretsResult<Vec<String>>;

    /// Read one secret by name. Returns `None` if it doesn't exist.
    async fn read(&self, path: &SecretPath, name: &str) -> SecretsResult<Option<Secret>>;

    /// Create or update a secret, merging `metadata` into whatever custom
    /// metadata the secret already carries.
    async fn write(&self, path: &SecretPath, name: &str, secret: Secret) -> SecretsResult<()>;
}
