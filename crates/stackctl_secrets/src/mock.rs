//! In-memory [`SecretStore`] for tests and the `MockSecretStore`-backed
//! API facade paths.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SecretsResult;
use crate::store::{Secret, SecretPath, SecretStore};

/// A captured `write` call, kept for test assertions.
#[derive(Debug, Clone)]
pub struct CapturedWrite {
    pub path: String,
    pub name: String,
    pub secret: Secret,
}

/// In-memory secret store, keyed by `cluster/stack/module/name`.
#[derive(Default)]
pub struct MockSecretStore {
    secrets: Arc<RwLock<HashMap<String, Secret>>>,
    captured_writes: Arc<RwLock<Vec<CapturedWrite>>>,
}

impl MockSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &SecretPath, name: &str) -> String {
        format!("{}/{}", path.mount_path(), name)
    }

    /// Seed a secret directly, bypassing `write`.
    pub async fn seed(&self, path: &SecretPath, name: &str, secret: Secret) {
        self.secrets.write().await.insert(Self::key(path, name), secret);
    }

    pub async fn captured_writes(&self) -> Vec<CapturedWrite> {
        self.captured_writes.read().await.clone()
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn list(&self, path: &SecretPath) -> SecretsResult<Vec<String>> {
        let prefix = format!("{}/", path.mount_path());
        let names = self
            .secrets
            .read()
            .await
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect();
        Ok(names)
    }

    async fn read(&self, path: &SecretPath, name: &str) -> SecretsResult<Option<Secret>> {
        Ok(self.secrets.read().await.get(&Self::key(path, name)).cloned())
    }

    async fn write(&self, path: &SecretPath, name: &str, secret: Secret) -> SecretsResult<()> {
        self.captured_writes.write().await.push(CapturedWrite {
            path: path.mount_path(),
            name: name.to_string(),
            secret: secret.clone(),
        });
        self.secrets.write().await.insert(Self::key(path, name), secret);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_returns_empty_for_unknown_path() {
        let store = MockSecretStore::new();
        let path = SecretPath::new("dev", "webapp", "database");
        assert_eq!(store.list(&path).await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = MockSecretStore::new();
        let path = SecretPath::new("dev", "webapp", "database");
        let mut secret = Secret::default();
        secret.data.insert("password".to_string(), "hunter2".to_string());

        store.write(&path, "creds", secret).await.unwrap();
        let read_back = store.read(&path, "creds").await.unwrap().unwrap();
        assert_eq!(read_back.data.get("password"), Some(&"hunter2".to_string()));
        assert_eq!(store.list(&path).await.unwrap(), vec!["creds".to_string()]);
    }

    #[tokio::test]
    async fn captures_write_calls() {
        let store = MockSecretStore::new();
        let path = SecretPath::new("dev", "webapp", "database");
        store.write(&path, "creds", Secret::default()).await.unwrap();
        let calls = store.captured_writes().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "creds");
    }
}
