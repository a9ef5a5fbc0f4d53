//! Vault KV-v2 backed [`SecretStore`].
//!
//! No Vault client crate exists in this ecosystem's standard toolbox, so
//! this talks to Vault's well-documented KV-v2 REST surface directly over
//! `reqwest`, the way the rest of stackctl talks to any other HTTP API.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::{SecretsError, SecretsResult};
use crate::store::{Secret, SecretPath, SecretStore};

/// A Vault client scoped to one KV-v2 mount.
pub struct VaultSecretStore {
    client: reqwest::Client,
    address: String,
    token: String,
    mount: String,
}

impl VaultSecretStore {
    pub fn new(address: impl Into<String>, token: impl Into<String>, mount: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            address: address.into(),
            token: token.into(),
            mount: mount.into(),
        }
    }

    fn data_url(&self, path: &SecretPath, name: &str) -> String {
        format!(
            "{}/v1/{}/data/{}/{}",
            self.address.trim_end_matches('/'),
            self.mount,
            path.mount_path(),
            name
        )
    }

    fn metadata_url(&self, path: &SecretPath, name: &str) -> String {
        format!(
            "{}/v1/{}/metadata/{}/{}",
            self.address.trim_end_matches('/'),
            self.mount,
            path.mount_path(),
            name
        )
    }

    fn list_url(&self, path: &SecretPath) -> String {
        format!(
            "{}/v1/{}/metadata/{}",
            self.address.trim_end_matches('/'),
            self.mount,
            path.mount_path()
        )
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn list(&self, path: &SecretPath) -> SecretsResult<Vec<String>> {
        let response = self
            .client
            .request(reqwest::Method::from_bytes(b"LIST").unwrap(), self.list_url(path))
            .header("X-Vault-Token", &self.token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(path = %path.mount_path(), "vault list: invalid path, treating as empty");
            return Ok(Vec::new());
        }
        let response = response.error_for_status()?;
        let body: serde_json::Value = response.json().await?;
        let keys = body["data"]["keys"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        Ok(keys)
    }

    async fn read(&self, path: &SecretPath, name: &str) -> SecretsResult<Option<Secret>> {
        let response = self
            .client
            .get(self.data_url(path, name))
            .header("X-Vault-Token", &self.token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        let body: serde_json::Value = response.json().await?;

        let data: HashMap<String, String> = serde_json::from_value(body["data"]["data"].clone()).unwrap_or_default();
        let metadata = body["data"]["metadata"].get("custom_metadata").cloned();
        let secret_type = metadata
            .as_ref()
            .and_then(|m| m.get("schema"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Some(Secret {
            name: Some(name.to_string()),
            module_name: Some(path.module.clone()),
            stack_name: Some(path.stack.clone()),
            cluster_name: Some(path.cluster.clone()),
            secret_type,
            secret_schema: None,
            data,
            metadata,
        }))
    }

    async fn write(&self, path: &SecretPath, name: &str, secret: Secret) -> SecretsResult<()> {
        let response = self
            .client
            .post(self.data_url(path, name))
            .header("X-Vault-Token", &self.token)
            .json(&json!({ "data": secret.data }))
            .send()
            .await?;
        response.error_for_status_ref().map_err(SecretsError::Http)?;

        let existing_metadata = self.read(path, name).await.ok().flatten().and_then(|s| s.metadata);
        let already_has_schema = existing_metadata
            .as_ref()
            .and_then(|m| m.get("schema"))
            .is_some();

        if !already_has_schema {
            if let Some(secret_type) = &secret.secret_type {
                let response = self
                    .client
                    .post(self.metadata_url(path, name))
                    .header("X-Vault-Token", &self.token)
                    .json(&json!({ "custom_metadata": { "schema": secret_type } }))
                    .send()
                    .await?;
                response.error_for_status_ref().map_err(SecretsError::Http)?;
            }
        }

        Ok(())
    }
}
