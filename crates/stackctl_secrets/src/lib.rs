//! # stackctl_secrets
//!
//! Secret Facade: a [`SecretStore`] trait with a Vault KV-v2 backed
//! implementation and an in-memory mock for tests and offline API serving.

pub mod error;
pub mod mock;
pub mod store;
pub mod vault;

pub use error::{SecretsError, SecretsResult};
pub use mock::MockSecretStore;
pub use store::{attach_schema, schema_for, Secret, SecretPath, SecretStore};
pub use vault::VaultSecretStore;
