//! API key operations (`/api_keys`).

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// An API key as it appears in list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiKeySummary {
    #[serde(default)]
    pub api_key_id: String,
    #[serde(default)]
    pub name: String,
}

/// Response of [`Client::list_api_keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiKeyList {
    #[serde(default)]
    pub result: Vec<ApiKeySummary>,
}

/// A single API key with its scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiKey {
    #[serde(default)]
    pub api_key_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Parameters for creating or replacing an API key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewApiKey {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

/// Response of [`Client::create_api_key`].
///
/// `api_key` holds the secret itself and is only ever returned by this
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedApiKey {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_key_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Serialize)]
struct UpdateName<'a> {
    name: &'a str,
}

impl Client {
    /// Lists all API keys of the account.
    pub async fn list_api_keys(&self, cancel: &CancellationToken) -> Result<ApiKeyList> {
        self.get("/api_keys", cancel).await
    }

    /// Fetches a single API key.
    pub async fn get_api_key(
        &self,
        api_key_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ApiKey> {
        self.get(&format!("/api_keys/{api_key_id}"), cancel).await
    }

    /// Creates an API key.
    pub async fn create_api_key(
        &self,
        input: &NewApiKey,
        cancel: &CancellationToken,
    ) -> Result<CreatedApiKey> {
        self.post("/api_keys", input, cancel).await
    }

    /// Renames an API key, keeping its scopes.
    pub async fn update_api_key_name(
        &self,
        api_key_id: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<ApiKeySummary> {
        self.patch(
            &format!("/api_keys/{api_key_id}"),
            &UpdateName { name },
            cancel,
        )
        .await
    }

    /// Replaces an API key's name and scopes.
    pub async fn update_api_key(
        &self,
        api_key_id: &str,
        input: &NewApiKey,
        cancel: &CancellationToken,
    ) -> Result<ApiKey> {
        self.put(&format!("/api_keys/{api_key_id}"), input, cancel)
            .await
    }

    /// Deletes an API key.
    pub async fn delete_api_key(&self, api_key_id: &str, cancel: &CancellationToken) -> Result<()> {
        self.delete(&format!("/api_keys/{api_key_id}"), cancel)
            .await
    }
}
