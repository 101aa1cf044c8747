use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::http::RestClient;
use crate::core::config::SportsfestConfig;
use crate::platform::base::{ObjectStore, StoreError};

/// Object store backed by the Cloud Storage JSON API.
pub struct GcsObjectStore {
    rest: Arc<RestClient>,
    /// `{endpoint}/storage/v1/b/{bucket}/o`
    base_url: String,
}

impl GcsObjectStore {
    pub fn new(rest: Arc<RestClient>, config: &SportsfestConfig) -> Self {
        let base_url = format!(
            "{}/storage/v1/b/{}/o",
            config.storage_url.trim_end_matches('/'),
            config.storage_bucket
        );
        info!("GcsObjectStore created for {}", base_url);
        Self { rest, base_url }
    }

    /// Object names contain slashes, so they ride as a single encoded
    /// path segment.
    fn object_url(&self, path: &str) -> Result<String, StoreError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend("storage URL cannot be a base".to_string()))?
            .push(path);
        Ok(url.to_string())
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(&self.base_url)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("prefix", prefix);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let response = self
                .rest
                .request("storage.list", Method::GET, url.as_str(), None)
                .await?;

            if let Some(items) = response.get("items").and_then(Value::as_array) {
                for item in items {
                    if let Some(name) = item.get("name").and_then(Value::as_str) {
                        names.push(name.to_string());
                    }
                }
            }

            page_token = response
                .get("nextPageToken")
                .and_then(Value::as_str)
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        debug!("Listed {} objects under {}", names.len(), prefix);
        Ok(names)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let url = self.object_url(path)?;
        self.rest
            .request("storage.delete", Method::DELETE, &url, None)
            .await?;
        debug!("Object deleted: {}", path);
        Ok(())
    }
}
