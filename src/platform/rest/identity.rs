use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::http::RestClient;
use crate::core::config::SportsfestConfig;
use crate::platform::base::{IdentityProvider, Principal, StoreError};
use crate::utils::short_uid;

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    /// Custom claims arrive as a JSON string, not an object.
    #[serde(rename = "customAttributes")]
    custom_attributes: Option<String>,
}

/// Identity provider backed by the Identity Toolkit REST API.
pub struct IdentityToolkit {
    rest: Arc<RestClient>,
    base_url: String,
    api_key: Option<String>,
}

impl IdentityToolkit {
    pub fn new(rest: Arc<RestClient>, config: &SportsfestConfig) -> Self {
        let base_url = format!("{}/v1", config.identity_url.trim_end_matches('/'));
        info!("IdentityToolkit created for {}", base_url);
        Self {
            rest,
            base_url,
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> Result<String, StoreError> {
        let mut url = Url::parse(&format!("{}/accounts:{}", self.base_url, action))?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url.to_string())
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkit {
    async fn verify_token(&self, token: &str) -> Result<Principal, StoreError> {
        let url = self.endpoint("lookup")?;
        let body = json!({ "idToken": token });

        let response = match self
            .rest
            .request("identity.lookup", Method::POST, &url, Some(&body))
            .await
        {
            Ok(v) => v,
            Err(StoreError::Backend(detail)) => {
                debug!("Token rejected by identity provider: {}", detail);
                return Err(StoreError::InvalidToken);
            }
            Err(e) => return Err(e),
        };

        let lookup: LookupResponse = serde_json::from_value(response)?;
        let Some(user) = lookup.users.into_iter().next() else {
            return Err(StoreError::InvalidToken);
        };

        let is_admin = user
            .custom_attributes
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .and_then(|claims| claims.get("admin").and_then(Value::as_bool))
            .unwrap_or(false);

        debug!("Token verified for uid={}", short_uid(&user.local_id));
        Ok(Principal {
            uid: user.local_id,
            email: user.email,
            is_admin,
        })
    }

    async fn delete_principal(&self, uid: &str) -> Result<(), StoreError> {
        let url = self.endpoint("delete")?;
        let body = json!({ "localId": uid });
        self.rest
            .request("identity.delete", Method::POST, &url, Some(&body))
            .await?;
        warn!("Auth principal deleted: {}", short_uid(uid));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> IdentityToolkit {
        let mut config = SportsfestConfig::default();
        config.api_key = api_key.map(str::to_string);
        IdentityToolkit::new(Arc::new(RestClient::new(5, 1, None)), &config)
    }

    #[test]
    fn test_endpoint_includes_api_key() {
        let url = provider(Some("k123")).endpoint("lookup").unwrap();
        assert!(url.contains("accounts:lookup"));
        assert!(url.contains("key=k123"));
    }

    #[test]
    fn test_endpoint_without_api_key() {
        let url = provider(None).endpoint("delete").unwrap();
        assert!(url.ends_with("accounts:delete"));
    }

    #[test]
    fn test_admin_claim_parses_from_custom_attributes() {
        let user = LookupUser {
            local_id: "u1".to_string(),
            email: None,
            custom_attributes: Some("{\"admin\":true}".to_string()),
        };
        let is_admin = user
            .custom_attributes
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .and_then(|claims| claims.get("admin").and_then(Value::as_bool))
            .unwrap_or(false);
        assert!(is_admin);
    }
}
