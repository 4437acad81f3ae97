//! MikroTik RouterOS provisioning client.
//!
//! Talks to the RouterOS REST API (`/rest/ppp/secret`) to manage PPPoE
//! credentials. Network-access provisioning only; no billing coupling.

use crate::config::MikrotikConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::time::Duration;
use tracing::instrument;

/// Client for the RouterOS REST API.
#[derive(Clone)]
pub struct MikrotikClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

/// A PPPoE secret as returned by the router. RouterOS reports booleans as
/// the strings "true"/"false".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PppSecret {
    #[serde(rename = ".id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
    #[serde(rename = "last-logged-out", skip_serializing_if = "Option::is_none")]
    pub last_logged_out: Option<String>,
}

/// Body for creating a PPPoE secret.
#[derive(Debug, Serialize)]
pub struct NewPppSecret {
    pub name: String,
    pub password: String,
    pub profile: String,
    pub service: String,
}

/// Partial update of a PPPoE secret; absent fields are left untouched.
#[derive(Debug, Default, Serialize)]
pub struct PppSecretPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
}

impl MikrotikClient {
    pub fn new(config: &MikrotikConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: format!("http://{}:{}/rest", config.host, config.port),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// List all PPPoE secrets on the router.
    #[instrument(skip(self))]
    pub async fn list_secrets(&self) -> Result<Vec<PppSecret>, AppError> {
        let response = self
            .client
            .get(format!("{}/ppp/secret", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Failed to reach router: {}", e)))?;

        Self::check_status(&response.status())?;

        response
            .json::<Vec<PppSecret>>()
            .await
            .map_err(|e| AppError::BadGateway(format!("Invalid router response: {}", e)))
    }

    /// Find a PPPoE secret by name.
    #[instrument(skip(self))]
    pub async fn find_secret(&self, name: &str) -> Result<Option<PppSecret>, AppError> {
        let response = self
            .client
            .get(format!("{}/ppp/secret", self.base_url))
            .query(&[("name", name)])
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Failed to reach router: {}", e)))?;

        Self::check_status(&response.status())?;

        let mut matches = response
            .json::<Vec<PppSecret>>()
            .await
            .map_err(|e| AppError::BadGateway(format!("Invalid router response: {}", e)))?;

        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    /// Create a PPPoE secret.
    #[instrument(skip(self, secret), fields(name = %secret.name))]
    pub async fn create_secret(&self, secret: &NewPppSecret) -> Result<(), AppError> {
        let response = self
            .client
            .put(format!("{}/ppp/secret", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .json(secret)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Failed to reach router: {}", e)))?;

        Self::check_status(&response.status())
    }

    /// Patch a PPPoE secret by its router-assigned id.
    #[instrument(skip(self, patch))]
    pub async fn update_secret(&self, id: &str, patch: &PppSecretPatch) -> Result<(), AppError> {
        let response = self
            .client
            .patch(format!("{}/ppp/secret/{}", self.base_url, id))
            .basic_auth(&self.username, Some(&self.password))
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Failed to reach router: {}", e)))?;

        Self::check_status(&response.status())
    }

    /// Remove a PPPoE secret by its router-assigned id.
    #[instrument(skip(self))]
    pub async fn delete_secret(&self, id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(format!("{}/ppp/secret/{}", self.base_url, id))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Failed to reach router: {}", e)))?;

        Self::check_status(&response.status())
    }

    fn check_status(status: &StatusCode) -> Result<(), AppError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(AppError::BadGateway(format!(
                "Router rejected the request with status {}",
                status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppp_secret_parses_router_field_names() {
        let json = r#"{
            ".id": "*1",
            "name": "client-pppoe",
            "profile": "default",
            "service": "pppoe",
            "disabled": "false",
            "last-logged-out": "jan/01/2026 00:00:00"
        }"#;

        let secret: PppSecret = serde_json::from_str(json).unwrap();
        assert_eq!(secret.id, "*1");
        assert_eq!(secret.name, "client-pppoe");
        assert_eq!(secret.disabled.as_deref(), Some("false"));
        assert!(secret.last_logged_out.is_some());
    }

    #[test]
    fn patch_skips_absent_fields() {
        let patch = PppSecretPatch {
            password: None,
            profile: Some("premium".to_string()),
            disabled: None,
        };

        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({ "profile": "premium" }));
    }
}
