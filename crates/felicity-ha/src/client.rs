// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Felicity Card.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use crate::errors::{HaError, HaResult};
use crate::types::HaEntityState;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

const SUPERVISOR_URL: &str = "http://supervisor/core";
const DEFAULT_BASE_URL: &str = "http://localhost:8123";

/// Home Assistant REST API client
#[derive(Debug, Clone)]
pub struct HomeAssistantClient {
    base_url: String,
    token: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HomeAssistantClient {
    /// Create a new HA client with custom configuration
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> HaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HaError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Create HA client using Supervisor API environment variables
    pub fn from_supervisor() -> HaResult<Self> {
        let token = std::env::var("SUPERVISOR_TOKEN").map_err(|_| {
            HaError::ConfigError(
                "SUPERVISOR_TOKEN environment variable not set. Are you running as an HA addon?"
                    .to_owned(),
            )
        })?;

        info!("Initializing HA client using Supervisor API");
        Self::new(SUPERVISOR_URL, token)
    }

    /// Create HA client from configuration values
    /// Falls back to environment variables if config values are not set
    pub fn from_config(ha_base_url: Option<String>, ha_token: Option<String>) -> HaResult<Self> {
        let base_url = ha_base_url
            .or_else(|| std::env::var("HA_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let token = ha_token
            .or_else(|| std::env::var("HA_TOKEN").ok())
            .ok_or_else(|| {
                HaError::ConfigError(
                    "HA token not found in config or HA_TOKEN environment variable".to_owned(),
                )
            })?;

        info!("Initializing HA client from configuration: {}", base_url);
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the state of a specific entity
    pub async fn get_state(&self, entity_id: &str) -> HaResult<HaEntityState> {
        let url = format!("{}/api/states/{}", self.base_url, entity_id);
        debug!("🔍 [HA QUERY] Getting state for entity: {}", entity_id);

        let response = self
            .retry_request(|| async { self.client.get(&url).bearer_auth(&self.token).send().await })
            .await?;

        match response.status() {
            StatusCode::OK => {
                let state = response.json::<HaEntityState>().await?;
                debug!("✅ [HA RESULT] Entity: {} = '{}'", entity_id, state.state);
                trace!("   Attributes: {:?}", state.attributes);
                Ok(state)
            }
            StatusCode::NOT_FOUND => {
                debug!("[HA QUERY] Entity not found: {}", entity_id);
                Err(HaError::EntityNotFound(entity_id.to_owned()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("❌ [HA ERROR] Authentication failed for entity: {}", entity_id);
                Err(HaError::AuthenticationFailed)
            }
            status => Err(Self::api_error(status, response).await),
        }
    }

    /// Get all states in one request
    pub async fn get_all_states(&self) -> HaResult<Vec<HaEntityState>> {
        let url = format!("{}/api/states", self.base_url);
        debug!("🔍 [HA QUERY] Fetching all entity states");

        let response = self
            .retry_request(|| async { self.client.get(&url).bearer_auth(&self.token).send().await })
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Vec<HaEntityState>>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(HaError::AuthenticationFailed),
            status => Err(Self::api_error(status, response).await),
        }
    }

    /// Call a Home Assistant service
    ///
    /// # Arguments
    /// * `domain` - Service domain, e.g. `number`
    /// * `service` - Service name, e.g. `set_value`
    /// * `data` - JSON data to send with the service call
    pub async fn call_service(&self, domain: &str, service: &str, data: &Value) -> HaResult<()> {
        let name = format!("{domain}.{service}");
        if domain.is_empty() || service.is_empty() || domain.contains('/') || service.contains('/')
        {
            error!("❌ [HA SERVICE] Invalid service: {}", name);
            return Err(HaError::ServiceCallFailed {
                service: name,
                reason: "Invalid service, expected 'domain.service'".to_owned(),
            });
        }

        let url = format!("{}/api/services/{}/{}", self.base_url, domain, service);
        info!("📞 [HA SERVICE] Calling: {}", name);
        debug!("   Data: {}", data);

        let response = self
            .retry_request(|| async {
                self.client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(data)
                    .send()
                    .await
            })
            .await?;

        match response.status() {
            StatusCode::OK => {
                info!("✅ [HA SERVICE] Success: {}", name);
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("❌ [HA SERVICE] Authentication failed for: {}", name);
                Err(HaError::AuthenticationFailed)
            }
            status => {
                let reason = response.text().await.unwrap_or_default();
                error!("❌ [HA SERVICE] Failed: {} (status: {})", name, status);
                error!("   Error: {}", reason);
                Err(HaError::ServiceCallFailed {
                    service: name,
                    reason,
                })
            }
        }
    }

    /// Render a Jinja template server-side
    pub async fn render_template(&self, template: &str) -> HaResult<String> {
        let url = format!("{}/api/template", self.base_url);
        let body = json!({ "template": template });
        trace!("[HA TEMPLATE] {}", template);

        let response = self
            .retry_request(|| async {
                self.client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&body)
                    .send()
                    .await
            })
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.text().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(HaError::AuthenticationFailed),
            status => Err(Self::api_error(status, response).await),
        }
    }

    /// Entity ids belonging to a device registry entry
    pub async fn device_entities(&self, device_id: &str) -> HaResult<Vec<String>> {
        if device_id.is_empty()
            || !device_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(HaError::ConfigError(format!(
                "Invalid device id: '{device_id}'"
            )));
        }

        let rendered = self
            .render_template(&format!("{{{{ device_entities('{device_id}') | tojson }}}}"))
            .await?;
        let entities: Vec<String> = serde_json::from_str(rendered.trim()).map_err(|e| {
            HaError::InvalidResponse(format!("device_entities for {device_id}: {e}"))
        })?;

        debug!(
            "🔗 [HA DEVICE] {} owns {} entities",
            device_id,
            entities.len()
        );
        Ok(entities)
    }

    /// Health check - ping HA API
    pub async fn ping(&self) -> HaResult<bool> {
        let url = format!("{}/api/", self.base_url);
        debug!("Performing health check");

        match self.client.get(&url).bearer_auth(&self.token).send().await {
            Ok(response) => {
                let is_ok = response.status().is_success();
                if !is_ok {
                    warn!("Health check failed: status {}", response.status());
                }
                Ok(is_ok)
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn api_error(status: StatusCode, response: reqwest::Response) -> HaError {
        let message = response.text().await.unwrap_or_default();
        error!("❌ [HA ERROR] Status {}: {}", status, message);
        HaError::ApiError {
            status: status.as_u16(),
            message,
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut>(&self, mut request_fn: F) -> HaResult<reqwest::Response>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(HaError::HttpError(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    /// Set custom retry configuration
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn state_body(entity_id: &str, state: &str) -> String {
        json!({
            "entity_id": entity_id,
            "state": state,
            "attributes": {"unit_of_measurement": "W"},
            "last_changed": "2025-10-02T10:00:00Z",
            "last_updated": "2025-10-02T10:00:00Z"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_get_state_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/states/sensor.felicity_pv_input_power")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(state_body("sensor.felicity_pv_input_power", "2140"))
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let state = client
            .get_state("sensor.felicity_pv_input_power")
            .await
            .unwrap();

        assert_eq!(state.state, "2140");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_state_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/states/sensor.nonexistent")
            .with_status(404)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let result = client.get_state("sensor.nonexistent").await;

        assert!(matches!(result, Err(HaError::EntityNotFound(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_service_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/services/number/set_value")
            .match_header("authorization", "Bearer test_token")
            .match_body(Matcher::Json(json!({
                "entity_id": "number.felicity_econ_rule_1_soc",
                "value": 80.0
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let result = client
            .call_service(
                "number",
                "set_value",
                &json!({"entity_id": "number.felicity_econ_rule_1_soc", "value": 80.0}),
            )
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_service_rejected() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/services/select/select_option")
            .with_status(400)
            .with_body("Option Foo is not valid")
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let result = client
            .call_service("select", "select_option", &json!({"option": "Foo"}))
            .await;

        match result {
            Err(HaError::ServiceCallFailed { service, reason }) => {
                assert_eq!(service, "select.select_option");
                assert!(reason.contains("not valid"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_service_invalid_name() {
        let client = HomeAssistantClient::new("http://localhost", "token").unwrap();
        let result = client.call_service("", "set_value", &json!({})).await;

        assert!(matches!(result, Err(HaError::ServiceCallFailed { .. })));
    }

    #[tokio::test]
    async fn test_device_entities_via_template() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/template")
            .match_body(Matcher::Json(json!({
                "template": "{{ device_entities('abc123') | tojson }}"
            })))
            .with_status(200)
            .with_body(r#"["sensor.felicity_battery_power", "number.felicity_econ_rule_1_soc"]"#)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let entities = client.device_entities("abc123").await.unwrap();

        assert_eq!(entities.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_device_id_is_validated() {
        let client = HomeAssistantClient::new("http://localhost", "token").unwrap();
        let result = client.device_entities("x') }}{{ states").await;
        assert!(matches!(result, Err(HaError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/states")
            .with_status(401)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "bad").unwrap();
        assert!(matches!(
            client.get_all_states().await,
            Err(HaError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn test_ping_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        assert!(client.ping().await.unwrap());
        mock.assert_async().await;
    }
}
