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

use async_trait::async_trait;
use felicity_core::{CommandDispatcher, DispatchError};
use serde_json::Value;
use tracing::debug;

use crate::client::HomeAssistantClient;

/// Sends composed writes as Home Assistant service calls
#[derive(Debug, Clone)]
pub struct HaCommandDispatcher {
    client: HomeAssistantClient,
}

impl HaCommandDispatcher {
    pub fn new(client: HomeAssistantClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandDispatcher for HaCommandDispatcher {
    async fn invoke(
        &self,
        domain: &str,
        action: &str,
        payload: Value,
    ) -> Result<(), DispatchError> {
        debug!("[HA DISPATCH] {}.{} {}", domain, action, payload);
        self.client
            .call_service(domain, action, &payload)
            .await
            .map_err(|e| e.into_dispatch_error(&format!("{domain}.{action}")))
    }

    fn name(&self) -> &str {
        "HomeAssistant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_invoke_posts_service_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/services/select/select_option")
            .match_body(Matcher::Json(json!({
                "entity_id": "select.felicity_grid_mode",
                "option": "to_grid"
            })))
            .with_status(200)
            .create_async()
            .await;

        let dispatcher =
            HaCommandDispatcher::new(HomeAssistantClient::new(server.url(), "token").unwrap());
        let result = dispatcher
            .invoke(
                "select",
                "select_option",
                json!({"entity_id": "select.felicity_grid_mode", "option": "to_grid"}),
            )
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejection_maps_to_dispatch_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/services/number/set_value")
            .with_status(400)
            .with_body("value out of range")
            .create_async()
            .await;

        let dispatcher =
            HaCommandDispatcher::new(HomeAssistantClient::new(server.url(), "token").unwrap());
        let result = dispatcher
            .invoke("number", "set_value", json!({"value": 500.0}))
            .await;

        match result {
            Err(DispatchError::Rejected { service, reason }) => {
                assert_eq!(service, "number.set_value");
                assert!(reason.contains("out of range"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
