//! RelaySender - hosted email relay over HTTP
//!
//! Speaks the JSON API of browser email-relay services: one POST per
//! message carrying service/template ids, the public key and the template
//! parameters. Only HTTP 200 counts as delivered.

use contracts::{
    ContractError, MessageSender, ResolvedMessage, DEFAULT_FROM_EMAIL, DEFAULT_FROM_NAME,
};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default relay endpoint
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Configuration for RelaySender
#[derive(Debug, Clone)]
pub struct RelaySenderConfig {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    /// HTTP client timeout
    pub timeout: Duration,
}

impl RelaySenderConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let required = |key: &str| {
            params
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| format!("missing '{}' parameter", key))
        };

        let timeout_ms = match params.get("timeout_ms") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| format!("invalid timeout_ms '{}': {}", raw, e))?,
            None => 30_000,
        };

        Ok(Self {
            endpoint: params
                .get("endpoint")
                .cloned()
                .unwrap_or_else(|| DEFAULT_RELAY_ENDPOINT.to_string()),
            service_id: required("service_id")?,
            template_id: required("template_id")?,
            public_key: required("public_key")?,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    subject: &'a str,
    message: &'a str,
    from_name: &'a str,
    from_email: &'a str,
}

/// Sender posting to an HTTP email relay
pub struct RelaySender {
    name: String,
    config: RelaySenderConfig,
    client: reqwest::Client,
}

impl RelaySender {
    /// Create a new RelaySender
    pub fn new(name: impl Into<String>, config: RelaySenderConfig) -> Result<Self, ContractError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ContractError::sender_setup(&name, format!("failed to build HTTP client: {e}"))
            })?;

        debug!(sender = %name, endpoint = %config.endpoint, "RelaySender ready");

        Ok(Self {
            name,
            config,
            client,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = RelaySenderConfig::from_params(params)
            .map_err(|e| ContractError::sender_setup(&name, e))?;
        Self::new(name, config)
    }

    fn build_request<'a>(&'a self, message: &'a ResolvedMessage) -> RelayRequest<'a> {
        let (from_name, from_email) = match &message.from {
            Some(from) => (from.name.as_str(), from.email.as_str()),
            None => (DEFAULT_FROM_NAME, DEFAULT_FROM_EMAIL),
        };

        RelayRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: TemplateParams {
                to_email: &message.recipient_address,
                to_name: &message.display_name,
                subject: message.subject.as_deref().unwrap_or(""),
                message: &message.body,
                from_name,
                from_email,
            },
        }
    }
}

impl MessageSender for RelaySender {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "relay_sender_send",
        skip(self, message),
        fields(sender = %self.name, to = %message.recipient_address)
    )]
    async fn send(&self, message: &ResolvedMessage) -> Result<(), ContractError> {
        let request = self.build_request(message);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(sender = %self.name, error = %e, "Relay request failed");
                ContractError::send_failed(&self.name, &message.recipient_address, e.to_string())
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!(sender = %self.name, status, "Relay rejected message");
            return Err(ContractError::SendRejected {
                sender: self.name.clone(),
                recipient: message.recipient_address.clone(),
                status,
            });
        }

        debug!(sender = %self.name, status, "Relay accepted message");
        Ok(())
    }
}
