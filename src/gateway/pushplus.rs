use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::{GatewayError, NotificationGateway};
use crate::config::PushPlusConfig;
use crate::metrics::PushMetrics;
use crate::notification::{NotificationRequest, PushPlusResponse};

/// PushPlus `/send` client
#[derive(Debug, Clone)]
pub struct PushPlusGateway {
    endpoint: String,
    client: Client,
}

impl PushPlusGateway {
    pub fn new(config: &PushPlusConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &NotificationRequest) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body: PushPlusResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        if !body.is_success() {
            return Err(GatewayError::Rejected {
                code: body.code,
                msg: body.msg,
            });
        }

        Ok(body.task_id())
    }
}

#[async_trait]
impl NotificationGateway for PushPlusGateway {
    #[tracing::instrument(
        name = "pushplus.send",
        skip(self, request),
        fields(title = %request.title, topic = %request.topic)
    )]
    async fn send(&self, request: &NotificationRequest) -> Result<String, GatewayError> {
        let started = Instant::now();
        let result = self.post(request).await;

        match &result {
            Ok(task_id) => {
                PushMetrics::record_sent(started.elapsed());
                tracing::info!(task_id = %task_id, "Notification accepted by PushPlus");
            }
            Err(e) => {
                PushMetrics::record_failed(started.elapsed());
                tracing::warn!(error = %e, "PushPlus delivery failed");
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        "pushplus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_uses_configured_endpoint() {
        let config = PushPlusConfig {
            endpoint: "http://127.0.0.1:9/send".to_string(),
            ..Default::default()
        };
        let gateway = PushPlusGateway::new(&config).unwrap();
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:9/send");
        assert_eq!(gateway.name(), "pushplus");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let config = PushPlusConfig {
            // Port 9 (discard) is closed on test hosts
            endpoint: "http://127.0.0.1:9/send".to_string(),
            timeout_seconds: 2,
            ..Default::default()
        };
        let gateway = PushPlusGateway::new(&config).unwrap();

        let request = NotificationRequest {
            token: "t".into(),
            content: "c".into(),
            ..Default::default()
        };
        assert!(matches!(
            gateway.send(&request).await,
            Err(GatewayError::Request(_))
        ));
    }
}
