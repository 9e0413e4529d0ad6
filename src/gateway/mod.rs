//! Outbound notification delivery.

mod pushplus;

use async_trait::async_trait;
use thiserror::Error;

use crate::notification::NotificationRequest;

pub use pushplus::PushPlusGateway;

/// Delivery error type
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("provider rejected notification, code={code} msg={msg}")]
    Rejected { code: i64, msg: String },
}

/// Delivers a fully populated notification to the push provider
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Send one notification; returns the provider's task id
    async fn send(&self, request: &NotificationRequest) -> Result<String, GatewayError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
