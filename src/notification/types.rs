use serde::{Deserialize, Serialize};

/// Title used when the payload carries none
pub const DEFAULT_TITLE: &str = "Alert Notification";

/// Outbound notification, serialized as the PushPlus `/send` body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Account token (filled in from configuration at the boundary)
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Rendered body
    pub content: String,
    /// Group topic for one-to-many delivery
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,
    /// PushPlus rendering template (`markdown`, `html`, `txt`, ...)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
}

/// PushPlus API response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct PushPlusResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    /// Task id on success; usually a string but not guaranteed
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl PushPlusResponse {
    pub fn is_success(&self) -> bool {
        self.code == 200
    }

    /// Task id as text, regardless of how the provider encoded it
    pub fn task_id(&self) -> String {
        match &self.data {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}
