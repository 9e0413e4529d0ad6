//! Alert intake endpoint.

use axum::{body::Bytes, extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::metrics::WebhookMetrics;
use crate::notification::NotificationRequest;
use crate::payload::{extract_machine_id, inject_owner, transform, RawAlertPayload};
use crate::server::AppState;

use super::decode_json;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    pub msg: String,
    /// RFC 3339 send time
    pub time: String,
}

/// POST /webhook - accept any JSON object and forward it to PushPlus
#[tracing::instrument(
    name = "http.webhook",
    skip(state, body),
    fields(request_id = %Uuid::new_v4(), machine_id = tracing::field::Empty)
)]
pub async fn webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<WebhookResponse>> {
    WebhookMetrics::record_received();

    let mut raw = parse_payload(&body).inspect_err(|_| WebhookMetrics::record_rejected("invalid_json"))?;

    let machine_id = extract_machine_id(&raw);
    if !machine_id.is_empty() {
        tracing::Span::current().record("machine_id", machine_id);
    }

    if let Some(owner) = inject_owner(&mut raw, &state.owners).await {
        tracing::debug!(owner = %owner, "Owner attached to alert");
    }

    let mut request = transform(&raw, &state.renderer);
    apply_boundary_overrides(&mut request, &state.settings)?;

    state.gateway.send(&request).await?;

    Ok(Json(WebhookResponse {
        ok: true,
        msg: "sent".to_string(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

fn parse_payload(body: &[u8]) -> Result<RawAlertPayload> {
    match decode_json::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Validation(
            "invalid json: expected an object".to_string(),
        )),
    }
}

/// Process-wide settings applied after the transform: the configured token
/// always replaces the payload's, a configured topic replaces the payload's,
/// an empty template gets the default, and the body gets the alert prefix.
pub fn apply_boundary_overrides(request: &mut NotificationRequest, settings: &Settings) -> Result<()> {
    request.token = settings.pushplus.token.clone();
    if !settings.pushplus.topic.is_empty() {
        request.topic = settings.pushplus.topic.clone();
    }

    if request.token.is_empty() {
        WebhookMetrics::record_rejected("missing_token");
        return Err(AppError::Validation(
            "missing token (pushplus.token is not configured)".to_string(),
        ));
    }

    if request.content.is_empty() {
        WebhookMetrics::record_rejected("missing_content");
        return Err(AppError::Validation("missing content".to_string()));
    }

    if request.template.is_empty() {
        request.template = settings.notification.default_template.clone();
    }

    request.content = format!("{}{}", settings.notification.alert_prefix, request.content);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(token: &str, topic: &str) -> Settings {
        let mut settings = Settings::default();
        settings.pushplus.token = token.to_string();
        settings.pushplus.topic = topic.to_string();
        settings
    }

    fn request() -> NotificationRequest {
        NotificationRequest {
            token: "payload-token".into(),
            title: "t".into(),
            content: "body".into(),
            topic: "payload-topic".into(),
            template: String::new(),
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut req = request();
        apply_boundary_overrides(&mut req, &settings("cfg-token", "20251105")).unwrap();

        assert_eq!(req.token, "cfg-token");
        assert_eq!(req.topic, "20251105");
        assert_eq!(req.template, "markdown");
        assert_eq!(req.content, "【警告】body");
    }

    #[test]
    fn test_empty_topic_keeps_payload_topic() {
        let mut req = request();
        req.template = "html".into();
        apply_boundary_overrides(&mut req, &settings("cfg-token", "")).unwrap();

        assert_eq!(req.topic, "payload-topic");
        assert_eq!(req.template, "html");
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut req = request();
        let err = apply_boundary_overrides(&mut req, &settings("", "")).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("missing token")));
    }

    #[test]
    fn test_missing_content_rejected() {
        let mut req = request();
        req.content.clear();
        let err = apply_boundary_overrides(&mut req, &settings("cfg-token", "")).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "missing content"));
    }

    #[test]
    fn test_parse_payload_requires_object() {
        assert!(parse_payload(br#"{"a":1}"#).is_ok());
        assert!(parse_payload(b"[1,2]").is_err());
        assert!(parse_payload(b"not json").is_err());
    }
}
