use serde_json::Value;

use super::fields::{self, extract_machine_id, first_string};
use super::RawAlertPayload;
use crate::metrics::OwnerMetrics;
use crate::notification::{NotificationRequest, DEFAULT_TITLE};
use crate::owner::OwnerStore;
use crate::render::ContentRenderer;

/// Build a notification from a payload. Token and topic are taken from the
/// payload as-is; the HTTP boundary overrides them from configuration.
pub fn transform(raw: &RawAlertPayload, renderer: &ContentRenderer) -> NotificationRequest {
    let title = match first_string(raw, fields::TITLE) {
        "" => DEFAULT_TITLE,
        title => title,
    };

    NotificationRequest {
        token: first_string(raw, fields::TOKEN).to_string(),
        title: title.to_string(),
        content: renderer.render(raw),
        topic: first_string(raw, fields::TOPIC).to_string(),
        template: first_string(raw, fields::TEMPLATE).to_string(),
    }
}

/// Look up the payload's machine owner and write it to `raw["owner"]`.
///
/// Returns the owner found, if any. A payload without a machine ID, or an
/// unmapped one, is left untouched.
pub async fn inject_owner(raw: &mut RawAlertPayload, store: &OwnerStore) -> Option<String> {
    let machine_id = extract_machine_id(raw);
    if machine_id.is_empty() {
        return None;
    }

    let owner = store.get(machine_id).await;
    OwnerMetrics::record_lookup(!owner.is_empty());
    if owner.is_empty() {
        return None;
    }

    raw.insert("owner".to_string(), Value::String(owner.clone()));
    Some(owner)
}
