//! Alert payload handling: field resolution, owner injection and the
//! transformation into a [`NotificationRequest`](crate::notification::NotificationRequest).

pub mod fields;
mod transform;

pub use fields::{extract_machine_id, first_string};
pub use transform::{inject_owner, transform};

/// An inbound alert body: any JSON object
pub type RawAlertPayload = serde_json::Map<String, serde_json::Value>;
