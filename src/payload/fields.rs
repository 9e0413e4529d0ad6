//! Alias lists and the first-matching-string resolver.
//!
//! Every logical field of an alert is looked up through one ordered alias
//! list. The first alias present in the payload whose value is a JSON string
//! wins; non-string values are skipped as if absent.

use serde_json::{Map, Value};

pub const TOKEN: &[&str] = &["token"];
pub const TITLE: &[&str] = &["title", "subject"];
pub const TOPIC: &[&str] = &["topic", "group"];
pub const TEMPLATE: &[&str] = &["template", "tpl"];

pub const LEVEL: &[&str] = &["level", "severity", "status"];
pub const SERVICE: &[&str] = &["service", "app", "project"];
pub const HOST: &[&str] = &["host", "hostname"];
pub const MACHINE_ID: &[&str] = &["machine_id", "id", "instance", "server_id", "host", "hostname"];
pub const IP: &[&str] = &["ip", "ipaddr", "remote_ip"];
pub const CODE: &[&str] = &["code", "status_code"];
pub const TIMESTAMP: &[&str] = &["timestamp", "ts", "time", "datetime"];
pub const MESSAGE: &[&str] = &["content", "message", "msg", "text", "error"];
pub const OWNER: &[&str] = &["owner"];

/// Value of the first alias holding a string, or `""`.
pub fn first_string<'a>(raw: &'a Map<String, Value>, aliases: &[&str]) -> &'a str {
    aliases
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .unwrap_or("")
}

/// Machine identifier used for the owner lookup.
pub fn extract_machine_id(raw: &Map<String, Value>) -> &str {
    first_string(raw, MACHINE_ID)
}
