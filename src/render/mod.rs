//! Notification body rendering.
//!
//! A configured content template is tried first; any parse or execution
//! failure, or an empty result, falls back to the default layout:
//!
//! ```text
//! ### Disk Full
//! - 级别: critical
//! - 主机: node-1
//!
//! disk at 98%
//! ```
//!
//! When the payload carries no message, the closing block is a fenced JSON
//! dump of the payload with `token` removed.

mod template;

use serde_json::{Map, Value};

use crate::metrics::TemplateMetrics;
use crate::notification::DEFAULT_TITLE;
use crate::payload::fields::{self, first_string};

pub use template::{ContentTemplate, TemplateError, TemplateResult};

/// Keys stripped from the JSON fallback dump
const REDACTED_KEYS: &[&str] = &["token"];

/// Label and alias list of each key/value line, in output order
const KV_LINES: &[(&str, &[&str])] = &[
    ("级别", fields::LEVEL),
    ("服务", fields::SERVICE),
    ("主机", fields::HOST),
    ("机器ID", fields::MACHINE_ID),
    ("IP", fields::IP),
    ("状态码", fields::CODE),
    ("时间", fields::TIMESTAMP),
    ("负责人", fields::OWNER),
];

/// Renders notification bodies from raw alert payloads
#[derive(Debug, Clone, Default)]
pub struct ContentRenderer {
    template: Option<ContentTemplate>,
}

impl ContentRenderer {
    /// Renderer that always uses the default layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer for a process-wide template source. An empty source disables
    /// the template path; a source that fails to parse is logged and
    /// likewise leaves only the default layout.
    pub fn with_template(source: &str) -> Self {
        if source.is_empty() {
            return Self::new();
        }

        match ContentTemplate::parse(source) {
            Ok(template) => Self {
                template: Some(template),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Content template rejected, using default layout");
                Self::new()
            }
        }
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Render the body for `raw`. Never fails.
    pub fn render(&self, raw: &Map<String, Value>) -> String {
        if let Some(template) = &self.template {
            match template.execute(raw) {
                Ok(rendered) if !rendered.is_empty() => return rendered,
                Ok(_) => {
                    tracing::debug!("Content template produced no output, using default layout");
                    TemplateMetrics::record_fallback();
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Content template failed, using default layout");
                    TemplateMetrics::record_fallback();
                }
            }
        }

        build_default_content(raw)
    }
}

/// Heading, key/value block, then the message or a JSON dump.
pub fn build_default_content(raw: &Map<String, Value>) -> String {
    let mut buf = String::new();

    let title = first_string(raw, fields::TITLE);
    buf.push_str("### ");
    buf.push_str(if title.is_empty() { DEFAULT_TITLE } else { title });
    buf.push('\n');

    for (label, aliases) in KV_LINES {
        let value = first_string(raw, aliases);
        if !value.is_empty() {
            buf.push_str("- ");
            buf.push_str(label);
            buf.push_str(": ");
            buf.push_str(value);
            buf.push('\n');
        }
    }

    buf.push('\n');
    let message = first_string(raw, fields::MESSAGE);
    if message.is_empty() {
        buf.push_str(&json_dump(raw, REDACTED_KEYS));
    } else {
        buf.push_str(message);
    }
    buf.push('\n');

    buf
}

/// Fenced, pretty-printed JSON of `raw` without `redact` keys.
pub fn json_dump(raw: &Map<String, Value>, redact: &[&str]) -> String {
    let filtered: Map<String, Value> = raw
        .iter()
        .filter(|(key, _)| !redact.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    match serde_json::to_string_pretty(&filtered) {
        Ok(json) => format!("```json\n{json}\n```"),
        Err(_) => "收到无法序列化的 JSON 数据".to_string(),
    }
}
