//! Sends one fixed test notification through PushPlus using the relay's
//! configuration. Exits non-zero when delivery fails.

use anyhow::{bail, Result};
use chrono::Local;

use pushplus_relay::config::Settings;
use pushplus_relay::gateway::{NotificationGateway, PushPlusGateway};
use pushplus_relay::notification::NotificationRequest;
use pushplus_relay::telemetry::init_telemetry;

const TEST_TITLE: &str = "Test Notification";

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_telemetry(&settings.log)?;

    if settings.pushplus.token.is_empty() {
        bail!("pushplus.token is not configured");
    }

    let request = NotificationRequest {
        token: settings.pushplus.token.clone(),
        title: TEST_TITLE.to_string(),
        content: format!(
            "### {TEST_TITLE}\n- 时间: {}\n\nPushPlus relay connectivity check.\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        topic: settings.pushplus.topic.clone(),
        template: settings.notification.default_template.clone(),
    };

    let gateway = PushPlusGateway::new(&settings.pushplus)?;
    let task_id = gateway.send(&request).await?;

    tracing::info!(task_id = %task_id, endpoint = %gateway.endpoint(), "Test notification sent");
    Ok(())
}
