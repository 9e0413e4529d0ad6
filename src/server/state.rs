use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::gateway::{GatewayError, NotificationGateway, PushPlusGateway};
use crate::owner::OwnerStore;
use crate::render::ContentRenderer;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub owners: Arc<OwnerStore>,
    pub renderer: Arc<ContentRenderer>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub started_at: Instant,
}

impl AppState {
    /// State wired to the PushPlus gateway described by `settings`
    pub fn new(settings: Settings, owners: Arc<OwnerStore>) -> Result<Self, GatewayError> {
        let gateway = Arc::new(PushPlusGateway::new(&settings.pushplus)?);
        Ok(Self::with_gateway(settings, owners, gateway))
    }

    pub fn with_gateway(
        settings: Settings,
        owners: Arc<OwnerStore>,
        gateway: Arc<dyn NotificationGateway>,
    ) -> Self {
        let renderer = Arc::new(ContentRenderer::with_template(
            &settings.notification.content_template,
        ));

        Self {
            settings: Arc::new(settings),
            owners,
            renderer,
            gateway,
            started_at: Instant::now(),
        }
    }
}
