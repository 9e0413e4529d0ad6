mod settings;

pub use settings::{
    ConfigPageConfig, LogConfig, NotificationConfig, OwnersConfig, PushPlusConfig, ServerConfig,
    Settings,
};
