mod types;

pub use types::{NotificationRequest, PushPlusResponse, DEFAULT_TITLE};
