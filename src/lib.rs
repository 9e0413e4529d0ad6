// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Domain layer
pub mod notification;
pub mod owner;
pub mod payload;
pub mod render;

// Delivery
pub mod gateway;

// Application layer
pub mod api;
pub mod server;
