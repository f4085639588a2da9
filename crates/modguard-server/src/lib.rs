//! ModGuard Server
//!
//! HTTP surface over the moderation engine: submission, status read-back,
//! per-user analytics, health and Prometheus metrics.

pub mod cli;
pub mod config;
pub mod routes;
pub mod security;
pub mod state;
pub mod telemetry;

pub use cli::Cli;
pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;
