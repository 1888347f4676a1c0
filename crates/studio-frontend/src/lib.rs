//! Design Studio Frontend
//!
//! egui application around the studio viewport: dockable panels, a free-text
//! command panel and clients for the remote shape services.

pub mod actions;
pub mod app;
pub mod config;
pub mod panels;
pub mod services;
pub mod state;

// Re-exports for convenience
pub use app::StudioApp;
pub use config::{ConfigManager, ServiceConfig, SharedConfig, StudioConfig};
pub use services::Services;
pub use state::{AppAction, AppState, SharedAppState};
