//! Live status dashboard that mirrors a category of a remote key/value store
//! through index-based blocking queries.

pub mod commands;
pub mod config;
pub mod kv_client;
pub mod models;
pub mod sync;
pub mod trigger;
pub mod types;
pub mod view;

pub use config::Config;
pub use kv_client::{KvBackend, KvClient};
pub use sync::Dashboard;
pub use types::{DashboardError, FailureKind};
