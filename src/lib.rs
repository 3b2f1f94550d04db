//! Host-based HTTP redirect service library.

pub mod admin;
pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod stats;
pub mod storage;
pub mod watch;

pub use config::RedirectorConfig;
pub use engine::{RedirectEngine, Resolution, Rule};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use stats::HitCounter;
pub use storage::{JsonFileStore, RuleStore};
pub use watch::FileWatcher;
