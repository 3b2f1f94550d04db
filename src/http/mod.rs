//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → redirect handler (host lookup against the engine)
//!     → 301 / 404 / 500 to client
//! ```

pub mod server;

pub use server::HttpServer;
