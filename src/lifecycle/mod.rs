//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Load rules → Start watcher → Bind listeners
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast to tasks → listeners drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then rules, then listeners
//! - Shutdown is cooperative: every long-running task subscribes
//! - Repeated shutdown triggers are harmless

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
