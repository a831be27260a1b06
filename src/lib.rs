//! HTTP counter API backed by DynamoDB.
//!
//! Exposes a health endpoint and a single global counter that can be read,
//! atomically incremented and reset:
//!
//! ```text
//! GET    /          service metadata
//! GET    /counter   {count, message, timestamp}; "never" before first write
//! POST   /counter   {"increment": n} (default 1), atomic server-side add
//! DELETE /counter   overwrite with zero
//! ```
//!
//! The API keeps no counter state in process. Concurrent increments are
//! serialized by the store's atomic add (`UpdateItem ... ADD`).
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`counter`]: Counter model and operations
//! - [`store`]: DynamoDB and in-memory backends
//! - [`api`]: HTTP routes, handlers and OpenAPI document
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod counter;
pub mod error;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
