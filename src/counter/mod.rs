//! The counter resource.

pub mod service;
pub mod types;

pub use service::CounterService;
pub use types::{Counter, CounterResponse, IncrementRequest, COUNTER_ID, MAX_COUNT, NEVER};
