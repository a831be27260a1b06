//! Counter data model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Partition key of the one counter row per deployment.
pub const COUNTER_ID: &str = "global_counter";

/// Timestamp reported for a counter that has never been written.
pub const NEVER: &str = "never";

/// Largest magnitude a DynamoDB number holds exactly (38 significant digits).
pub const MAX_COUNT: i128 = 10i128.pow(38) - 1;

/// Persisted counter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    /// Partition key.
    pub id: String,
    /// Current value. Wider than an increment so repeated large adds stay readable.
    pub count: i128,
    /// RFC 3339 timestamp of the last mutation, or `"never"`.
    pub updated_at: String,
}

impl Counter {
    /// Create a counter row.
    pub fn new(id: impl Into<String>, count: i128, updated_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            count,
            updated_at: updated_at.into(),
        }
    }

    /// Zero state synthesized for an absent row.
    pub fn never(id: impl Into<String>) -> Self {
        Self::new(id, 0, NEVER)
    }

    /// Whether the row has ever been written.
    pub fn is_initialized(&self) -> bool {
        self.updated_at != NEVER
    }
}

/// Body of `POST /counter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub struct IncrementRequest {
    /// Amount to add; may be zero or negative.
    #[serde(default = "default_increment")]
    #[schema(default = 1)]
    pub increment: i64,
}

fn default_increment() -> i64 {
    1
}

impl Default for IncrementRequest {
    fn default() -> Self {
        Self {
            increment: default_increment(),
        }
    }
}

/// Response body of every `/counter` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CounterResponse {
    /// Counter value.
    #[schema(value_type = i64)]
    pub count: i128,
    /// Human-readable summary of the operation.
    pub message: String,
    /// Last update time, or `"never"`.
    pub timestamp: String,
}

impl CounterResponse {
    /// Build a response from a counter row.
    pub fn from_counter(counter: Counter, message: impl Into<String>) -> Self {
        Self {
            count: counter.count,
            message: message.into(),
            timestamp: counter.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_counter_is_zero() {
        let counter = Counter::never(COUNTER_ID);
        assert_eq!(counter.count, 0);
        assert_eq!(counter.updated_at, "never");
        assert!(!counter.is_initialized());
    }

    #[test]
    fn increment_request_defaults_to_one() {
        let req: IncrementRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.increment, 1);

        let req: IncrementRequest = serde_json::from_str(r#"{"increment": -3}"#).unwrap();
        assert_eq!(req.increment, -3);

        assert!(serde_json::from_str::<IncrementRequest>(r#"{"increment": "five"}"#).is_err());
    }
}
