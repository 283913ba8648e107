//! Request DTOs for the cache admin API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl_ms`: Optional TTL in milliseconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

/// Request body for POST /batch/get
#[derive(Debug, Clone, Deserialize)]
pub struct BatchGetRequest {
    pub keys: Vec<String>,
}

/// Request body for PUT /batch/set
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSetRequest {
    pub entries: HashMap<String, Value>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl BatchSetRequest {
    /// Returns the first key validation error, if any.
    pub fn validate(&self) -> Option<String> {
        self.entries.keys().find_map(|key| validate_key(key))
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

/// Query string for GET /keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysQuery {
    /// Regular expression keys must match
    #[serde(default)]
    pub pattern: Option<String>,
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}
