//! Application configuration loaded from environment variables.

use axum::http::HeaderValue;
use serde::Deserialize;
use strum::{Display, EnumString};

use crate::error::AppError;

/// Which key-value store backs the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    /// Amazon DynamoDB (or DynamoDB Local).
    #[default]
    Dynamodb,
    /// In-process map, state is lost on restart.
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins: `*` or a comma-separated list.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    // === Store Configuration ===
    /// Store backend.
    #[serde(default)]
    pub store_backend: StoreBackend,

    /// DynamoDB endpoint override. Empty means the AWS default endpoint.
    #[serde(default = "default_dynamodb_endpoint")]
    pub dynamodb_endpoint: String,

    /// AWS region.
    #[serde(default = "default_region")]
    pub aws_region: String,

    /// Static access key. Empty means the default credential chain.
    #[serde(default = "default_dummy_credential")]
    pub aws_access_key_id: String,

    /// Static secret key. Empty means the default credential chain.
    #[serde(default = "default_dummy_credential")]
    pub aws_secret_access_key: String,

    /// Table holding the counter row.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> String {
    "*".to_string()
}

fn default_dynamodb_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

// Development credentials only; use IAM roles in production.
fn default_dummy_credential() -> String {
    "dummy".to_string()
}

fn default_table_name() -> String {
    "counter_table".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origins: default_cors_origins(),
            store_backend: StoreBackend::default(),
            dynamodb_endpoint: default_dynamodb_endpoint(),
            aws_region: default_region(),
            aws_access_key_id: default_dummy_credential(),
            aws_secret_access_key: default_dummy_credential(),
            table_name: default_table_name(),
            rust_log: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Load configuration and reject invalid values.
    pub fn load_validated() -> crate::Result<Self> {
        let config = Self::load()?;
        config.validate().map_err(AppError::InvalidConfig)?;
        Ok(config)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(endpoint) = self.endpoint() {
            let parsed = url::Url::parse(endpoint)
                .map_err(|e| format!("DYNAMODB_ENDPOINT is not a valid URL: {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err("DYNAMODB_ENDPOINT must use http or https".to_string());
            }
        }

        if self.aws_region.trim().is_empty() {
            return Err("AWS_REGION is required".to_string());
        }

        validate_table_name(&self.table_name)?;

        if self.aws_access_key_id.is_empty() != self.aws_secret_access_key.is_empty() {
            return Err(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
            );
        }

        self.cors_origin_list()?;

        Ok(())
    }

    /// Endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        let endpoint = self.dynamodb_endpoint.trim();
        (!endpoint.is_empty()).then_some(endpoint)
    }

    /// Static credentials, if configured.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        if self.aws_access_key_id.is_empty() {
            None
        } else {
            Some((&self.aws_access_key_id, &self.aws_secret_access_key))
        }
    }

    /// Parsed CORS origins. `None` means any origin.
    pub fn cors_origin_list(&self) -> Result<Option<Vec<HeaderValue>>, String> {
        let raw = self.cors_origins.trim();
        if raw == "*" {
            return Ok(None);
        }

        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| format!("CORS_ORIGINS entry {origin:?} is not a valid header value"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if origins.is_empty() {
            return Err("CORS_ORIGINS must be * or a list of origins".to_string());
        }

        Ok(Some(origins))
    }
}

/// DynamoDB table names are 3-255 characters of `[a-zA-Z0-9_.-]`.
fn validate_table_name(name: &str) -> Result<(), String> {
    if !(3..=255).contains(&name.len()) {
        return Err("TABLE_NAME must be between 3 and 255 characters".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err("TABLE_NAME may only contain letters, digits, '_', '-' and '.'".to_string());
    }

    Ok(())
}
