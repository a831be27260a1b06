//! DynamoDB counter store.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ReturnValue,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::counter::Counter;
use crate::error::StoreError;

use super::CounterStore;

const ATTR_ID: &str = "id";
const ATTR_COUNT: &str = "count";
const ATTR_UPDATED_AT: &str = "updated_at";

/// `count` is a DynamoDB reserved word, so it goes through a name placeholder.
const ADD_EXPRESSION: &str = "ADD #count :inc SET #updated_at = :ts";

/// Counter store backed by a DynamoDB table with hash key `id`.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Wrap an existing client.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Build a client from configuration.
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

        if let Some(endpoint) = config.endpoint() {
            builder = builder.endpoint_url(endpoint);
        }

        // UpdateItem ADD is not idempotent, so a request is sent exactly once.
        builder = builder.retry_config(RetryConfig::disabled());

        if let Some((access_key, secret_key)) = config.static_credentials() {
            builder = builder.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "counter-api-static",
            ));
        }

        info!(
            table = %config.table_name,
            region = %config.aws_region,
            endpoint = config.endpoint().unwrap_or("aws-default"),
            "DynamoDB store configured"
        );

        Self::new(Client::from_conf(builder.build()), config.table_name.clone())
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }
}

fn request_error<E>(operation: &'static str, err: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Request {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

/// Decode a counter row from a DynamoDB item.
fn counter_from_item(item: &HashMap<String, AttributeValue>) -> Result<Counter, StoreError> {
    let id = item
        .get(ATTR_ID)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| StoreError::MalformedItem("missing string attribute id".to_string()))?;

    let count = item
        .get(ATTR_COUNT)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| StoreError::MalformedItem("missing number attribute count".to_string()))?
        .parse::<i128>()
        .map_err(|e| StoreError::MalformedItem(format!("count is not an integer: {e}")))?;

    let updated_at = item
        .get(ATTR_UPDATED_AT)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .unwrap_or_else(|| crate::counter::NEVER.to_string());

    Ok(Counter::new(id.clone(), count, updated_at))
}

#[async_trait]
impl CounterStore for DynamoStore {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn get(&self, id: &str) -> Result<Option<Counter>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(ATTR_ID, Self::key(id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| request_error("get_item", e))?;

        output.item().map(counter_from_item).transpose()
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn add(&self, id: &str, delta: i64, updated_at: &str) -> Result<Counter, StoreError> {
        let output = self
            .client
            .update_item()
            .table_name(&self.table)
            .key(ATTR_ID, Self::key(id))
            .update_expression(ADD_EXPRESSION)
            .expression_attribute_names("#count", ATTR_COUNT)
            .expression_attribute_names("#updated_at", ATTR_UPDATED_AT)
            .expression_attribute_values(":inc", AttributeValue::N(delta.to_string()))
            .expression_attribute_values(":ts", AttributeValue::S(updated_at.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| request_error("update_item", e))?;

        let attributes = output.attributes().ok_or_else(|| {
            StoreError::MalformedItem("update_item returned no attributes".to_string())
        })?;

        let counter = counter_from_item(attributes)?;
        debug!(count = counter.count, "counter updated");
        Ok(counter)
    }

    #[instrument(skip(self), fields(table = %self.table, id = %counter.id))]
    async fn put(&self, counter: &Counter) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item(ATTR_ID, Self::key(&counter.id))
            .item(ATTR_COUNT, AttributeValue::N(counter.count.to_string()))
            .item(ATTR_UPDATED_AT, AttributeValue::S(counter.updated_at.clone()))
            .send()
            .await
            .map_err(|e| request_error("put_item", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn ensure_table(&self) -> Result<(), StoreError> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(ATTR_ID)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| request_error("create_table", e))?;

        let attribute = AttributeDefinition::builder()
            .attribute_name(ATTR_ID)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| request_error("create_table", e))?;

        let result = self
            .client
            .create_table()
            .table_name(&self.table)
            .key_schema(key_schema)
            .attribute_definitions(attribute)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await;

        match result {
            Ok(_) => {
                info!("created table");
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|service| service.is_resource_in_use_exception()) =>
            {
                info!("table already exists");
                Ok(())
            }
            Err(e) => Err(request_error("create_table", e)),
        }
    }

    fn name(&self) -> &'static str {
        "dynamodb"
    }
}
