//! DynamoDB [`TableStore`].
//!
//! Items cross the boundary as JSON objects and are converted with
//! `serde_dynamo`. Calls bridge into the async SDK with `block_in_place`, so
//! the store must be used from a multi-threaded tokio runtime.

use std::collections::HashMap;
use std::future::Future;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use movies_api_core::contract::Item;
use movies_api_core::query::QueryPlan;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::table_store::{StoreError, TableStore};

type AttributeMap = HashMap<String, AttributeValue>;

pub struct DynamoTableStore {
    client: Client,
}

impl DynamoTableStore {
    /// Builds the client once; `endpoint_url` points at a local DynamoDB.
    pub fn new(config: &aws_config::SdkConfig, endpoint_url: Option<&str>) -> Self {
        let client = if let Some(endpoint) = endpoint_url {
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        } else {
            Client::new(config)
        };
        info!(endpoint = endpoint_url.unwrap_or("default"), "DynamoDB client ready");
        Self { client }
    }
}

impl TableStore for DynamoTableStore {
    fn query(&self, table: &str, plan: &QueryPlan) -> Result<Vec<Item>, StoreError> {
        let rendered = plan.render();
        let names: HashMap<String, String> = rendered.attribute_names.into_iter().collect();
        let mut values = AttributeMap::with_capacity(rendered.attribute_values.len());
        for (placeholder, value) in rendered.attribute_values {
            values.insert(placeholder, to_attribute(table, value)?);
        }

        block_on(async {
            let mut items = Vec::new();
            let mut start_key: Option<AttributeMap> = None;
            loop {
                let output = self
                    .client
                    .query()
                    .table_name(table)
                    .set_index_name(plan.index_name.clone())
                    .key_condition_expression(&rendered.key_condition_expression)
                    .set_filter_expression(rendered.filter_expression.clone())
                    .set_expression_attribute_names(Some(names.clone()))
                    .set_expression_attribute_values(Some(values.clone()))
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await
                    .map_err(|error| {
                        StoreError::request("Query", table, DisplayErrorContext(&error))
                    })?;

                for item in output.items.unwrap_or_default() {
                    items.push(from_attributes(table, item)?);
                }
                match output.last_evaluated_key {
                    Some(key) if !key.is_empty() => start_key = Some(key),
                    _ => break,
                }
            }
            debug!(table, count = items.len(), "query complete");
            Ok::<_, StoreError>(items)
        })
    }

    fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError> {
        block_on(async {
            let mut items = Vec::new();
            let mut start_key: Option<AttributeMap> = None;
            loop {
                let output = self
                    .client
                    .scan()
                    .table_name(table)
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await
                    .map_err(|error| {
                        StoreError::request("Scan", table, DisplayErrorContext(&error))
                    })?;

                for item in output.items.unwrap_or_default() {
                    items.push(from_attributes(table, item)?);
                }
                match output.last_evaluated_key {
                    Some(key) if !key.is_empty() => start_key = Some(key),
                    _ => break,
                }
            }
            Ok::<_, StoreError>(items)
        })
    }

    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, StoreError> {
        let key = to_attributes(table, key)?;
        let output = block_on(
            self.client
                .get_item()
                .table_name(table)
                .set_key(Some(key))
                .send(),
        )
        .map_err(|error| StoreError::request("GetItem", table, DisplayErrorContext(&error)))?;

        output
            .item
            .map(|item| from_attributes(table, item))
            .transpose()
    }

    fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError> {
        let item = to_attributes(table, &item)?;
        block_on(
            self.client
                .put_item()
                .table_name(table)
                .set_item(Some(item))
                .send(),
        )
        .map(|_| ())
        .map_err(|error| StoreError::request("PutItem", table, DisplayErrorContext(&error)))
    }

    fn set_attribute(
        &self,
        table: &str,
        key: &Item,
        attribute: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let key = to_attributes(table, key)?;
        let value = to_attribute(table, value)?;
        block_on(
            self.client
                .update_item()
                .table_name(table)
                .set_key(Some(key))
                .update_expression("SET #attr = :value")
                .expression_attribute_names("#attr", attribute)
                .expression_attribute_values(":value", value)
                .send(),
        )
        .map(|_| ())
        .map_err(|error| StoreError::request("UpdateItem", table, DisplayErrorContext(&error)))
    }

    fn delete_item(&self, table: &str, key: &Item) -> Result<(), StoreError> {
        let key = to_attributes(table, key)?;
        block_on(
            self.client
                .delete_item()
                .table_name(table)
                .set_key(Some(key))
                .send(),
        )
        .map(|_| ())
        .map_err(|error| StoreError::request("DeleteItem", table, DisplayErrorContext(&error)))
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn to_attributes(table: &str, item: &Item) -> Result<AttributeMap, StoreError> {
    serde_dynamo::to_item::<_, AttributeMap>(item).map_err(|error| StoreError::conversion(table, error))
}

fn to_attribute(table: &str, value: Value) -> Result<AttributeValue, StoreError> {
    serde_dynamo::to_attribute_value::<_, AttributeValue>(value)
        .map_err(|error| StoreError::conversion(table, error))
}

fn from_attributes(table: &str, item: AttributeMap) -> Result<Item, StoreError> {
    serde_dynamo::from_item(item).map_err(|error| StoreError::conversion(table, error))
}
