use movies_api_core::contract::Item;
use movies_api_core::query::QueryPlan;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{operation} on table {table} failed: {message}")]
    Request {
        operation: &'static str,
        table: String,
        message: String,
    },
    #[error("item conversion for table {table} failed: {message}")]
    Conversion { table: String, message: String },
}

impl StoreError {
    pub fn request(operation: &'static str, table: &str, message: impl ToString) -> Self {
        Self::Request {
            operation,
            table: table.to_string(),
            message: message.to_string(),
        }
    }

    pub fn conversion(table: &str, message: impl ToString) -> Self {
        Self::Conversion {
            table: table.to_string(),
            message: message.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Request { .. } => "StoreRequestError",
            Self::Conversion { .. } => "StoreConversionError",
        }
    }
}

/// Single-item and single-query access to a partitioned, sorted table.
///
/// Every call is one round trip; nothing here spans more than one item write.
pub trait TableStore {
    /// Every item matching the plan, in sort-key order.
    fn query(&self, table: &str, plan: &QueryPlan) -> Result<Vec<Item>, StoreError>;

    fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError>;

    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, StoreError>;

    /// Inserts or replaces the item with the same primary key.
    fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError>;

    /// Sets one attribute on the keyed item, creating the item if it is missing.
    fn set_attribute(
        &self,
        table: &str,
        key: &Item,
        attribute: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    fn delete_item(&self, table: &str, key: &Item) -> Result<(), StoreError>;
}

/// Builds a primary-key map from `(attribute, value)` pairs.
pub fn item_key<const N: usize>(parts: [(&str, Value); N]) -> Item {
    parts
        .into_iter()
        .map(|(attribute, value)| (attribute.to_string(), value))
        .collect()
}
