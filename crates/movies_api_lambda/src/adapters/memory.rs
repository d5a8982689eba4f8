//! In-process stand-ins for the table store and the translation service.
//!
//! The in-memory table evaluates the same [`QueryPlan`] the DynamoDB adapter
//! renders, keyed and ordered by the primary keys declared in
//! [`TableLayout`], so handler behaviour can be exercised without AWS.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use movies_api_core::contract::Item;
use movies_api_core::query::{compare_by_attribute, QueryPlan};
use movies_api_core::tables::TableLayout;
use serde_json::Value;

use crate::adapters::table_store::{StoreError, TableStore};
use crate::adapters::translate::{TranslateError, Translator};

#[derive(Default)]
struct TableState {
    tables: BTreeMap<String, Vec<Item>>,
    calls: Vec<String>,
    failure: Option<String>,
}

pub struct InMemoryTableStore {
    layout: TableLayout,
    state: Mutex<TableState>,
}

impl InMemoryTableStore {
    pub fn new(layout: TableLayout) -> Self {
        Self {
            layout,
            state: Mutex::new(TableState::default()),
        }
    }

    /// Loads items without recording a call.
    pub fn seed(&self, table: &str, items: impl IntoIterator<Item = Item>) {
        let mut state = self.lock();
        for item in items {
            upsert(&self.layout, &mut state.tables, table, item);
        }
    }

    /// Makes every later call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.lock().failure = Some(message.to_string());
    }

    /// Operations issued so far, as `"<Operation> <table>"`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn items(&self, table: &str) -> Vec<Item> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(
        &self,
        operation: &'static str,
        table: &str,
    ) -> Result<std::sync::MutexGuard<'_, TableState>, StoreError> {
        let mut state = self.lock();
        state.calls.push(format!("{operation} {table}"));
        if let Some(message) = state.failure.clone() {
            return Err(StoreError::request(operation, table, message));
        }
        Ok(state)
    }
}

impl TableStore for InMemoryTableStore {
    fn query(&self, table: &str, plan: &QueryPlan) -> Result<Vec<Item>, StoreError> {
        let state = self.begin("Query", table)?;
        let sort_attribute = match &plan.index_name {
            Some(index) => self
                .layout
                .index_keys(index)
                .ok_or_else(|| StoreError::request("Query", table, format!("unknown index {index}")))?
                .1,
            None => self.layout.kind_of(table).and_then(|kind| kind.sort_attribute()),
        };

        let mut items: Vec<Item> = state
            .tables
            .get(table)
            .map(|items| items.iter().filter(|item| plan.matches(item)).cloned().collect())
            .unwrap_or_default();
        if let Some(attribute) = sort_attribute {
            items.sort_by(|left, right| compare_by_attribute(left, right, attribute));
        }
        Ok(items)
    }

    fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError> {
        let state = self.begin("Scan", table)?;
        Ok(state.tables.get(table).cloned().unwrap_or_default())
    }

    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, StoreError> {
        let state = self.begin("GetItem", table)?;
        Ok(state
            .tables
            .get(table)
            .and_then(|items| items.iter().find(|item| has_key(item, key)))
            .cloned())
    }

    fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError> {
        let mut state = self.begin("PutItem", table)?;
        upsert(&self.layout, &mut state.tables, table, item);
        Ok(())
    }

    fn set_attribute(
        &self,
        table: &str,
        key: &Item,
        attribute: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut state = self.begin("UpdateItem", table)?;
        let items = state.tables.entry(table.to_string()).or_default();
        match items.iter_mut().find(|item| has_key(item, key)) {
            Some(item) => {
                item.insert(attribute.to_string(), value);
            }
            None => {
                let mut item = key.clone();
                item.insert(attribute.to_string(), value);
                items.push(item);
            }
        }
        Ok(())
    }

    fn delete_item(&self, table: &str, key: &Item) -> Result<(), StoreError> {
        let mut state = self.begin("DeleteItem", table)?;
        if let Some(items) = state.tables.get_mut(table) {
            items.retain(|item| !has_key(item, key));
        }
        Ok(())
    }
}

fn upsert(layout: &TableLayout, tables: &mut BTreeMap<String, Vec<Item>>, table: &str, item: Item) {
    let key: Item = match layout.kind_of(table) {
        Some(kind) => [Some(kind.partition_attribute()), kind.sort_attribute()]
            .into_iter()
            .flatten()
            .filter_map(|attribute| {
                item.get(attribute)
                    .map(|value| (attribute.to_string(), value.clone()))
            })
            .collect(),
        None => item.clone(),
    };
    let items = tables.entry(table.to_string()).or_default();
    items.retain(|existing| !has_key(existing, &key));
    items.push(item);
}

fn has_key(item: &Item, key: &Item) -> bool {
    key.iter().all(|(attribute, value)| item.get(attribute) == Some(value))
}

/// Deterministic translator: prefixes the text with the target language.
#[derive(Default)]
pub struct PrefixTranslator {
    calls: Mutex<Vec<(String, String, String)>>,
    failure: Option<String>,
}

impl PrefixTranslator {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    /// `(text, source, target)` for every call made.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Translator for PrefixTranslator {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslateError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((
                text.to_string(),
                source_language.to_string(),
                target_language.to_string(),
            ));
        match &self.failure {
            Some(message) => Err(TranslateError {
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
                message: message.clone(),
            }),
            None => Ok(format!("[{target_language}] {text}")),
        }
    }
}
