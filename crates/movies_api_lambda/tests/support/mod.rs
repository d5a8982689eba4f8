#![allow(dead_code)]

use movies_api_core::contract::Item;
use movies_api_core::tables::TableLayout;
use movies_api_lambda::adapters::memory::{InMemoryTableStore, PrefixTranslator};
use movies_api_lambda::handlers::response::ApiGatewayResponse;
use movies_api_lambda::handlers::ApiDependencies;
use movies_api_lambda::router::handle_event;
use serde_json::{json, Map, Value};

/// Seeded store plus translator, driven through the router like the runtime does.
pub struct TestApi {
    pub store: InMemoryTableStore,
    pub translator: PrefixTranslator,
    pub tables: TableLayout,
}

impl TestApi {
    pub fn seeded() -> Self {
        Self::with_translator(PrefixTranslator::default())
    }

    pub fn with_translator(translator: PrefixTranslator) -> Self {
        let tables = TableLayout::default();
        let store = InMemoryTableStore::new(tables.clone());
        store.seed(
            "Movies",
            [
                item(json!({"movieId": 1234, "title": "Heat", "release_date": "1995-12-15"})),
                item(json!({"movieId": 5678, "title": "Ronin", "release_date": "1998-09-25"})),
            ],
        );
        store.seed(
            "Reviews",
            [
                review(1234, "Ann", "2019-03-02", 9.0, "Tense and long."),
                review(1234, "Bob", "2021-07-14", 6.5, "Too long."),
                review(1234, "Bobby", "2021-11-30", 8.0, "The diner scene."),
                review(5678, "Ann", "2020-01-05", 7.0, "Car chases."),
            ],
        );
        store.seed(
            "MovieCast",
            [
                item(json!({"movieId": 1234, "actorName": "Al Pacino", "roleName": "Vincent Hanna"})),
                item(json!({"movieId": 1234, "actorName": "Robert De Niro", "roleName": "Neil McCauley"})),
            ],
        );
        Self {
            store,
            translator,
            tables,
        }
    }

    pub fn deps(&self) -> ApiDependencies<'_> {
        ApiDependencies {
            store: &self.store,
            translator: &self.translator,
            tables: &self.tables,
            source_language: "en",
        }
    }

    pub fn send(&self, event: Value) -> ApiGatewayResponse {
        handle_event(event, self.deps())
    }
}

pub fn item(value: Value) -> Item {
    value.as_object().cloned().expect("object literal")
}

pub fn review(movie_id: u64, reviewer: &str, date: &str, rating: f64, comment: &str) -> Item {
    item(json!({
        "movieId": movie_id,
        "reviewerName": reviewer,
        "reviewDate": date,
        "rating": rating,
        "comment": comment,
    }))
}

/// REST API proxy event for `method resource`.
pub fn event(
    method: &str,
    resource: &str,
    path: &[(&str, &str)],
    query: &[(&str, &str)],
    body: Option<Value>,
) -> Value {
    let to_map = |pairs: &[(&str, &str)]| -> Value {
        if pairs.is_empty() {
            return Value::Null;
        }
        Value::Object(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect::<Map<String, Value>>(),
        )
    };
    json!({
        "httpMethod": method,
        "resource": resource,
        "pathParameters": to_map(path),
        "queryStringParameters": to_map(query),
        "body": body.map(|value| value.to_string()),
    })
}

pub fn reviewer_names(response: &ApiGatewayResponse) -> Vec<String> {
    response.body_json()["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|review| review["reviewerName"].as_str().expect("reviewer").to_string())
        .collect()
}
