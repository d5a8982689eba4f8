use movies_api_core::params::CastQueryParams;
use movies_api_core::query::plan_cast_query;
use serde_json::{json, Value};
use tracing::debug;

use crate::handlers::movies::movie_key;
use crate::handlers::request::ApiRequest;
use crate::handlers::response::{data, ApiGatewayResponse, HandlerFailure};
use crate::handlers::{respond, ApiDependencies};

/// Cast of one movie, optionally narrowed by role or actor name prefix.
pub fn handle_get_cast(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("get_cast", get_cast(request, deps))
}

fn get_cast(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let params = CastQueryParams::from_parameters(&request.query_string_parameters)?;
    let plan = plan_cast_query(&params, deps.tables);
    debug!(
        movie_id = %params.movie_id,
        index = plan.index_name.as_deref().unwrap_or("primary"),
        "selected cast query"
    );
    let cast = deps.store.query(&deps.tables.cast, &plan)?;

    if !params.include_facts {
        return Ok(data(200, cast));
    }

    let movie = deps
        .store
        .get_item(&deps.tables.movies, &movie_key(params.movie_id))?
        .map(Value::Object)
        .unwrap_or(Value::Null);
    Ok(data(200, json!({ "movie": movie, "cast": cast })))
}

#[cfg(test)]
mod tests {
    use movies_api_core::contract::Item;
    use movies_api_core::tables::TableLayout;

    use super::*;
    use crate::adapters::memory::{InMemoryTableStore, PrefixTranslator};

    fn item(value: Value) -> Item {
        value.as_object().cloned().expect("object")
    }

    fn run(query: &[(&str, &str)]) -> (ApiGatewayResponse, Vec<String>) {
        let tables = TableLayout::default();
        let store = InMemoryTableStore::new(tables.clone());
        store.seed("Movies", [item(json!({"movieId": 1234, "title": "Heat"}))]);
        store.seed(
            "MovieCast",
            [
                item(json!({"movieId": 1234, "actorName": "Robert De Niro", "roleName": "Neil McCauley"})),
                item(json!({"movieId": 1234, "actorName": "Al Pacino", "roleName": "Vincent Hanna"})),
                item(json!({"movieId": 1234, "actorName": "Val Kilmer", "roleName": "Chris Shiherlis"})),
            ],
        );
        let translator = PrefixTranslator::default();
        let request = ApiRequest {
            query_string_parameters: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            ..ApiRequest::default()
        };
        let response = handle_get_cast(
            &request,
            ApiDependencies {
                store: &store,
                translator: &translator,
                tables: &tables,
                source_language: "en",
            },
        );
        (response, store.calls())
    }

    fn names(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|member| member["actorName"].as_str().expect("actor"))
            .collect()
    }

    #[test]
    fn lists_whole_cast_by_actor() {
        let (response, _) = run(&[("movieId", "1234")]);
        assert_eq!(response.status_code, 200);
        let body = response.body_json();
        assert_eq!(
            names(&body["data"]),
            vec!["Al Pacino", "Robert De Niro", "Val Kilmer"]
        );
    }

    #[test]
    fn role_prefix_uses_role_index_order() {
        let (response, _) = run(&[("movieId", "1234"), ("roleName", "Neil")]);
        let body = response.body_json();
        assert_eq!(names(&body["data"]), vec!["Robert De Niro"]);
    }

    #[test]
    fn actor_prefix_narrows_sort_key() {
        let (response, _) = run(&[("movieId", "1234"), ("actorName", "Va")]);
        let body = response.body_json();
        assert_eq!(names(&body["data"]), vec!["Val Kilmer"]);
    }

    #[test]
    fn facts_flag_adds_movie_record() {
        let (response, calls) = run(&[("movieId", "1234"), ("facts", "true")]);
        let body = response.body_json();
        assert_eq!(body["data"]["movie"]["title"], "Heat");
        assert_eq!(names(&body["data"]["cast"]).len(), 3);
        assert_eq!(calls, vec!["Query MovieCast", "GetItem Movies"]);
    }

    #[test]
    fn missing_movie_id_is_not_found_without_store_call() {
        let (response, calls) = run(&[("roleName", "Neil")]);
        assert_eq!(response.status_code, 404);
        assert!(calls.is_empty());
    }
}
