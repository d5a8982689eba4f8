use movies_api_core::contract::{parse_review_body, to_item, Item, RequestError};
use movies_api_core::params::{MovieId, ReviewKeyParams, ReviewQueryParams};
use movies_api_core::query::{plan_review_query, plan_reviewer_query};
use movies_api_core::tables::{COMMENT, MOVIE_ID, REVIEWER_NAME};
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::table_store::item_key;
use crate::adapters::translate::{TranslateError, Translator};
use crate::handlers::request::ApiRequest;
use crate::handlers::response::{data, message, ApiGatewayResponse, HandlerFailure};
use crate::handlers::{respond, ApiDependencies};

const NO_REVIEWS: &str = "No reviews found";

/// Reviews of one movie, narrowed by at most one discriminator and
/// optionally with the first comment translated.
pub fn handle_get_movie_reviews(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("get_movie_reviews", get_movie_reviews(request, deps))
}

pub fn handle_update_review(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("update_review", update_review(request, deps))
}

pub fn handle_add_review(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("add_review", add_review(request, deps))
}

pub fn handle_get_reviewer_reviews(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> ApiGatewayResponse {
    respond("get_reviewer_reviews", get_reviewer_reviews(request, deps))
}

fn get_movie_reviews(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let params = ReviewQueryParams::from_parameters(
        &request.path_parameters,
        &request.query_string_parameters,
    )?;
    let (selector, plan) = plan_review_query(&params);
    debug!(
        movie_id = %params.movie_id,
        selector = selector.name(),
        "selected review query"
    );

    let mut reviews = deps.store.query(&deps.tables.reviews, &plan)?;
    if reviews.is_empty() {
        return Err(HandlerFailure::NotFound(NO_REVIEWS));
    }

    if let Some(language) = &params.language {
        translate_first_comment(
            &mut reviews,
            deps.translator,
            deps.source_language,
            language,
        )?;
    }
    Ok(data(200, reviews))
}

/// Replaces the first record's comment with its translation. Records without
/// a text comment are left as they are.
pub fn translate_first_comment(
    reviews: &mut [Item],
    translator: &dyn Translator,
    source_language: &str,
    target_language: &str,
) -> Result<(), TranslateError> {
    let Some(first) = reviews.first_mut() else {
        return Ok(());
    };
    let Some(comment) = first.get(COMMENT).and_then(Value::as_str) else {
        return Ok(());
    };
    let translated = translator.translate(comment, source_language, target_language)?;
    first.insert(COMMENT.to_string(), Value::String(translated));
    Ok(())
}

fn update_review(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let review = parse_review_body(request.body.as_deref())?;
    let key = ReviewKeyParams::from_parameters(&request.path_parameters)?;

    deps.store.set_attribute(
        &deps.tables.reviews,
        &review_key(key.movie_id, &key.reviewer_name),
        COMMENT,
        Value::String(review.comment),
    )?;
    info!(
        movie_id = %key.movie_id,
        reviewer_name = %key.reviewer_name,
        "review comment updated"
    );
    Ok(message(200, "Review updated"))
}

fn add_review(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let review = parse_review_body(request.body.as_deref())?;
    deps.store.put_item(&deps.tables.reviews, to_item(&review))?;
    info!(
        movie_id = review.movie_id,
        reviewer_name = %review.reviewer_name,
        "review added"
    );
    Ok(message(201, "Review added"))
}

fn get_reviewer_reviews(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let reviewer_name = request
        .path(REVIEWER_NAME)
        .ok_or(RequestError::MissingReviewKey)?;
    let plan = plan_reviewer_query(reviewer_name, deps.tables);
    let reviews = deps.store.query(&deps.tables.reviews, &plan)?;
    if reviews.is_empty() {
        return Err(HandlerFailure::NotFound(NO_REVIEWS));
    }
    Ok(data(200, reviews))
}

fn review_key(movie_id: MovieId, reviewer_name: &str) -> Item {
    item_key([
        (MOVIE_ID, Value::from(movie_id.get())),
        (REVIEWER_NAME, Value::from(reviewer_name)),
    ])
}

#[cfg(test)]
mod tests {
    use movies_api_core::tables::TableLayout;
    use serde_json::json;

    use super::*;
    use crate::adapters::memory::{InMemoryTableStore, PrefixTranslator};

    struct Fixture {
        store: InMemoryTableStore,
        translator: PrefixTranslator,
        tables: TableLayout,
    }

    impl Fixture {
        fn new() -> Self {
            let tables = TableLayout::default();
            let store = InMemoryTableStore::new(tables.clone());
            store.seed(
                "Reviews",
                [
                    review(1234, "Ann", "2022-03-01", 3, "Fine."),
                    review(1234, "Bob", "2023-07-12", 9, "Loved it."),
                    review(1234, "Bobby", "2023-11-30", 10, "Best of the year."),
                    review(1234, "1999", "2021-01-01", 5, "Party like it's 1999."),
                    review(5678, "Ann", "2023-02-02", 7, "Different movie."),
                ],
            );
            Self {
                store,
                translator: PrefixTranslator::default(),
                tables,
            }
        }

        fn deps(&self) -> ApiDependencies<'_> {
            ApiDependencies {
                store: &self.store,
                translator: &self.translator,
                tables: &self.tables,
                source_language: "en",
            }
        }
    }

    fn review(movie_id: u64, reviewer: &str, date: &str, rating: u32, comment: &str) -> Item {
        json!({
            "movieId": movie_id,
            "reviewerName": reviewer,
            "reviewDate": date,
            "rating": rating,
            "comment": comment,
        })
        .as_object()
        .cloned()
        .expect("object")
    }

    fn request(path: &[(&str, &str)], query: &[(&str, &str)]) -> ApiRequest {
        ApiRequest {
            path_parameters: path
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            query_string_parameters: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            ..ApiRequest::default()
        }
    }

    fn reviewer_names(response: &ApiGatewayResponse) -> Vec<String> {
        response.body_json()["data"]
            .as_array()
            .expect("data array")
            .iter()
            .map(|item| item["reviewerName"].as_str().expect("name").to_string())
            .collect()
    }

    #[test]
    fn no_discriminators_return_whole_partition() {
        let fixture = Fixture::new();
        let response =
            handle_get_movie_reviews(&request(&[("movieId", "1234")], &[]), fixture.deps());
        assert_eq!(response.status_code, 200);
        assert_eq!(reviewer_names(&response), vec!["1999", "Ann", "Bob", "Bobby"]);
    }

    #[test]
    fn min_rating_filters_numerically() {
        let fixture = Fixture::new();
        let response = handle_get_movie_reviews(
            &request(&[("movieId", "1234")], &[("minRating", "9")]),
            fixture.deps(),
        );
        assert_eq!(reviewer_names(&response), vec!["Bob", "Bobby"]);
    }

    #[test]
    fn four_digit_token_filters_by_year() {
        let fixture = Fixture::new();
        let response = handle_get_movie_reviews(
            &request(&[("movieId", "1234"), ("reviewerName", "2023")], &[]),
            fixture.deps(),
        );
        assert_eq!(reviewer_names(&response), vec!["Bob", "Bobby"]);
    }

    #[test]
    fn name_token_matches_reviewer_prefix() {
        let fixture = Fixture::new();
        let response = handle_get_movie_reviews(
            &request(&[("movieId", "1234"), ("reviewerName", "Bob")], &[]),
            fixture.deps(),
        );
        assert_eq!(reviewer_names(&response), vec!["Bob", "Bobby"]);
    }

    #[test]
    fn explicit_reviewer_discriminator_reaches_numeric_reviewer() {
        let fixture = Fixture::new();
        let response = handle_get_movie_reviews(
            &request(
                &[("movieId", "1234"), ("reviewerName", "1999")],
                &[("by", "reviewer")],
            ),
            fixture.deps(),
        );
        assert_eq!(reviewer_names(&response), vec!["1999"]);
    }

    #[test]
    fn explicit_date_filters_review_date_prefix() {
        let fixture = Fixture::new();
        let response = handle_get_movie_reviews(
            &request(&[("movieId", "1234"), ("date", "2023-07")], &[]),
            fixture.deps(),
        );
        assert_eq!(reviewer_names(&response), vec!["Bob"]);
    }

    #[test]
    fn empty_result_is_not_found_for_every_selector() {
        let fixture = Fixture::new();
        for (path, query) in [
            (vec![("movieId", "42")], vec![]),
            (vec![("movieId", "1234")], vec![("minRating", "11")]),
            (vec![("movieId", "1234"), ("reviewerName", "1980")], vec![]),
            (vec![("movieId", "1234"), ("reviewerName", "Zoe")], vec![]),
            (vec![("movieId", "1234"), ("date", "2019")], vec![]),
        ] {
            let response = handle_get_movie_reviews(&request(&path, &query), fixture.deps());
            assert_eq!(response.status_code, 404);
            assert_eq!(response.body_json(), json!({"Message": "No reviews found"}));
        }
    }

    #[test]
    fn missing_movie_id_is_not_found_without_store_call() {
        let fixture = Fixture::new();
        let response =
            handle_get_movie_reviews(&request(&[("movieId", "abc")], &[]), fixture.deps());
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body_json(), json!({"Message": "Missing movie Id"}));
        assert!(fixture.store.calls().is_empty());
    }

    #[test]
    fn translation_replaces_only_first_comment() {
        let fixture = Fixture::new();
        let response = handle_get_movie_reviews(
            &request(
                &[("movieId", "1234"), ("reviewerName", "Bob")],
                &[("language", "fr")],
            ),
            fixture.deps(),
        );

        assert_eq!(response.status_code, 200);
        let body = response.body_json();
        let data = body["data"].as_array().expect("data array");
        assert_eq!(data[0]["comment"], "[fr] Loved it.");
        assert_eq!(data[0]["rating"], 9);
        assert_eq!(data[1]["comment"], "Best of the year.");
        assert_eq!(
            fixture.translator.calls(),
            vec![("Loved it.".to_string(), "en".to_string(), "fr".to_string())]
        );
    }

    #[test]
    fn translation_failure_is_a_server_error() {
        let fixture = Fixture::new();
        let translator = PrefixTranslator::failing("unsupported language pair");
        let deps = ApiDependencies {
            translator: &translator,
            ..fixture.deps()
        };
        let response = handle_get_movie_reviews(
            &request(&[("movieId", "1234")], &[("language", "xx")]),
            deps,
        );
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body_json()["error"]["name"], "TranslateError");
    }

    #[test]
    fn store_failure_is_a_server_error() {
        let fixture = Fixture::new();
        fixture.store.fail_with("service unavailable");
        let response =
            handle_get_movie_reviews(&request(&[("movieId", "1234")], &[]), fixture.deps());
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body_json()["error"]["name"], "StoreRequestError");
    }

    #[test]
    fn update_sets_comment_and_upserts_missing_review() {
        let fixture = Fixture::new();
        let mut update = request(&[("movieId", "1234"), ("reviewerName", "Carol")], &[]);
        update.body = Some(
            json!({
                "movieId": 1234,
                "reviewerName": "Carol",
                "reviewDate": "2024-01-01",
                "rating": 6,
                "comment": "Grew on me."
            })
            .to_string(),
        );

        let response = handle_update_review(&update, fixture.deps());
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body_json(), json!({"message": "Review updated"}));

        let carol = fixture
            .store
            .items("Reviews")
            .into_iter()
            .find(|item| item["reviewerName"] == "Carol")
            .expect("upserted review");
        assert_eq!(carol["comment"], "Grew on me.");
        assert_eq!(carol.get("rating"), None);
    }

    #[test]
    fn update_validates_body_before_any_store_call() {
        let fixture = Fixture::new();
        let mut update = request(&[("movieId", "1234"), ("reviewerName", "Ann")], &[]);
        update.body = Some(json!({"comment": "only a comment"}).to_string());

        let response = handle_update_review(&update, fixture.deps());
        assert_eq!(response.status_code, 500);
        let body = response.body_json();
        assert_eq!(body["message"], "Incorrect type. Must match Review schema");
        assert!(body["schema"].is_object());
        assert!(fixture.store.calls().is_empty());
    }

    #[test]
    fn update_without_body_or_key_is_rejected() {
        let fixture = Fixture::new();
        let response = handle_update_review(
            &request(&[("movieId", "1234"), ("reviewerName", "Ann")], &[]),
            fixture.deps(),
        );
        assert_eq!(response.body_json(), json!({"message": "Missing request body"}));

        let mut keyless = request(&[("movieId", "1234")], &[]);
        keyless.body = Some(
            serde_json::to_string(&review(1234, "Ann", "2022-03-01", 3, "Changed my mind."))
                .expect("serialize"),
        );
        let response = handle_update_review(&keyless, fixture.deps());
        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body_json(),
            json!({"message": "Missing movieId or reviewerName"})
        );
        assert!(fixture.store.calls().is_empty());
    }

    #[test]
    fn add_review_stores_full_record() {
        let fixture = Fixture::new();
        let mut add = request(&[], &[]);
        add.body = Some(
            serde_json::to_string(&review(5678, "Dee", "2024-02-02", 8, "Sharp."))
                .expect("serialize"),
        );
        let response = handle_add_review(&add, fixture.deps());
        assert_eq!(response.status_code, 201);
        assert_eq!(fixture.store.items("Reviews").len(), 6);
    }

    #[test]
    fn reviewer_reviews_span_movies() {
        let fixture = Fixture::new();
        let response = handle_get_reviewer_reviews(
            &request(&[("reviewerName", "Ann")], &[]),
            fixture.deps(),
        );
        assert_eq!(response.status_code, 200);
        let movie_ids: Vec<Value> = response.body_json()["data"]
            .as_array()
            .expect("data array")
            .iter()
            .map(|item| item["movieId"].clone())
            .collect();
        assert_eq!(movie_ids, vec![json!(1234), json!(5678)]);
    }
}
