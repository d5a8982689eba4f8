use movies_api_core::contract::{parse_movie_body, to_item, Item, RequestError};
use movies_api_core::params::{MovieId, MovieLookupParams};
use movies_api_core::query::QueryPlan;
use movies_api_core::tables::MOVIE_ID;
use serde_json::Value;
use tracing::info;

use crate::adapters::table_store::item_key;
use crate::handlers::request::ApiRequest;
use crate::handlers::response::{data, message, ApiGatewayResponse, HandlerFailure};
use crate::handlers::{respond, ApiDependencies};

pub fn handle_get_all_movies(_request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("get_all_movies", get_all_movies(deps))
}

pub fn handle_get_movie(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("get_movie", get_movie(request, deps))
}

pub fn handle_add_movie(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("add_movie", add_movie(request, deps))
}

pub fn handle_delete_movie(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    respond("delete_movie", delete_movie(request, deps))
}

fn get_all_movies(deps: ApiDependencies) -> Result<ApiGatewayResponse, HandlerFailure> {
    let movies = deps.store.scan(&deps.tables.movies)?;
    Ok(data(200, movies))
}

fn get_movie(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let params = MovieLookupParams::from_parameters(
        &request.path_parameters,
        &request.query_string_parameters,
    )?;
    let mut movie = deps
        .store
        .get_item(&deps.tables.movies, &movie_key(params.movie_id))?
        .ok_or(HandlerFailure::NotFound("Invalid movie Id"))?;

    if params.include_cast {
        let plan = QueryPlan::partition(MOVIE_ID, params.movie_id.get());
        let cast = deps.store.query(&deps.tables.cast, &plan)?;
        movie.insert(
            "cast".to_string(),
            Value::Array(cast.into_iter().map(Value::Object).collect()),
        );
    }
    Ok(data(200, movie))
}

fn add_movie(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let movie = parse_movie_body(request.body.as_deref())?;
    deps.store.put_item(&deps.tables.movies, to_item(&movie))?;
    info!(movie_id = movie.movie_id, title = %movie.title, "movie added");
    Ok(message(201, "Movie added"))
}

fn delete_movie(
    request: &ApiRequest,
    deps: ApiDependencies,
) -> Result<ApiGatewayResponse, HandlerFailure> {
    let movie_id = MovieId::parse(request.path(MOVIE_ID)).ok_or(RequestError::MissingMovieId)?;
    deps.store.delete_item(&deps.tables.movies, &movie_key(movie_id))?;
    info!(movie_id = %movie_id, "movie deleted");
    Ok(message(200, "Movie deleted"))
}

pub(crate) fn movie_key(movie_id: MovieId) -> Item {
    item_key([(MOVIE_ID, Value::from(movie_id.get()))])
}
