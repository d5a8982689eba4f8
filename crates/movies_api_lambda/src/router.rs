use serde_json::Value;
use tracing::warn;

use crate::handlers::request::ApiRequest;
use crate::handlers::response::{message, not_found, ApiGatewayResponse};
use crate::handlers::{cast, movies, reviews, ApiDependencies};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ListMovies,
    AddMovie,
    GetMovie,
    DeleteMovie,
    GetCast,
    AddReview,
    GetReviewerReviews,
    GetMovieReviews,
    UpdateReview,
}

impl Route {
    pub fn resolve(method: &str, resource: &str) -> Option<Self> {
        let route = match (method, resource.trim_end_matches('/')) {
            ("GET", "/movies") => Self::ListMovies,
            ("POST", "/movies") => Self::AddMovie,
            ("GET", "/movies/{movieId}") => Self::GetMovie,
            ("DELETE", "/movies/{movieId}") => Self::DeleteMovie,
            ("GET", "/movies/cast") => Self::GetCast,
            ("POST", "/movies/reviews") => Self::AddReview,
            ("GET", "/movies/reviews/{reviewerName}") => Self::GetReviewerReviews,
            ("GET", "/movies/{movieId}/reviews")
            | ("GET", "/movies/{movieId}/reviews/{reviewerName}")
            | ("GET", "/movies/{movieId}/reviews/{reviewerName}/translation")
            | ("GET", "/movies/{movieId}/reviews/dates/{date}") => Self::GetMovieReviews,
            ("PUT", "/movies/{movieId}/reviews/{reviewerName}") => Self::UpdateReview,
            _ => return None,
        };
        Some(route)
    }

    pub fn handler(self) -> fn(&ApiRequest, ApiDependencies) -> ApiGatewayResponse {
        match self {
            Self::ListMovies => movies::handle_get_all_movies,
            Self::AddMovie => movies::handle_add_movie,
            Self::GetMovie => movies::handle_get_movie,
            Self::DeleteMovie => movies::handle_delete_movie,
            Self::GetCast => cast::handle_get_cast,
            Self::AddReview => reviews::handle_add_review,
            Self::GetReviewerReviews => reviews::handle_get_reviewer_reviews,
            Self::GetMovieReviews => reviews::handle_get_movie_reviews,
            Self::UpdateReview => reviews::handle_update_review,
        }
    }
}

/// Entry point for one proxy event: parse, pick one handler, run it.
pub fn handle_event(event: Value, deps: ApiDependencies) -> ApiGatewayResponse {
    let request = match ApiRequest::from_event(event) {
        Ok(request) => request,
        Err(error) => {
            warn!(error = %error, "unreadable proxy event");
            return message(500, &error);
        }
    };
    dispatch(&request, deps)
}

pub fn dispatch(request: &ApiRequest, deps: ApiDependencies) -> ApiGatewayResponse {
    let (method, resource) = request.route_parts();
    match Route::resolve(&method, &resource) {
        Some(route) => route.handler()(request, deps),
        None => {
            warn!(method = %method, resource = %resource, "no route");
            not_found("Route not found")
        }
    }
}
