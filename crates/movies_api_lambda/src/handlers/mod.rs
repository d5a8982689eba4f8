use movies_api_core::tables::TableLayout;
use tracing::info;

use crate::adapters::table_store::TableStore;
use crate::adapters::translate::Translator;
use crate::handlers::response::{ApiGatewayResponse, HandlerFailure};

pub mod cast;
pub mod movies;
pub mod request;
pub mod response;
pub mod reviews;

/// Process-wide clients and settings borrowed by every invocation.
#[derive(Clone, Copy)]
pub struct ApiDependencies<'a> {
    pub store: &'a dyn TableStore,
    pub translator: &'a dyn Translator,
    pub tables: &'a TableLayout,
    pub source_language: &'a str,
}

fn respond(
    route: &str,
    result: Result<ApiGatewayResponse, HandlerFailure>,
) -> ApiGatewayResponse {
    let response = result.unwrap_or_else(|failure| failure.into_response(route));
    info!(route, status_code = response.status_code, "request handled");
    response
}
