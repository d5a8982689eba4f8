use movies_api_core::contract::RequestError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::adapters::table_store::StoreError;
use crate::adapters::translate::TranslateError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn body_json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Everything that stops a handler short of a success response.
#[derive(Debug, Error)]
pub enum HandlerFailure {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl HandlerFailure {
    pub fn into_response(self, route: &str) -> ApiGatewayResponse {
        match self {
            Self::Request(RequestError::MissingMovieId) => {
                warn!(route, "request without a usable movie id");
                not_found(&RequestError::MissingMovieId.to_string())
            }
            Self::Request(request_error) => {
                let text = request_error.to_string();
                match request_error {
                    RequestError::SchemaViolation { schema, detail } => {
                        warn!(route, schema = schema.name(), detail = %detail, "body failed schema validation");
                        json_response(
                            500,
                            json!({
                                "message": text,
                                "schema": schema.document(),
                            }),
                        )
                    }
                    _ => {
                        warn!(route, error = %text, "rejected request");
                        message(500, &text)
                    }
                }
            }
            Self::NotFound(text) => not_found(text),
            Self::Store(store_error) => {
                error!(route, error = %store_error, "store call failed");
                internal_error(store_error.name(), &store_error.to_string())
            }
            Self::Translate(translate_error) => {
                error!(route, error = %translate_error, "translation failed");
                internal_error(translate_error.name(), &translate_error.to_string())
            }
        }
    }
}

pub fn data(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    match serde_json::to_value(payload) {
        Ok(value) => json_response(status_code, json!({ "data": value })),
        Err(error) => internal_error("SerializationError", &error.to_string()),
    }
}

pub fn message(status_code: u16, text: &str) -> ApiGatewayResponse {
    json_response(status_code, json!({ "message": text }))
}

pub fn not_found(text: &str) -> ApiGatewayResponse {
    json_response(404, json!({ "Message": text }))
}

pub fn internal_error(name: &str, text: &str) -> ApiGatewayResponse {
    json_response(
        500,
        json!({
            "error": {
                "name": name,
                "message": text,
            }
        }),
    )
}

fn json_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
