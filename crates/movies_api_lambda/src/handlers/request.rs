use movies_api_core::params::Parameters;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The parts of an API Gateway proxy event the handlers read.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiRequest {
    pub http_method: String,
    pub resource: String,
    /// HTTP API events carry `"GET /movies/{movieId}"` instead of method + resource.
    pub route_key: Option<String>,
    #[serde(deserialize_with = "nullable_parameters")]
    pub path_parameters: Parameters,
    #[serde(deserialize_with = "nullable_parameters")]
    pub query_string_parameters: Parameters,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn from_event(event: Value) -> Result<Self, String> {
        if !event.is_object() {
            return Err("Request payload must be a JSON object".to_string());
        }
        serde_json::from_value(event).map_err(|error| format!("Malformed request event: {error}"))
    }

    /// `(METHOD, resource template)`, falling back to the HTTP API route key.
    pub fn route_parts(&self) -> (String, String) {
        if self.resource.is_empty() {
            if let Some((method, resource)) = self
                .route_key
                .as_deref()
                .and_then(|key| key.split_once(' '))
            {
                return (method.to_ascii_uppercase(), resource.to_string());
            }
        }
        (self.http_method.to_ascii_uppercase(), self.resource.clone())
    }

    pub fn path(&self, name: &str) -> Option<&str> {
        movies_api_core::params::lookup(&self.path_parameters, name)
    }
}

fn nullable_parameters<'de, D>(deserializer: D) -> Result<Parameters, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Parameters>::deserialize(deserializer)?.unwrap_or_default())
}
