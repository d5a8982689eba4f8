use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::tables::{COMMENT, MOVIE_ID, RATING, REVIEWER_NAME, REVIEW_DATE};

/// A stored record as a flat JSON object, exactly as the table holds it.
pub type Item = Map<String, Value>;

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub movie_id: u64,
    pub reviewer_name: String,
    pub review_date: String,
    pub rating: f64,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_id: u64,
    pub title: String,
    /// Descriptive attributes (overview, genres, release date, ...) kept as-is.
    #[serde(flatten)]
    pub attributes: Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySchema {
    Review,
    Movie,
}

impl BodySchema {
    pub fn name(self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::Movie => "Movie",
        }
    }

    /// JSON Schema document attached to validation failures.
    pub fn document(self) -> Value {
        match self {
            Self::Review => json!({
                "type": "object",
                "properties": {
                    MOVIE_ID: { "type": "integer", "exclusiveMinimum": 0 },
                    REVIEWER_NAME: { "type": "string", "minLength": 1 },
                    REVIEW_DATE: { "type": "string", "pattern": "^\\d{4}-\\d{2}-\\d{2}$" },
                    RATING: { "type": "number" },
                    COMMENT: { "type": "string" }
                },
                "required": [MOVIE_ID, REVIEWER_NAME, REVIEW_DATE, RATING, COMMENT]
            }),
            Self::Movie => json!({
                "type": "object",
                "properties": {
                    MOVIE_ID: { "type": "integer", "exclusiveMinimum": 0 },
                    "title": { "type": "string", "minLength": 1 }
                },
                "required": [MOVIE_ID, "title"]
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Missing request body")]
    MissingBody,
    #[error("Incorrect type. Must match {} schema", .schema.name())]
    SchemaViolation { schema: BodySchema, detail: String },
    #[error("Missing movie Id")]
    MissingMovieId,
    #[error("Missing movieId or reviewerName")]
    MissingReviewKey,
    #[error("Invalid {name} parameter: {value}")]
    InvalidParameter { name: &'static str, value: String },
}

impl RequestError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    pub fn schema(&self) -> Option<BodySchema> {
        match self {
            Self::SchemaViolation { schema, .. } => Some(*schema),
            _ => None,
        }
    }
}

/// Parses a raw request body as a review and enforces the record invariants.
pub fn parse_review_body(body: Option<&str>) -> Result<Review, RequestError> {
    let review: Review = parse_body(body, BodySchema::Review)?;
    let violation = |detail: &str| RequestError::SchemaViolation {
        schema: BodySchema::Review,
        detail: detail.to_string(),
    };

    if review.movie_id == 0 {
        return Err(violation("movieId must be a positive integer"));
    }
    if review.reviewer_name.trim().is_empty() {
        return Err(violation("reviewerName cannot be empty"));
    }
    if !is_iso_date(&review.review_date) {
        return Err(violation("reviewDate must be formatted as YYYY-MM-DD"));
    }
    if !review.rating.is_finite() {
        return Err(violation("rating must be a finite number"));
    }
    Ok(review)
}

pub fn parse_movie_body(body: Option<&str>) -> Result<Movie, RequestError> {
    let movie: Movie = parse_body(body, BodySchema::Movie)?;
    if movie.movie_id == 0 {
        return Err(RequestError::SchemaViolation {
            schema: BodySchema::Movie,
            detail: "movieId must be a positive integer".to_string(),
        });
    }
    if movie.title.trim().is_empty() {
        return Err(RequestError::SchemaViolation {
            schema: BodySchema::Movie,
            detail: "title cannot be empty".to_string(),
        });
    }
    Ok(movie)
}

fn parse_body<T: DeserializeOwned>(body: Option<&str>, schema: BodySchema) -> Result<T, RequestError> {
    let text = match body {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(RequestError::MissingBody),
    };
    // A body that is not JSON at all counts as missing, like an absent one.
    let value: Value = serde_json::from_str(text).map_err(|_| RequestError::MissingBody)?;
    if value.is_null() {
        return Err(RequestError::MissingBody);
    }
    serde_json::from_value(value).map_err(|error| RequestError::SchemaViolation {
        schema,
        detail: error.to_string(),
    })
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Converts a typed record into the item shape stored in the table.
pub fn to_item(record: &impl Serialize) -> Item {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Item::new(),
    }
}
