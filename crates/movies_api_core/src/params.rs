//! Typed request parameters.
//!
//! Path and query parameters arrive as loose string maps. Everything here is
//! parsed into closed types before a handler touches the store, so an invalid
//! combination never reaches a table call.

use std::collections::BTreeMap;
use std::fmt;

use crate::contract::RequestError;

pub type Parameters = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MovieId(u64);

impl MovieId {
    /// Accepts only a positive base-10 integer; anything else is `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let value = raw?.trim().parse::<u64>().ok()?;
        (value > 0).then_some(Self(value))
    }

    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the `{reviewerName}` path token should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Year,
    Reviewer,
}

impl TokenKind {
    /// Four ASCII digits read as a year, everything else as a reviewer name.
    pub fn infer(token: &str) -> Self {
        if token.len() == 4 && token.bytes().all(|byte| byte.is_ascii_digit()) {
            Self::Year
        } else {
            Self::Reviewer
        }
    }

    fn parse(raw: &str) -> Result<Self, RequestError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "reviewer" => Ok(Self::Reviewer),
            _ => Err(RequestError::invalid("by", raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewQueryParams {
    pub movie_id: MovieId,
    pub min_rating: Option<f64>,
    pub token: Option<String>,
    pub token_kind: Option<TokenKind>,
    pub date: Option<String>,
    pub language: Option<String>,
}

impl ReviewQueryParams {
    pub fn from_parameters(path: &Parameters, query: &Parameters) -> Result<Self, RequestError> {
        let movie_id = MovieId::parse(lookup(path, "movieId")).ok_or(RequestError::MissingMovieId)?;

        let min_rating = match lookup(query, "minRating") {
            Some(raw) => Some(parse_rating(raw)?),
            None => None,
        };
        let token_kind = lookup(query, "by").map(TokenKind::parse).transpose()?;
        let language = lookup(query, "language").map(parse_language).transpose()?;

        Ok(Self {
            movie_id,
            min_rating,
            token: lookup(path, "reviewerName").map(str::to_string),
            token_kind,
            date: lookup(path, "date").map(str::to_string),
            language,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewKeyParams {
    pub movie_id: MovieId,
    pub reviewer_name: String,
}

impl ReviewKeyParams {
    pub fn from_parameters(path: &Parameters) -> Result<Self, RequestError> {
        let movie_id = MovieId::parse(lookup(path, "movieId"));
        let reviewer_name = lookup(path, "reviewerName");
        match (movie_id, reviewer_name) {
            (Some(movie_id), Some(reviewer_name)) => Ok(Self {
                movie_id,
                reviewer_name: reviewer_name.to_string(),
            }),
            _ => Err(RequestError::MissingReviewKey),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastQueryParams {
    pub movie_id: MovieId,
    pub role_name: Option<String>,
    pub actor_name: Option<String>,
    pub include_facts: bool,
}

impl CastQueryParams {
    pub fn from_parameters(query: &Parameters) -> Result<Self, RequestError> {
        let movie_id =
            MovieId::parse(lookup(query, "movieId")).ok_or(RequestError::MissingMovieId)?;
        Ok(Self {
            movie_id,
            role_name: lookup(query, "roleName").map(str::to_string),
            actor_name: lookup(query, "actorName").map(str::to_string),
            include_facts: parse_flag(query, "facts")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieLookupParams {
    pub movie_id: MovieId,
    pub include_cast: bool,
}

impl MovieLookupParams {
    pub fn from_parameters(path: &Parameters, query: &Parameters) -> Result<Self, RequestError> {
        let movie_id = MovieId::parse(lookup(path, "movieId")).ok_or(RequestError::MissingMovieId)?;
        Ok(Self {
            movie_id,
            include_cast: parse_flag(query, "cast")?,
        })
    }
}

/// Non-blank parameter value; blank strings count as absent.
pub fn lookup<'a>(params: &'a Parameters, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn parse_rating(raw: &str) -> Result<f64, RequestError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RequestError::invalid("minRating", raw))
}

fn parse_language(raw: &str) -> Result<String, RequestError> {
    let code = raw.trim();
    let valid = (2..=5).contains(&code.len())
        && code
            .bytes()
            .all(|byte| byte.is_ascii_alphabetic() || byte == b'-');
    if valid {
        Ok(code.to_string())
    } else {
        Err(RequestError::invalid("language", raw))
    }
}

fn parse_flag(params: &Parameters, name: &'static str) -> Result<bool, RequestError> {
    match lookup(params, name) {
        None => Ok(false),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(RequestError::invalid(name, raw)),
        },
    }
}
