use aws_config::{BehaviorVersion, Region, SdkConfig};
use movies_api_core::contract::DEFAULT_SOURCE_LANGUAGE;
use movies_api_core::tables::TableLayout;
use thiserror::Error;

pub const MOVIES_TABLE_VAR: &str = "MOVIES_TABLE";
pub const REVIEWS_TABLE_VAR: &str = "REVIEWS_TABLE";
pub const CAST_TABLE_VAR: &str = "CAST_TABLE";
pub const REVIEWER_INDEX_VAR: &str = "REVIEWER_INDEX";
pub const ROLE_INDEX_VAR: &str = "ROLE_INDEX";
pub const SOURCE_LANGUAGE_VAR: &str = "TRANSLATE_SOURCE_LANGUAGE";
pub const REGION_VAR: &str = "REGION";
pub const DYNAMODB_ENDPOINT_VAR: &str = "DYNAMODB_ENDPOINT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is set but blank")]
    Blank(&'static str),
}

/// Settings read once at cold start.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub tables: TableLayout,
    pub source_language: String,
    pub region: Option<String>,
    pub dynamodb_endpoint: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tables: TableLayout::default(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            region: None,
            dynamodb_endpoint: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(value) if value.trim().is_empty() => Err(ConfigError::Blank(name)),
                Some(value) => Ok(Some(value.trim().to_string())),
            }
        };

        let mut config = Self::default();
        if let Some(name) = read(MOVIES_TABLE_VAR)? {
            config.tables.movies = name;
        }
        if let Some(name) = read(REVIEWS_TABLE_VAR)? {
            config.tables.reviews = name;
        }
        if let Some(name) = read(CAST_TABLE_VAR)? {
            config.tables.cast = name;
        }
        if let Some(name) = read(REVIEWER_INDEX_VAR)? {
            config.tables.reviewer_index = name;
        }
        if let Some(name) = read(ROLE_INDEX_VAR)? {
            config.tables.role_index = name;
        }
        if let Some(language) = read(SOURCE_LANGUAGE_VAR)? {
            config.source_language = language;
        }
        config.region = read(REGION_VAR)?;
        config.dynamodb_endpoint = read(DYNAMODB_ENDPOINT_VAR)?;
        Ok(config)
    }

    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }
}
