//! AWS-oriented adapters and handlers for the movies REST API.
//!
//! This crate owns runtime integration details (the Lambda entry point, API
//! Gateway request/response shapes, DynamoDB and Translate adapters). Query
//! selection and request validation live in `movies_api_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod router;
