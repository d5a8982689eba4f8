//! Shared movies API domain primitives.
//!
//! This crate owns record shapes, body schemas, typed request parameters and
//! the query-shape selection that turns parameters into a single table
//! lookup. It excludes AWS SDK and Lambda runtime concerns, which live in
//! `movies_api_lambda`.

pub mod contract;
pub mod params;
pub mod query;
pub mod tables;
