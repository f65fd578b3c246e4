//! stac-ingest Config
//!
//! This crate contains the serializable input types for the pipeline stages
//! and the configuration each stage is constructed with.
//!
//! Inputs arrive as loosely-typed JSON:
//! - a granule query for the catalog query stage
//! - a queue batch event (`{"Records": [{"body": ...}]}`) for the NDJSON builder
//!
//! Both are parsed into the strongly-typed structs below and validated at the
//! boundary, so the stages themselves never see a half-formed request.

mod error;
mod event;
mod pipeline;
mod query;

pub use error::ConfigError;
pub use event::{QueueEvent, QueueRecord};
pub use pipeline::{
  AwsConfig, BuilderConfig, CatalogConfig, DEFAULT_CMR_SEARCH_URL, DEFAULT_PAGE_SIZE,
  DEFAULT_PROTECTED_BUCKET, NDJSON_CONTENT_TYPE,
};
pub use query::{BoundingBox, GranuleQuery, QueryOverrides, parse_timestamp};
