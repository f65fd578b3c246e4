//! stac-ingest NDJSON
//!
//! The batch builder stage. One invocation takes a batch of item urls and
//! produces one newline-delimited JSON file:
//!
//! ```text
//!   urls ──► ItemLocation::parse ──► spawn one fetch task per url
//!                                         │  ItemSource::fetch
//!                                         │  prepare_item (collection, s3 hrefs)
//!                                         ▼
//!                                    mpsc channel ──► writer task
//!                                                         │
//!   Queue::send(uri) ◄── Store::put(<uuid>.ndjson) ◄──────┘
//! ```
//!
//! The batch is all-or-nothing: a single failed url, or cancellation, aborts
//! every outstanding task and nothing is written or published.

mod aws;
mod builder;
mod error;
mod fetch;
mod item;

pub use aws::{ROLE_SESSION_NAME, assume_role, item_s3_client, s3_client};
pub use builder::{BatchOutput, NdjsonBuilder};
pub use error::{BuildError, FetchError};
pub use fetch::{ItemSource, RemoteItemSource};
pub use item::{Item, parse_item, prepare_item, to_line};
