//! stac-ingest Href
//!
//! Pure helpers shared by the pipeline stages:
//!
//! - [`ItemLocation`] classifies an item URL as HTTP(S) or object storage and
//!   rejects every other scheme.
//! - [`derive_collection`] infers the collection id from an item URL's layout.
//! - [`rewrite_protected_href`] turns gateway links into the protected bucket
//!   into direct `s3://` links.
//!
//! Nothing here performs I/O.

mod asset;
mod collection;
mod error;
mod location;

pub use asset::{rewrite_assets, rewrite_protected_href};
pub use collection::derive_collection;
pub use error::HrefError;
pub use location::ItemLocation;
