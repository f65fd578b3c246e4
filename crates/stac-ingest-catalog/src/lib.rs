//! stac-ingest Catalog
//!
//! The catalog query stage: search the CMR catalog for every granule of one
//! collection version in a time range (optionally within a bounding box),
//! pick out the STAC item links, and publish each one to the outbound queue.
//!
//! ```text
//! GranuleQuery ──► GranuleSearch ──► Catalog::search_all ──► item_urls ──► Queue
//!                                    (every page)            (https + stac.json)
//! ```
//!
//! [`Catalog`] is the seam to the remote service; [`CmrClient`] talks to CMR
//! over HTTP and follows its paging headers until the result set is
//! exhausted.

mod client;
mod error;
mod granule;
mod query;
mod search;

pub use client::{Catalog, CmrClient, HITS_HEADER, SEARCH_AFTER_HEADER};
pub use error::CatalogError;
pub use granule::{Granule, Link, is_item_href, item_urls};
pub use query::CatalogQuery;
pub use search::GranuleSearch;
