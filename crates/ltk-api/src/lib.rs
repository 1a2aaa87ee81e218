//! ltk-api
//!
//! Data-fetch boundary for the two paginated timeline sub-collections.
//!
//! This crate owns the source abstraction and the concrete HTTP clients.
//! It does **not** cache or merge; callers hand fetched pages to the cache
//! and merge layers.

mod client;
mod error;
mod source;

pub use client::{EnrollmentsClient, OrdersClient};
pub use error::FetchError;
pub use source::{filter_signature, CollectionSource, SourcePage};
