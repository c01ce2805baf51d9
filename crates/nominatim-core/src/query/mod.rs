//! Request parameters and query-string assembly.

mod build;
mod params;

pub use params::{LookupParams, PlaceDetails, ReverseParams, SearchParams};

pub(crate) use build::{effective_language, lookup_url, reverse_url, search_url};
