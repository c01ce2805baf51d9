//! Nominatim Client Core
//!
//! Exposes the Nominatim geocoding API (search, reverse and lookup) as flat,
//! tabular records. One blocking HTTP request per call, XML responses walked
//! into [`PlaceRecord`] rows; no caching, no persistent state.

pub mod client;
pub mod error;
pub mod options;
pub mod query;
pub mod response;
pub mod types;

mod http;

pub use client::NominatimClient;
pub use error::{Error, Result};
pub use options::ServerOptions;
pub use query::{LookupParams, PlaceDetails, ReverseParams, SearchParams};
pub use types::{Endpoint, PlaceRecord, PolygonFormat};

/// Version string of the client library.
pub fn version() -> String {
    format!("nominatim-client {}", env!("CARGO_PKG_VERSION"))
}
