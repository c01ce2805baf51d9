//! Session tying options, transport and response parsing together.

use log::debug;

use crate::error::Result;
use crate::http::HttpTransport;
use crate::options::ServerOptions;
use crate::query::{self, LookupParams, ReverseParams, SearchParams};
use crate::types::PlaceRecord;

/// A configured Nominatim session.
///
/// The HTTP client is built once from the [`ServerOptions`]; every call is a
/// single blocking request returning flat [`PlaceRecord`] rows.
pub struct NominatimClient {
    options: ServerOptions,
    transport: HttpTransport,
}

impl NominatimClient {
    pub fn new(options: ServerOptions) -> Result<Self> {
        let transport = HttpTransport::new(&options)?;
        Ok(Self { options, transport })
    }

    /// Convenience constructor with default options for `url`.
    pub fn for_url(url: impl Into<String>) -> Result<Self> {
        Self::new(ServerOptions::new(url))
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Free-form or structured place search.
    pub fn search(&self, params: &SearchParams) -> Result<Vec<PlaceRecord>> {
        params.validate()?;
        let url = query::search_url(&self.options, params)?;
        debug!("search: {url}");

        let body = self.fetch(url, &params.details)?;
        crate::response::parse_search(&body)
    }

    /// Reverse geocoding of a single coordinate. Returns at most one record.
    pub fn reverse(&self, params: &ReverseParams) -> Result<Vec<PlaceRecord>> {
        let url = query::reverse_url(&self.options, params)?;
        debug!("reverse: {url}");

        let body = self.fetch(url, &params.details)?;
        crate::response::parse_reverse(&body)
    }

    /// Address details for up to 50 known OSM objects.
    pub fn lookup(&self, params: &LookupParams) -> Result<Vec<PlaceRecord>> {
        params.validate()?;
        let url = query::lookup_url(&self.options, params)?;
        debug!("lookup: {url}");

        let body = self.fetch(url, &params.details)?;
        crate::response::parse_search(&body)
    }

    fn fetch(&self, url: reqwest::Url, details: &query::PlaceDetails) -> Result<String> {
        let language = query::effective_language(&self.options, details);
        self.transport.get_xml(url, language)
    }
}
