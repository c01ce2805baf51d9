//! Parameter structs for the search, reverse and lookup endpoints.

use crate::error::{Error, Result};
use crate::types::PolygonFormat;

/// Detail switches shared by all three endpoints.
#[derive(Debug, Clone, Default)]
pub struct PlaceDetails {
    /// Attach OSM extra tags (wiki links, opening hours, ...).
    pub extratags: bool,
    /// Attach localized name variants.
    pub namedetails: bool,
    /// Break the address down into components.
    pub addressdetails: bool,
    /// Polygon output format, if geometry is wanted.
    pub polygon: Option<PolygonFormat>,
    /// Simplification threshold for polygon output, in degrees.
    pub polygon_threshold: f64,
    /// Per-request `Accept-Language`, overriding the server option.
    pub accept_language: Option<String>,
}

/// Parameters for a `search` request: either one free-form query string or
/// any combination of structured address components, never both.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Free-form query (`q`).
    pub query: Option<String>,
    pub amenity: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postalcode: Option<String>,
    /// Comma-separated ISO 3166-1 alpha-2 codes restricting the search.
    pub countrycodes: Option<String>,
    /// Comma-separated result layers (`address`, `poi`, ...).
    pub layer: Option<String>,
    /// Restrict to a feature class (`country`, `state`, `city`, `settlement`).
    pub feature_type: Option<String>,
    /// Place ids to skip, for paging.
    pub exclude_place_ids: Option<String>,
    /// Preferred area as `x1,y1,x2,y2`.
    pub viewbox: Option<String>,
    /// Hard-restrict results to the viewbox.
    pub bounded: bool,
    /// Let the server collapse duplicate results.
    pub dedupe: bool,
    /// Contact address for heavy usage of the public instance.
    pub email: Option<String>,
    /// Maximum number of results; `0` leaves the server default.
    pub limit: u32,
    /// Result offset; `0` leaves the server default.
    pub offset: u32,
    pub details: PlaceDetails,
}

impl SearchParams {
    /// Free-form search for `query`.
    pub fn free_form(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// True when any structured address component is set and non-empty.
    pub fn is_structured(&self) -> bool {
        [
            &self.amenity,
            &self.street,
            &self.city,
            &self.county,
            &self.state,
            &self.country,
            &self.postalcode,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
    }

    /// Reject contradictory or empty requests before they hit the network.
    pub fn validate(&self) -> Result<()> {
        let has_query = self.query.as_deref().is_some_and(|q| !q.is_empty());

        if has_query && self.is_structured() {
            return Err(Error::BadRequest(
                "structured query parameters (amenity, street, city, county, state, \
                 postalcode, country) cannot be used together with the 'q' parameter"
                    .to_string(),
            ));
        }

        if !has_query && !self.is_structured() {
            return Err(Error::BadRequest(
                "nothing to search for: a search request requires either 'q' or one of \
                 the structured query parameters (amenity, street, city, county, state, \
                 postalcode, country)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// Parameters for a `reverse` request.
#[derive(Debug, Clone)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
    /// Detail level of the returned address, 0 (country) to 18 (building).
    pub zoom: Option<u8>,
    /// Comma-separated result layers.
    pub layer: Option<String>,
    pub details: PlaceDetails,
}

impl ReverseParams {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            zoom: None,
            layer: None,
            details: PlaceDetails::default(),
        }
    }
}

/// Parameters for a `lookup` request addressing known OSM objects.
#[derive(Debug, Clone, Default)]
pub struct LookupParams {
    /// Comma-separated OSM ids, each prefixed with its type: `N123,W456,R789`.
    pub osm_ids: String,
    pub countrycodes: Option<String>,
    pub layer: Option<String>,
    pub feature_type: Option<String>,
    pub exclude_place_ids: Option<String>,
    pub viewbox: Option<String>,
    pub bounded: bool,
    pub dedupe: bool,
    pub email: Option<String>,
    pub details: PlaceDetails,
}

impl LookupParams {
    pub fn new(osm_ids: impl Into<String>) -> Self {
        Self {
            osm_ids: osm_ids.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.osm_ids.is_empty() {
            return Err(Error::BadRequest(
                "a lookup request requires at least one OSM id".to_string(),
            ));
        }
        Ok(())
    }
}
