//! Flat record and parameter enums shared across the three endpoints.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Which Nominatim endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Search,
    Reverse,
    Lookup,
}

impl Endpoint {
    /// Path segment appended to the server base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Search => "search",
            Endpoint::Reverse => "reverse",
            Endpoint::Lookup => "lookup",
        }
    }
}

/// Polygon output formats Nominatim can attach to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonFormat {
    /// WKT, delivered in the `geotext` attribute.
    Text,
    /// GeoJSON, delivered in the `geojson` attribute.
    GeoJson,
    /// KML, delivered as a nested `geokml` element.
    Kml,
    /// SVG path data, delivered in the `geosvg` attribute.
    Svg,
}

impl PolygonFormat {
    /// Query parameter name switching this output on (`<name>=1`).
    pub fn as_query_param(self) -> &'static str {
        match self {
            PolygonFormat::Text => "polygon_text",
            PolygonFormat::GeoJson => "polygon_geojson",
            PolygonFormat::Kml => "polygon_kml",
            PolygonFormat::Svg => "polygon_svg",
        }
    }
}

impl FromStr for PolygonFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polygon_text" => Ok(PolygonFormat::Text),
            "polygon_geojson" => Ok(PolygonFormat::GeoJson),
            "polygon_kml" => Ok(PolygonFormat::Kml),
            "polygon_svg" => Ok(PolygonFormat::Svg),
            other => Err(Error::BadRequest(format!(
                "invalid polygon type '{other}', expected one of: polygon_text, \
                 polygon_geojson, polygon_kml, polygon_svg"
            ))),
        }
    }
}

impl fmt::Display for PolygonFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_param())
    }
}

/// One row of geocoding output.
///
/// Attribute values are carried verbatim as text, the way the server sends
/// them; fields the response does not mention stay `None`. The four
/// aggregate fields (`extratags`, `namedetails`, `addressdetails`,
/// `addressparts`) hold serialized JSON objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaceRecord {
    pub place_id: Option<String>,
    pub osm_type: Option<String>,
    pub osm_id: Option<String>,
    pub r#ref: Option<String>,
    pub class: Option<String>,
    pub r#type: Option<String>,
    pub display_name: Option<String>,
    pub display_rank: Option<String>,
    pub place_rank: Option<String>,
    pub address_rank: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub boundingbox: Option<String>,
    pub importance: Option<String>,
    pub icon: Option<String>,
    /// Polygon blob in whichever format was requested.
    pub polygon: Option<String>,
    /// JSON object of OSM extra tags.
    pub extratags: Option<String>,
    /// JSON object of localized names.
    pub namedetails: Option<String>,
    /// JSON object of address components (search and lookup responses).
    pub addressdetails: Option<String>,
    /// JSON object of address components (reverse responses).
    pub addressparts: Option<String>,
    /// Display name of a reverse geocoding match.
    pub result: Option<String>,
    /// Query echo from the response envelope.
    pub querystring: Option<String>,
    /// Response generation timestamp from the envelope.
    pub timestamp: Option<String>,
    /// Data attribution notice from the envelope.
    pub attribution: Option<String>,
    /// Place ids to exclude when paging through search results.
    pub exclude_place_ids: Option<String>,
    /// URL for fetching the next page of search results.
    pub more_url: Option<String>,
}
