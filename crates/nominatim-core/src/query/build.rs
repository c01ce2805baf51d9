//! Query-string assembly.
//!
//! Every parameter is emitted as a `key=value` pair with percent-encoding
//! handled by [`Url::query_pairs_mut`]. Optional text parameters are skipped
//! when absent or empty; `addressdetails`, `bounded` and `dedupe` are always
//! emitted as `1`/`0`; `extratags` and `namedetails` only when switched on.

use reqwest::Url;

use crate::error::{Error, Result};
use crate::options::{ServerOptions, OPTION_URL};
use crate::query::params::{LookupParams, PlaceDetails, ReverseParams, SearchParams};
use crate::types::Endpoint;

type Pairs = Vec<(&'static str, String)>;

/// Request URL for a search request. Parameters must be validated first.
pub(crate) fn search_url(options: &ServerOptions, params: &SearchParams) -> Result<Url> {
    let mut pairs = Pairs::new();

    push_opt(&mut pairs, "q", params.query.as_deref());
    push_opt(&mut pairs, "amenity", params.amenity.as_deref());
    push_opt(&mut pairs, "street", params.street.as_deref());
    push_opt(&mut pairs, "city", params.city.as_deref());
    push_opt(&mut pairs, "county", params.county.as_deref());
    push_opt(&mut pairs, "state", params.state.as_deref());
    push_opt(&mut pairs, "country", params.country.as_deref());
    push_opt(&mut pairs, "postalcode", params.postalcode.as_deref());

    push_details(&mut pairs, options, &params.details);

    push_opt(&mut pairs, "countrycodes", params.countrycodes.as_deref());
    push_opt(&mut pairs, "layer", params.layer.as_deref());
    push_opt(&mut pairs, "featureType", params.feature_type.as_deref());
    push_opt(&mut pairs, "exclude_place_ids", params.exclude_place_ids.as_deref());
    push_opt(&mut pairs, "viewbox", params.viewbox.as_deref());
    push_flag(&mut pairs, "bounded", params.bounded);
    push_opt(&mut pairs, "email", params.email.as_deref());
    push_flag(&mut pairs, "dedupe", params.dedupe);

    if params.limit > 0 {
        pairs.push(("limit", params.limit.to_string()));
    }
    if params.offset > 0 {
        pairs.push(("offset", params.offset.to_string()));
    }

    build(options, Endpoint::Search, &pairs)
}

/// Request URL for a reverse geocoding request.
pub(crate) fn reverse_url(options: &ServerOptions, params: &ReverseParams) -> Result<Url> {
    let mut pairs = Pairs::new();

    pairs.push(("lat", params.lat.to_string()));
    pairs.push(("lon", params.lon.to_string()));
    if let Some(zoom) = params.zoom {
        pairs.push(("zoom", zoom.to_string()));
    }
    push_opt(&mut pairs, "layer", params.layer.as_deref());

    push_details(&mut pairs, options, &params.details);

    build(options, Endpoint::Reverse, &pairs)
}

/// Request URL for a place lookup request.
pub(crate) fn lookup_url(options: &ServerOptions, params: &LookupParams) -> Result<Url> {
    let mut pairs = Pairs::new();

    pairs.push(("osm_ids", params.osm_ids.clone()));

    push_details(&mut pairs, options, &params.details);

    push_opt(&mut pairs, "countrycodes", params.countrycodes.as_deref());
    push_opt(&mut pairs, "layer", params.layer.as_deref());
    push_opt(&mut pairs, "featureType", params.feature_type.as_deref());
    push_opt(&mut pairs, "exclude_place_ids", params.exclude_place_ids.as_deref());
    push_opt(&mut pairs, "viewbox", params.viewbox.as_deref());
    push_flag(&mut pairs, "bounded", params.bounded);
    push_opt(&mut pairs, "email", params.email.as_deref());
    push_flag(&mut pairs, "dedupe", params.dedupe);

    build(options, Endpoint::Lookup, &pairs)
}

/// `Accept-Language` effective for a request: per-request override first,
/// server option otherwise.
pub(crate) fn effective_language<'a>(options: &'a ServerOptions, details: &'a PlaceDetails) -> &'a str {
    details
        .accept_language
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(&options.accept_language)
}

/// Switches shared by all three endpoints, in a fixed order.
fn push_details(pairs: &mut Pairs, options: &ServerOptions, details: &PlaceDetails) {
    pairs.push(("format", options.format.clone()));

    if details.extratags {
        pairs.push(("extratags", "1".to_string()));
    }
    if details.namedetails {
        pairs.push(("namedetails", "1".to_string()));
    }
    push_flag(pairs, "addressdetails", details.addressdetails);

    if let Some(polygon) = details.polygon {
        pairs.push((polygon.as_query_param(), "1".to_string()));
    }
    if details.polygon_threshold != 0.0 {
        pairs.push(("polygon_threshold", details.polygon_threshold.to_string()));
    }

    pairs.push(("accept-language", effective_language(options, details).to_string()));
}

fn push_opt(pairs: &mut Pairs, key: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            pairs.push((key, value.to_string()));
        }
    }
}

fn push_flag(pairs: &mut Pairs, key: &'static str, value: bool) {
    pairs.push((key, if value { "1" } else { "0" }.to_string()));
}

fn build(options: &ServerOptions, endpoint: Endpoint, pairs: &[(&'static str, String)]) -> Result<Url> {
    let mut url = Url::parse(&options.url).map_err(|e| Error::InvalidOptionValue {
        option: OPTION_URL,
        reason: format!("'{}' is not a valid URL: {e}", options.url),
    })?;

    url.path_segments_mut()
        .map_err(|()| Error::InvalidOptionValue {
            option: OPTION_URL,
            reason: format!("'{}' cannot be used as a base URL", options.url),
        })?
        .pop_if_empty()
        .push(endpoint.path());

    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PolygonFormat;
    use pretty_assertions::assert_eq;

    fn options() -> ServerOptions {
        ServerOptions::new("https://nominatim.example.com")
    }

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn value_of<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn free_form_search_url() {
        let url = search_url(&options(), &SearchParams::free_form("Pognerstraße 13, München"))
            .unwrap();

        assert_eq!(url.path(), "/search");
        let pairs = query_pairs(&url);
        assert_eq!(value_of(&pairs, "q"), Some("Pognerstraße 13, München"));
        assert_eq!(value_of(&pairs, "format"), Some("xml"));
        // spaces and umlauts are percent-encoded on the wire
        assert!(url.as_str().contains("q=Pognerstra%C3%9Fe+13%2C+M%C3%BCnchen"));
    }

    #[test]
    fn structured_search_url() {
        let params = SearchParams {
            street: Some("Pognerstraße 13".to_string()),
            city: Some("München".to_string()),
            country: Some("Germany".to_string()),
            ..SearchParams::default()
        };
        let pairs = query_pairs(&search_url(&options(), &params).unwrap());

        assert_eq!(value_of(&pairs, "street"), Some("Pognerstraße 13"));
        assert_eq!(value_of(&pairs, "city"), Some("München"));
        assert_eq!(value_of(&pairs, "country"), Some("Germany"));
        assert_eq!(value_of(&pairs, "q"), None);
    }

    #[test]
    fn booleans_are_rendered_as_digits() {
        let mut params = SearchParams::free_form("pub");
        params.bounded = true;
        params.details.addressdetails = true;
        let pairs = query_pairs(&search_url(&options(), &params).unwrap());

        assert_eq!(value_of(&pairs, "bounded"), Some("1"));
        assert_eq!(value_of(&pairs, "dedupe"), Some("0"));
        assert_eq!(value_of(&pairs, "addressdetails"), Some("1"));
        // off-by-default switches are omitted entirely
        assert_eq!(value_of(&pairs, "extratags"), None);
        assert_eq!(value_of(&pairs, "namedetails"), None);
    }

    #[test]
    fn limit_and_offset_only_when_positive() {
        let params = SearchParams::free_form("pub");
        let pairs = query_pairs(&search_url(&options(), &params).unwrap());
        assert_eq!(value_of(&pairs, "limit"), None);
        assert_eq!(value_of(&pairs, "offset"), None);

        let mut params = SearchParams::free_form("pub");
        params.limit = 25;
        params.offset = 50;
        let pairs = query_pairs(&search_url(&options(), &params).unwrap());
        assert_eq!(value_of(&pairs, "limit"), Some("25"));
        assert_eq!(value_of(&pairs, "offset"), Some("50"));
    }

    #[test]
    fn polygon_switch_uses_format_name() {
        let mut params = SearchParams::free_form("pub");
        params.details.polygon = Some(PolygonFormat::GeoJson);
        params.details.polygon_threshold = 0.5;
        let pairs = query_pairs(&search_url(&options(), &params).unwrap());

        assert_eq!(value_of(&pairs, "polygon_geojson"), Some("1"));
        assert_eq!(value_of(&pairs, "polygon_threshold"), Some("0.5"));
    }

    #[test]
    fn reverse_url_carries_coordinates() {
        let mut params = ReverseParams::new(51.9624, 7.6256);
        params.zoom = Some(18);
        let url = reverse_url(&options(), &params).unwrap();

        assert_eq!(url.path(), "/reverse");
        let pairs = query_pairs(&url);
        assert_eq!(value_of(&pairs, "lat"), Some("51.9624"));
        assert_eq!(value_of(&pairs, "lon"), Some("7.6256"));
        assert_eq!(value_of(&pairs, "zoom"), Some("18"));
    }

    #[test]
    fn reverse_url_omits_search_only_flags() {
        let pairs = query_pairs(&reverse_url(&options(), &ReverseParams::new(51.9, 7.6)).unwrap());

        // addressdetails is emitted everywhere, bounded/dedupe only where
        // the endpoint accepts them
        assert_eq!(value_of(&pairs, "addressdetails"), Some("0"));
        assert_eq!(value_of(&pairs, "bounded"), None);
        assert_eq!(value_of(&pairs, "dedupe"), None);
        assert_eq!(value_of(&pairs, "limit"), None);
    }

    #[test]
    fn lookup_url_always_emits_its_flags() {
        let pairs = query_pairs(&lookup_url(&options(), &LookupParams::new("R146656")).unwrap());

        assert_eq!(value_of(&pairs, "addressdetails"), Some("0"));
        assert_eq!(value_of(&pairs, "bounded"), Some("0"));
        assert_eq!(value_of(&pairs, "dedupe"), Some("0"));
    }

    #[test]
    fn lookup_url_carries_osm_ids() {
        let url = lookup_url(&options(), &LookupParams::new("R146656,W104393803")).unwrap();
        assert_eq!(url.path(), "/lookup");
        let pairs = query_pairs(&url);
        assert_eq!(value_of(&pairs, "osm_ids"), Some("R146656,W104393803"));
    }

    #[test]
    fn base_url_with_path_keeps_its_prefix() {
        let options = ServerOptions::new("https://example.com/nominatim/");
        let url = search_url(&options, &SearchParams::free_form("pub")).unwrap();
        assert_eq!(url.path(), "/nominatim/search");
    }

    #[test]
    fn per_request_language_overrides_server_option() {
        let mut params = SearchParams::free_form("pub");
        params.details.accept_language = Some("pt-BR".to_string());
        let pairs = query_pairs(&search_url(&options(), &params).unwrap());
        assert_eq!(value_of(&pairs, "accept-language"), Some("pt-BR"));

        let pairs = query_pairs(
            &search_url(&options(), &SearchParams::free_form("pub")).unwrap(),
        );
        assert_eq!(value_of(&pairs, "accept-language"), Some("en-US,en;q=0.9"));
    }
}
