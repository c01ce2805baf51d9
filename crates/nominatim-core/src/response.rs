//! XML response parsing.
//!
//! Walks the `<searchresults>`/`<lookupresults>` and `<reversegeocode>`
//! trees and copies attributes and child-element text into flat
//! [`PlaceRecord`]s. Nested tag containers (`extratags`, `namedetails`,
//! `addressparts` and the loose address components of a search result) are
//! folded into JSON objects via `serde_json`, so keys and values are
//! properly escaped.

use roxmltree::{Document, Node};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::PlaceRecord;

/// Parse a search or lookup response into one record per `<place>` element.
pub fn parse_search(xml: &str) -> Result<Vec<PlaceRecord>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    check_for_error(root)?;

    let mut records = Vec::new();

    for place in element_children(root).filter(|n| n.has_tag_name("place")) {
        let mut record = record_from_attributes(place);

        record.display_name = attr(place, "display_name");
        record.display_rank = attr(place, "display_rank");
        record.timestamp = attr(root, "timestamp");
        record.attribution = attr(root, "attribution");
        record.querystring = attr(root, "querystring");
        record.more_url = attr(root, "more_url");
        record.exclude_place_ids = attr(root, "exclude_place_ids");

        let mut extratags = Map::new();
        let mut namedetails = Map::new();
        let mut addressdetails = Map::new();

        for child in element_children(place) {
            match child.tag_name().name() {
                "extratags" => collect_keyed_tags(child, &mut extratags),
                "namedetails" => collect_named_tags(child, &mut namedetails),
                "geokml" => record.polygon = Some(inner_xml(xml, child)),
                // loose children of <place> are the address components
                // delivered with addressdetails=1
                name => {
                    addressdetails.insert(name.to_string(), text_value(child));
                }
            }
        }

        record.extratags = Some(Value::Object(extratags).to_string());
        record.namedetails = Some(Value::Object(namedetails).to_string());
        record.addressdetails = Some(Value::Object(addressdetails).to_string());

        records.push(record);
    }

    Ok(records)
}

/// Parse a reverse geocoding response. A successful response carries exactly
/// one `<result>`, so at most one record comes back.
pub fn parse_reverse(xml: &str) -> Result<Vec<PlaceRecord>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    check_for_error(root)?;

    let mut record = PlaceRecord {
        timestamp: attr(root, "timestamp"),
        attribution: attr(root, "attribution"),
        querystring: attr(root, "querystring"),
        ..PlaceRecord::default()
    };

    let mut extratags = Map::new();
    let mut namedetails = Map::new();
    let mut addressparts = Map::new();
    let mut found_result = false;

    for child in element_children(root) {
        match child.tag_name().name() {
            "result" => {
                found_result = true;
                let envelope = std::mem::take(&mut record);
                record = record_from_attributes(child);
                record.timestamp = envelope.timestamp;
                record.attribution = envelope.attribution;
                record.querystring = envelope.querystring;
                record.result = child.text().map(str::to_string);
            }
            "addressparts" => {
                for tag in element_children(child) {
                    addressparts.insert(tag.tag_name().name().to_string(), text_value(tag));
                }
            }
            "extratags" => collect_keyed_tags(child, &mut extratags),
            "namedetails" => collect_named_tags(child, &mut namedetails),
            _ => {}
        }
    }

    if !found_result {
        return Ok(Vec::new());
    }

    record.extratags = Some(Value::Object(extratags).to_string());
    record.namedetails = Some(Value::Object(namedetails).to_string());
    record.addressparts = Some(Value::Object(addressparts).to_string());

    Ok(vec![record])
}

/// Attributes common to `<place>` and `<result>` elements.
fn record_from_attributes(node: Node) -> PlaceRecord {
    PlaceRecord {
        place_id: attr(node, "place_id"),
        osm_type: attr(node, "osm_type"),
        osm_id: attr(node, "osm_id"),
        r#ref: attr(node, "ref"),
        class: attr(node, "class"),
        r#type: attr(node, "type"),
        place_rank: attr(node, "place_rank"),
        address_rank: attr(node, "address_rank"),
        lat: attr(node, "lat"),
        lon: attr(node, "lon"),
        boundingbox: attr(node, "boundingbox"),
        importance: attr(node, "importance"),
        icon: attr(node, "icon"),
        polygon: polygon_attr(node),
        ..PlaceRecord::default()
    }
}

/// Whichever polygon attribute the server attached, if any.
fn polygon_attr(node: Node) -> Option<String> {
    attr(node, "geotext")
        .or_else(|| attr(node, "geojson"))
        .or_else(|| attr(node, "geosvg"))
}

/// `<tag key="..." value="..."/>` children (extratags).
fn collect_keyed_tags(container: Node, out: &mut Map<String, Value>) {
    for tag in element_children(container) {
        if let Some(key) = tag.attribute("key") {
            out.insert(
                key.to_string(),
                Value::String(tag.attribute("value").unwrap_or_default().to_string()),
            );
        }
    }
}

/// `<name desc="...">text</name>` children (namedetails).
fn collect_named_tags(container: Node, out: &mut Map<String, Value>) {
    for tag in element_children(container) {
        if let Some(desc) = tag.attribute("desc") {
            out.insert(desc.to_string(), text_value(tag));
        }
    }
}

/// Errors come in two shapes: a standalone `<error>` document with `<code>`
/// and `<message>` children, or a bare `<error>text</error>` child of
/// `<reversegeocode>`.
fn check_for_error(root: Node) -> Result<()> {
    let error = if root.has_tag_name("error") {
        Some(root)
    } else {
        element_children(root).find(|n| n.has_tag_name("error"))
    };

    let Some(error) = error else {
        return Ok(());
    };

    let code = element_children(error)
        .find(|n| n.has_tag_name("code"))
        .and_then(|n| n.text())
        .map(str::to_string);
    let message = element_children(error)
        .find(|n| n.has_tag_name("message"))
        .and_then(|n| n.text())
        .or_else(|| error.text())
        .unwrap_or("unknown error")
        .to_string();

    Err(Error::Server { code, message })
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn attr(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn text_value(node: Node) -> Value {
    Value::String(node.text().unwrap_or_default().to_string())
}

/// Verbatim markup of a node's element children, for `geokml` payloads.
fn inner_xml(source: &str, node: Node) -> String {
    element_children(node)
        .map(|child| &source[child.range()])
        .collect()
}
