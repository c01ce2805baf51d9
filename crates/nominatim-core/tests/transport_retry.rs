//! Transport tests against a local stub server.
//!
//! A plain `TcpListener` answers every request with a canned HTTP response
//! and counts accepted connections, which (with `Connection: close`) equals
//! the number of attempts the client made.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use nominatim_core::{Error, NominatimClient, SearchParams, ServerOptions};

const INTERNAL_ERROR: &str =
    "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
const NOT_FOUND: &str =
    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
const REDIRECT: &str =
    "HTTP/1.1 302 Found\r\nLocation: /next\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
const EMPTY_RESULTS: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/xml; charset=utf-8\r\n\
     Connection: close\r\n\r\n<searchresults timestamp=\"t\"></searchresults>";
const HTML_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\
     Connection: close\r\n\r\n<html></html>";

/// Serve `response` to every connection, counting accepts.
fn spawn_stub_server(response: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let addr = listener.local_addr().expect("local addr");
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            counter.fetch_add(1, Ordering::SeqCst);

            // drain the request head before answering
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://{addr}"), connections)
}

fn client_with(url: String, max_retries: u32, max_redirects: u32) -> NominatimClient {
    let mut options = ServerOptions::new(url);
    options.connect_timeout = 5;
    options.max_retries = max_retries;
    options.max_redirects = max_redirects;
    NominatimClient::new(options).expect("client should build")
}

#[test]
fn server_errors_are_retried_first_attempt_plus_max_retries() {
    let (url, connections) = spawn_stub_server(INTERNAL_ERROR);
    let client = client_with(url, 2, 1);

    let err = client
        .search(&SearchParams::free_form("pub"))
        .expect_err("persistent 500 must fail");

    match err {
        Error::HttpStatus { status, .. } => assert_eq!(status, 500),
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    // 1 first attempt + 2 re-attempts
    assert_eq!(connections.load(Ordering::SeqCst), 3);
}

#[test]
fn client_errors_fail_without_retry() {
    let (url, connections) = spawn_stub_server(NOT_FOUND);
    let client = client_with(url, 3, 1);

    let err = client
        .search(&SearchParams::free_form("pub"))
        .expect_err("404 must fail");

    match err {
        Error::HttpStatus { status, .. } => assert_eq!(status, 404),
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[test]
fn redirects_are_followed_up_to_the_configured_cap() {
    let (url, connections) = spawn_stub_server(REDIRECT);
    let client = client_with(url, 0, 1);

    let err = client
        .search(&SearchParams::free_form("pub"))
        .expect_err("redirect loop must fail");

    match err {
        Error::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 1),
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    // initial request plus exactly one followed redirect
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}

#[test]
fn successful_xml_response_round_trips() {
    let (url, connections) = spawn_stub_server(EMPTY_RESULTS);
    let client = client_with(url, 0, 1);

    let records = client.search(&SearchParams::free_form("pub")).unwrap();

    assert!(records.is_empty());
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[test]
fn non_xml_content_type_is_rejected() {
    let (url, _connections) = spawn_stub_server(HTML_PAGE);
    let client = client_with(url, 0, 1);

    let err = client
        .search(&SearchParams::free_form("pub"))
        .expect_err("HTML must be rejected");

    match err {
        Error::UnsupportedContentType(value) => assert!(value.starts_with("text/html")),
        other => panic!("expected UnsupportedContentType, got {other:?}"),
    }
}
