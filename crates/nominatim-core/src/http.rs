//! Blocking HTTP transport with linear retry.
//!
//! The client is built once per session from the server options: connect
//! timeout, bounded redirect following and optional HTTP/HTTPS proxies with
//! basic credentials. A failed request is re-attempted up to `max_retries`
//! times before the last error propagates.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Proxy, StatusCode, Url};

use crate::error::{Error, Result};
use crate::options::ServerOptions;

const USER_AGENT: &str = concat!("nominatim-client/", env!("CARGO_PKG_VERSION"));

pub(crate) struct HttpTransport {
    client: Client,
    attempts: u32,
}

impl HttpTransport {
    pub(crate) fn new(options: &ServerOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(options.connect_timeout))
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects as usize))
            .user_agent(USER_AGENT);

        if let Some(proxy_url) = &options.http_proxy {
            builder = builder.proxy(with_credentials(Proxy::http(proxy_url)?, options));
        }
        if let Some(proxy_url) = &options.https_proxy {
            builder = builder.proxy(with_credentials(Proxy::https(proxy_url)?, options));
        }

        Ok(Self {
            client: builder.build()?,
            attempts: total_attempts(options.max_retries),
        })
    }

    /// Perform a GET request and return the XML response body.
    ///
    /// Retry is linear: the first attempt plus up to `max_retries`
    /// re-attempts, each logged as a warning.
    pub(crate) fn get_xml(&self, url: Url, accept_language: &str) -> Result<String> {
        let attempts = self.attempts;

        for attempt in 1..=attempts {
            let response = self
                .client
                .get(url.clone())
                .header(ACCEPT_LANGUAGE, accept_language)
                .send();

            match response {
                Ok(response) => {
                    let status = response.status();

                    if !status.is_success() {
                        if attempt < attempts && is_retryable_status(status) {
                            warn!(
                                "request to '{url}' failed with status {status} \
                                 (attempt {attempt}/{attempts})"
                            );
                            continue;
                        }
                        return Err(Error::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    check_content_type(&response)?;

                    debug!("GET {url} -> {status}");
                    return Ok(response.text()?);
                }
                Err(error) => {
                    if attempt < attempts {
                        warn!(
                            "request to '{url}' failed: {error} (attempt {attempt}/{attempts})"
                        );
                        continue;
                    }
                    return Err(Error::RetriesExhausted {
                        url: url.to_string(),
                        attempts,
                        source: error,
                    });
                }
            }
        }

        unreachable!("retry loop always returns")
    }
}

/// Total request attempts for a retry budget: the first attempt plus the
/// re-attempts, saturating so an extreme retry option cannot overflow.
fn total_attempts(max_retries: u32) -> u32 {
    max_retries.saturating_add(1)
}

fn with_credentials(proxy: Proxy, options: &ServerOptions) -> Proxy {
    match (&options.proxy_user, &options.proxy_user_password) {
        (Some(user), Some(password)) => proxy.basic_auth(user, password),
        (Some(user), None) => proxy.basic_auth(user, ""),
        _ => proxy,
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Anything other than `text/xml` (charset suffix allowed) is rejected
/// before parsing is attempted.
fn check_content_type(response: &reqwest::blocking::Response) -> Result<()> {
    let Some(value) = response.headers().get(CONTENT_TYPE) else {
        return Ok(());
    };
    let value = value.to_str().unwrap_or_default();

    if value.starts_with("text/xml") || value.starts_with("application/xml") {
        Ok(())
    } else {
        Err(Error::UnsupportedContentType(value.to_string()))
    }
}
