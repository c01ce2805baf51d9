//! Server-level connection options and their allow-list validation.
//!
//! The option catalog mirrors what a foreign-server definition would carry:
//! a base URL plus transport tuning (timeout, retries, redirects, proxies)
//! and a default `Accept-Language`. [`ServerOptions::from_pairs`] validates
//! raw name/value pairs against the catalog before anything touches the
//! network.

use reqwest::Url;

use crate::error::{Error, Result};

pub const OPTION_URL: &str = "url";
pub const OPTION_FORMAT: &str = "format";
pub const OPTION_CONNECT_TIMEOUT: &str = "connect_timeout";
pub const OPTION_MAX_CONNECT_RETRY: &str = "max_connect_retry";
pub const OPTION_MAX_REDIRECT: &str = "max_connect_redirect";
pub const OPTION_HTTP_PROXY: &str = "http_proxy";
pub const OPTION_HTTPS_PROXY: &str = "https_proxy";
pub const OPTION_PROXY_USER: &str = "proxy_user";
pub const OPTION_PROXY_USER_PASSWORD: &str = "proxy_user_password";
pub const OPTION_ACCEPT_LANGUAGE: &str = "accept_language";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_REDIRECTS: u32 = 1;
pub const DEFAULT_FORMAT: &str = "xml";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// One entry of the option allow-list.
struct OptionDef {
    name: &'static str,
    required: bool,
}

/// Options accepted at the server level. Anything else is rejected.
const VALID_OPTIONS: &[OptionDef] = &[
    OptionDef { name: OPTION_URL, required: true },
    OptionDef { name: OPTION_FORMAT, required: false },
    OptionDef { name: OPTION_HTTP_PROXY, required: false },
    OptionDef { name: OPTION_HTTPS_PROXY, required: false },
    OptionDef { name: OPTION_PROXY_USER, required: false },
    OptionDef { name: OPTION_PROXY_USER_PASSWORD, required: false },
    OptionDef { name: OPTION_CONNECT_TIMEOUT, required: false },
    OptionDef { name: OPTION_MAX_CONNECT_RETRY, required: false },
    OptionDef { name: OPTION_MAX_REDIRECT, required: false },
    OptionDef { name: OPTION_ACCEPT_LANGUAGE, required: false },
];

/// Connection settings for a Nominatim server.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Base URL of the Nominatim instance, e.g. `https://nominatim.openstreetmap.org`.
    pub url: String,
    /// Response format requested from the server. Only `xml` is parsed.
    pub format: String,
    /// Connect timeout in seconds.
    pub connect_timeout: u64,
    /// Number of re-attempts after a failed request.
    pub max_retries: u32,
    /// Redirect hops the client may follow.
    pub max_redirects: u32,
    /// HTTP proxy URL, if requests must go through one.
    pub http_proxy: Option<String>,
    /// HTTPS proxy URL, if requests must go through one.
    pub https_proxy: Option<String>,
    /// User name for proxy authentication.
    pub proxy_user: Option<String>,
    /// Password for proxy authentication.
    pub proxy_user_password: Option<String>,
    /// Default `Accept-Language` sent with every request.
    pub accept_language: String,
}

impl ServerOptions {
    /// Options for the given base URL with all defaults in place.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: DEFAULT_FORMAT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            http_proxy: None,
            https_proxy: None,
            proxy_user: None,
            proxy_user_password: None,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }

    /// Validate raw name/value pairs against the option catalog and build
    /// the settings struct.
    ///
    /// Rejects unknown option names, empty values, URLs that do not parse
    /// and numeric options that are not non-negative integers. The `url`
    /// option is mandatory.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::new(String::new());
        let mut found: Vec<&'static str> = Vec::new();

        for (name, value) in pairs {
            let def = VALID_OPTIONS
                .iter()
                .find(|def| def.name == name)
                .ok_or_else(|| Error::UnknownOption(name.to_string()))?;

            if value.is_empty() {
                return Err(Error::InvalidOptionValue {
                    option: def.name,
                    reason: "empty value".to_string(),
                });
            }

            found.push(def.name);

            match def.name {
                OPTION_URL => {
                    check_url(def.name, value)?;
                    options.url = value.to_string();
                }
                OPTION_FORMAT => options.format = value.to_string(),
                OPTION_HTTP_PROXY => {
                    check_url(def.name, value)?;
                    options.http_proxy = Some(value.to_string());
                }
                OPTION_HTTPS_PROXY => {
                    check_url(def.name, value)?;
                    options.https_proxy = Some(value.to_string());
                }
                OPTION_PROXY_USER => options.proxy_user = Some(value.to_string()),
                OPTION_PROXY_USER_PASSWORD => {
                    options.proxy_user_password = Some(value.to_string());
                }
                OPTION_CONNECT_TIMEOUT => {
                    options.connect_timeout = parse_number(def.name, value)?;
                }
                OPTION_MAX_CONNECT_RETRY => {
                    options.max_retries = parse_number(def.name, value)?;
                }
                OPTION_MAX_REDIRECT => {
                    options.max_redirects = parse_number(def.name, value)?;
                }
                OPTION_ACCEPT_LANGUAGE => options.accept_language = value.to_string(),
                _ => unreachable!("catalog entry without a handler"),
            }
        }

        for def in VALID_OPTIONS {
            if def.required && !found.contains(&def.name) {
                return Err(Error::MissingOption(def.name));
            }
        }

        Ok(options)
    }
}

fn check_url(option: &'static str, value: &str) -> Result<()> {
    Url::parse(value).map_err(|e| Error::InvalidOptionValue {
        option,
        reason: format!("'{value}' is not a valid URL: {e}"),
    })?;
    Ok(())
}

fn parse_number<T: std::str::FromStr>(option: &'static str, value: &str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidOptionValue {
        option,
        reason: format!("'{value}' is not a non-negative integer"),
    })
}
