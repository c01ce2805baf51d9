//! CLI for querying Nominatim through nominatim-core.
//!
//! Server settings come from the environment (`NOMINATIM_URL` at minimum),
//! request parameters from the command line. One JSON document is printed
//! per record.
//!
//! ```bash
//! NOMINATIM_URL=https://nominatim.openstreetmap.org \
//!     nominatim search "Prinzipalmarkt 10, Münster" --addressdetails
//! nominatim reverse 51.9616 7.6284 --zoom 18
//! nominatim lookup R146656,W104393803 --extratags
//! ```

use std::env;

use anyhow::{bail, Context, Result};
use nominatim_core::{
    NominatimClient, PolygonFormat, ReverseParams, SearchParams, ServerOptions,
};

const DEFAULT_URL: &str = "https://nominatim.openstreetmap.org";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    let Some(command) = args.first() else {
        print_usage();
        bail!("missing command");
    };

    let client = NominatimClient::new(server_options_from_env()?)
        .context("failed to set up HTTP client")?;

    let records = match command.as_str() {
        "search" => run_search(&client, &args[1..])?,
        "reverse" => run_reverse(&client, &args[1..])?,
        "lookup" => run_lookup(&client, &args[1..])?,
        "version" => {
            println!("{}", nominatim_core::version());
            return Ok(());
        }
        other => {
            print_usage();
            bail!("unknown command '{other}'");
        }
    };

    for record in &records {
        println!("{}", serde_json::to_string_pretty(record)?);
    }
    eprintln!("{} record(s)", records.len());

    Ok(())
}

/// Server options from `NOMINATIM_*` environment variables, validated
/// through the regular option catalog.
fn server_options_from_env() -> Result<ServerOptions> {
    let vars = [
        ("url", "NOMINATIM_URL"),
        ("format", "NOMINATIM_FORMAT"),
        ("connect_timeout", "NOMINATIM_CONNECT_TIMEOUT"),
        ("max_connect_retry", "NOMINATIM_MAX_RETRY"),
        ("max_connect_redirect", "NOMINATIM_MAX_REDIRECT"),
        ("http_proxy", "NOMINATIM_HTTP_PROXY"),
        ("https_proxy", "NOMINATIM_HTTPS_PROXY"),
        ("proxy_user", "NOMINATIM_PROXY_USER"),
        ("proxy_user_password", "NOMINATIM_PROXY_USER_PASSWORD"),
        ("accept_language", "NOMINATIM_ACCEPT_LANGUAGE"),
    ];

    let mut pairs: Vec<(&str, String)> = vec![(
        "url",
        env::var("NOMINATIM_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
    )];
    for (option, var) in vars.into_iter().skip(1) {
        if let Ok(value) = env::var(var) {
            pairs.push((option, value));
        }
    }

    let options =
        ServerOptions::from_pairs(pairs.iter().map(|(name, value)| (*name, value.as_str())))?;
    Ok(options)
}

fn run_search(
    client: &NominatimClient,
    args: &[String],
) -> Result<Vec<nominatim_core::PlaceRecord>> {
    let mut params = SearchParams::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--amenity" => params.amenity = Some(take_value(&mut iter, arg)?),
            "--street" => params.street = Some(take_value(&mut iter, arg)?),
            "--city" => params.city = Some(take_value(&mut iter, arg)?),
            "--county" => params.county = Some(take_value(&mut iter, arg)?),
            "--state" => params.state = Some(take_value(&mut iter, arg)?),
            "--country" => params.country = Some(take_value(&mut iter, arg)?),
            "--postalcode" => params.postalcode = Some(take_value(&mut iter, arg)?),
            "--countrycodes" => params.countrycodes = Some(take_value(&mut iter, arg)?),
            "--layer" => params.layer = Some(take_value(&mut iter, arg)?),
            "--viewbox" => params.viewbox = Some(take_value(&mut iter, arg)?),
            "--bounded" => params.bounded = true,
            "--dedupe" => params.dedupe = true,
            "--limit" => params.limit = take_value(&mut iter, arg)?.parse()?,
            "--offset" => params.offset = take_value(&mut iter, arg)?.parse()?,
            _ if arg.starts_with("--") => {
                apply_detail_flag(&mut params.details, arg, &mut iter)?
            }
            query => {
                if params.query.is_some() {
                    bail!("only one free-form query is allowed");
                }
                params.query = Some(query.to_string());
            }
        }
    }

    Ok(client.search(&params)?)
}

fn run_reverse(
    client: &NominatimClient,
    args: &[String],
) -> Result<Vec<nominatim_core::PlaceRecord>> {
    let mut positional = Vec::new();
    let mut params = ReverseParams::new(0.0, 0.0);
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--zoom" => params.zoom = Some(take_value(&mut iter, arg)?.parse()?),
            "--layer" => params.layer = Some(take_value(&mut iter, arg)?),
            _ if arg.starts_with("--") => {
                apply_detail_flag(&mut params.details, arg, &mut iter)?
            }
            value => positional.push(value),
        }
    }

    let [lat, lon] = positional.as_slice() else {
        bail!("reverse expects exactly two positional arguments: <lat> <lon>");
    };
    params.lat = lat.parse().context("latitude is not a number")?;
    params.lon = lon.parse().context("longitude is not a number")?;

    Ok(client.reverse(&params)?)
}

fn run_lookup(
    client: &NominatimClient,
    args: &[String],
) -> Result<Vec<nominatim_core::PlaceRecord>> {
    let mut params = nominatim_core::LookupParams::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--countrycodes" => params.countrycodes = Some(take_value(&mut iter, arg)?),
            "--layer" => params.layer = Some(take_value(&mut iter, arg)?),
            _ if arg.starts_with("--") => {
                apply_detail_flag(&mut params.details, arg, &mut iter)?
            }
            ids => {
                if !params.osm_ids.is_empty() {
                    bail!("OSM ids must be passed as one comma-separated argument");
                }
                params.osm_ids = ids.to_string();
            }
        }
    }

    Ok(client.lookup(&params)?)
}

fn apply_detail_flag<'a, I>(
    details: &mut nominatim_core::PlaceDetails,
    arg: &str,
    iter: &mut std::iter::Peekable<I>,
) -> Result<()>
where
    I: Iterator<Item = &'a String>,
{
    match arg {
        "--extratags" => details.extratags = true,
        "--namedetails" => details.namedetails = true,
        "--addressdetails" => details.addressdetails = true,
        "--polygon" => {
            let format: PolygonFormat = take_value(iter, arg)?.parse()?;
            details.polygon = Some(format);
        }
        "--polygon-threshold" => details.polygon_threshold = take_value(iter, arg)?.parse()?,
        "--accept-language" => details.accept_language = Some(take_value(iter, arg)?),
        other => bail!("unknown flag '{other}'"),
    }
    Ok(())
}

fn take_value<'a, I>(iter: &mut std::iter::Peekable<I>, flag: &str) -> Result<String>
where
    I: Iterator<Item = &'a String>,
{
    iter.next()
        .map(|v| v.to_string())
        .with_context(|| format!("flag '{flag}' requires a value"))
}

fn print_usage() {
    eprintln!(
        "usage: nominatim <command> [options]\n\
         \n\
         commands:\n\
         \u{20}  search <query> | --street .. --city .. --country ..   free-form or structured search\n\
         \u{20}  reverse <lat> <lon> [--zoom N]                        reverse geocoding\n\
         \u{20}  lookup <osm_ids>                                      lookup by OSM ids (N../W../R..)\n\
         \u{20}  version                                               print client version\n\
         \n\
         shared flags: --extratags --namedetails --addressdetails\n\
         \u{20}             --polygon <polygon_text|polygon_geojson|polygon_kml|polygon_svg>\n\
         \u{20}             --polygon-threshold <degrees> --accept-language <lang>\n\
         \n\
         server settings come from NOMINATIM_URL and friends (see README)"
    );
}
