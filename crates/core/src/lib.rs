//! Rust client for the [CREODIAS EO Finder](https://creodias.eu/eo-data-finder-api-manual) search API.
//!
//! The EO Finder is a [resto](https://github.com/jjrom/resto) catalog of
//! satellite imagery. This crate **is**:
//!
//! - An encoder for search parameters (dates, well-known text geometries, and
//!   any other filter the API supports)
//! - A paging client that collects every result of a search
//!
//! This crate **is not**:
//!
//! - A downloader, or an authenticated client of any kind
//!
//! # Searching
//!
//! Build a [Query], then run it with a [Client] or with [query]:
//!
//! ```no_run
//! use creodias_finder::Query;
//!
//! let query = Query::new()
//!     .collection("Sentinel2")
//!     .start_date("2021-06-01")
//!     .end_date("2021-06-30")
//!     .geometry("POLYGON ((-9.2 38.6, -9.0 38.6, -9.0 38.8, -9.2 38.6))")
//!     .filter("productType", "L1C")
//!     .filter("cloudCover", (0, 20));
//! let products = creodias_finder::query(&query).unwrap();
//! println!("found {} products", products.len());
//! ```
//!
//! Results are returned as one [Products] map, keyed by product id. Pages are
//! requested until one comes back empty. A failed page fails the whole search.
//!
//! # Encoding
//!
//! Each piece of the query string can be encoded on its own:
//!
//! ```
//! use creodias_finder::{FilterValue, encode_geometry, end_of_day, normalize_date};
//!
//! assert_eq!(encode_geometry("POINT (1 2)").unwrap(), "POINT(1+2)");
//! assert_eq!(FilterValue::from("a b").encode(), "a\\ b");
//! let end = end_of_day(normalize_date("2021-01-01").unwrap());
//! assert_eq!(end.isoformat(), "2021-01-01T23:59:59");
//! ```

#![warn(missing_docs, unused_qualifications)]

mod client;
mod config;
mod date;
mod error;
mod filter;
mod geometry;
mod query;

pub use {
    client::{Client, Feature, HttpResponse, Products, Transport, query},
    config::{API_URL, Config, MAX_PAGES, MAX_RECORDS},
    date::{DateInput, Timestamp, end_of_day, normalize_date},
    error::Error,
    filter::{FilterValue, encode_filter_value},
    geometry::{encode_geometry, encode_geometry_value},
    query::{EncodedQuery, Query},
};

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns a string suitable for use as a HTTP user agent.
pub fn user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

