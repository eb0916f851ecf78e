use crate::{Config, Error, Query, Result};
use bytes::Bytes;
use http::StatusCode;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A search result record, passed through as returned by the API.
pub type Feature = Map<String, Value>;

/// All features returned by a query, keyed by their id.
///
/// If more than one page returns the same id, the later record wins.
pub type Products = IndexMap<String, Feature>;

/// The raw response to a page request.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The status code.
    pub status: StatusCode,

    /// The body, which should be JSON.
    pub body: Bytes,
}

/// Something that can GET a url.
///
/// This is implemented for [reqwest::blocking::Client]. Implement it yourself
/// to add retries, caching, or to test without a network.
pub trait Transport {
    /// Sends a GET request to the url and returns the response, whatever its
    /// status.
    fn fetch(&self, url: &str) -> Result<HttpResponse>;
}

impl Transport for reqwest::blocking::Client {
    fn fetch(&self, url: &str) -> Result<HttpResponse> {
        let response = self.get(url).send()?;
        let status = response.status();
        let body = response.bytes()?;
        Ok(HttpResponse { status, body })
    }
}

/// One page of search results.
#[derive(Debug, Deserialize)]
struct Page {
    properties: PageProperties,

    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct PageProperties {
    #[serde(rename = "itemsPerPage")]
    items_per_page: u64,

    #[serde(rename = "totalResults")]
    total_results: Option<u64>,
}

/// A client for the EO Finder search API.
///
/// # Examples
///
/// ```no_run
/// use creodias_finder::{Client, Query};
///
/// let client = Client::new().unwrap();
/// let query = Query::new()
///     .collection("Sentinel2")
///     .start_date("2021-06-01")
///     .end_date("2021-06-01");
/// let products = client.search(&query).unwrap();
/// for (id, product) in products {
///     println!("{id}: {}", product["properties"]["title"]);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client<T = reqwest::blocking::Client> {
    config: Config,
    transport: T,
}

impl Client {
    /// Creates a new client with the default configuration.
    pub fn new() -> Result<Client> {
        Client::with_config(Config::default())
    }

    /// Creates a new client that sends requests with [reqwest].
    ///
    /// The configured timeout, if any, is applied to every request.
    pub fn with_config(config: Config) -> Result<Client> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(crate::user_agent());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder.build()?;
        Ok(Client { config, transport })
    }
}

impl<T: Transport> Client<T> {
    /// Creates a new client with a custom transport.
    pub fn with_transport(config: Config, transport: T) -> Client<T> {
        Client { config, transport }
    }

    /// Returns this client's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns this client's transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a query, requesting pages until one comes back empty.
    ///
    /// Pages are requested one after another. Any failure aborts the whole
    /// query, and the features from earlier pages are dropped. If
    /// [Config::max_pages] pages all have items, [Error::QueryTooLarge] is
    /// returned; narrow the query and try again.
    pub fn search(&self, query: &Query) -> Result<Products> {
        let encoded = query.encode(&self.config)?;
        tracing::info!("searching {encoded}");
        let mut products = Products::new();
        for page_number in 1..=self.config.max_pages {
            let page = self.page(&encoded.page_url(page_number))?;
            if page.properties.items_per_page == 0 {
                tracing::debug!(
                    "page {page_number} is empty, returning {} products",
                    products.len()
                );
                return Ok(products);
            }
            tracing::debug!(
                "page {page_number}: {} features (total results: {:?})",
                page.features.len(),
                page.properties.total_results
            );
            for feature in page.features {
                let id = feature
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or(Error::MissingId)?
                    .to_string();
                if let Some(previous) = products.insert(id, feature) {
                    tracing::debug!("replaced duplicate product {}", previous["id"]);
                }
            }
        }
        Err(Error::QueryTooLarge(self.config.max_pages))
    }

    fn page(&self, url: &str) -> Result<Page> {
        let response = self.transport.fetch(url)?;
        if !response.status.is_success() {
            return Err(Error::HttpRequestFailed {
                url: url.to_string(),
                status: response.status,
            });
        }
        serde_json::from_slice(&response.body).map_err(Error::from)
    }
}

/// Runs a query against the EO Finder API with the default configuration.
///
/// # Examples
///
/// ```no_run
/// use creodias_finder::Query;
///
/// let products = creodias_finder::query(
///     &Query::new()
///         .collection("Sentinel1")
///         .start_date("2021-01-01")
///         .end_date("2021-01-02")
///         .filter("productType", "GRD"),
/// )
/// .unwrap();
/// ```
pub fn query(query: &Query) -> Result<Products> {
    Client::new()?.search(query)
}
