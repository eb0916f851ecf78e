use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// The root of the EO Finder collections API.
pub const API_URL: &str = "http://finder.creodias.eu/resto/api/collections/";

/// The number of records requested per page.
pub const MAX_RECORDS: u64 = 1000;

/// The maximum number of pages requested for a single query.
pub const MAX_PAGES: usize = 1000;

/// Configuration for a [Client](crate::Client).
///
/// # Examples
///
/// ```
/// use creodias_finder::Config;
///
/// let config = Config::default();
/// assert_eq!(config.max_records, 1000);
/// let config = Config::new("http://localhost:8080/collections/").unwrap().with_max_pages(10);
/// assert_eq!(config.max_pages, 10);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The collections root of the API.
    pub api_url: Url,

    /// The page size, sent as `maxRecords`.
    pub max_records: u64,

    /// Queries that have not finished after this many pages fail.
    pub max_pages: usize,

    /// The timeout of each page request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl Config {
    /// Creates a new configuration for the given API root.
    pub fn new(api_url: &str) -> Result<Config> {
        Ok(Config {
            api_url: api_url.parse()?,
            ..Default::default()
        })
    }

    /// Sets the page size.
    pub fn with_max_records(mut self, max_records: u64) -> Config {
        self.max_records = max_records;
        self
    }

    /// Sets the page ceiling.
    pub fn with_max_pages(mut self, max_pages: usize) -> Config {
        self.max_pages = max_pages;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Config {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: Url::parse(API_URL).expect("the default api url is valid"),
            max_records: MAX_RECORDS,
            max_pages: MAX_PAGES,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(
            config.api_url.as_str(),
            "http://finder.creodias.eu/resto/api/collections/"
        );
        assert_eq!(config.max_records, 1000);
        assert_eq!(config.max_pages, 1000);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn invalid_url() {
        let _ = Config::new("not a url").unwrap_err();
    }

    #[test]
    fn deserialize_partial() {
        let config: Config = serde_json::from_value(json!({
            "api_url": "http://localhost:1234/",
            "max_pages": 3,
            "timeout": {"secs": 5, "nanos": 0}
        }))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:1234/");
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.max_records, 1000);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
