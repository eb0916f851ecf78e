use crate::{Config, DateInput, FilterValue, Result, encode_geometry, end_of_day, normalize_date};
use std::{collections::BTreeMap, fmt::Display};

/// The parameters of an EO Finder search.
///
/// # Examples
///
/// ```
/// use creodias_finder::{Config, Query};
///
/// let query = Query::new()
///     .collection("Sentinel2")
///     .start_date("2021-06-01")
///     .end_date("2021-06-02")
///     .filter("productType", "L1C")
///     .filter("cloudCover", (0, 20));
/// let encoded = query.encode(&Config::default()).unwrap();
/// assert_eq!(
///     encoded.url(),
///     "http://finder.creodias.eu/resto/api/collections/Sentinel2/search.json?\
///      &startDate=2021-06-01T00:00:00&completionDate=2021-06-02T23:59:59\
///      &cloudCover=[0,20]&productType=L1C&maxRecords=1000"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct Query {
    /// The data collection, e.g. `Sentinel2`.
    pub collection: Option<String>,

    /// The start of the observations.
    pub start_date: Option<DateInput>,

    /// The end of the observations.
    ///
    /// If there's no time of day, 23:59:59 is used so the whole day is
    /// included.
    pub end_date: Option<DateInput>,

    /// The area of interest, as well-known text.
    pub geometry: Option<String>,

    /// Any other query parameters, e.g. `productType`.
    pub filters: BTreeMap<String, FilterValue>,
}

/// A query encoded into an ordered list of query string parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedQuery {
    base: String,
    fragments: Vec<(String, String)>,
}

impl Query {
    /// Creates a new, empty query.
    pub fn new() -> Query {
        Query::default()
    }

    /// Sets the collection of this query.
    pub fn collection(mut self, collection: impl ToString) -> Query {
        self.collection = Some(collection.to_string());
        self
    }

    /// Sets the start date of this query.
    pub fn start_date(mut self, start_date: impl Into<DateInput>) -> Query {
        self.start_date = Some(start_date.into());
        self
    }

    /// Sets the end date of this query.
    pub fn end_date(mut self, end_date: impl Into<DateInput>) -> Query {
        self.end_date = Some(end_date.into());
        self
    }

    /// Sets the geometry of this query.
    pub fn geometry(mut self, geometry: impl ToString) -> Query {
        self.geometry = Some(geometry.to_string());
        self
    }

    /// Adds an additional filter, replacing any previous value for this key.
    pub fn filter(mut self, key: impl ToString, value: impl Into<FilterValue>) -> Query {
        let _ = self.filters.insert(key.to_string(), value.into());
        self
    }

    /// Validates and encodes this query.
    ///
    /// Parameters always come out in the same order: `startDate`,
    /// `completionDate`, `geometry`, the filters sorted by key, and
    /// `maxRecords`. Empty strings are treated as missing parameters.
    pub fn encode(&self, config: &Config) -> Result<EncodedQuery> {
        let mut url = config.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            let _ = segments.pop_if_empty();
            if let Some(collection) = self.collection.as_deref().filter(|s| !s.is_empty()) {
                let _ = segments.extend(collection.split('/').filter(|s| !s.is_empty()));
            }
            let _ = segments.push("search.json");
        }
        let mut fragments = Vec::new();
        if let Some(start_date) = self.start_date.as_ref().filter(|d| !d.is_empty()) {
            let start_date = normalize_date(start_date.clone())?;
            fragments.push(("startDate".to_string(), start_date.isoformat()));
        }
        if let Some(end_date) = self.end_date.as_ref().filter(|d| !d.is_empty()) {
            let end_date = end_of_day(normalize_date(end_date.clone())?);
            fragments.push(("completionDate".to_string(), end_date.isoformat()));
        }
        if let Some(geometry) = self.geometry.as_deref().filter(|s| !s.is_empty()) {
            fragments.push(("geometry".to_string(), encode_geometry(geometry)?));
        }
        for (key, value) in &self.filters {
            fragments.push((key.clone(), value.encode()));
        }
        fragments.push(("maxRecords".to_string(), config.max_records.to_string()));
        Ok(EncodedQuery {
            base: url.into(),
            fragments,
        })
    }
}

impl EncodedQuery {
    /// Returns the url of the search endpoint, without any query string.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the query string parameters, in order.
    pub fn fragments(&self) -> &[(String, String)] {
        &self.fragments
    }

    /// Returns the full search url, without a page number.
    ///
    /// Every parameter is prefixed with `&`, matching the urls the EO Finder
    /// documentation uses.
    pub fn url(&self) -> String {
        let mut url = format!("{}?", self.base);
        for (key, value) in &self.fragments {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    /// Returns the url of a page, starting at one.
    pub fn page_url(&self, page: usize) -> String {
        format!("{}&page={page}", self.url())
    }
}

impl Display for EncodedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::Query;
    use crate::{Config, Error, FilterValue};
    use chrono::{TimeZone, Utc};

    fn config() -> Config {
        Config::new("http://creodias.test/resto/api/collections/").unwrap()
    }

    #[test]
    fn empty() {
        let encoded = Query::new().encode(&config()).unwrap();
        assert_eq!(
            encoded.base(),
            "http://creodias.test/resto/api/collections/search.json"
        );
        assert_eq!(
            encoded.url(),
            "http://creodias.test/resto/api/collections/search.json?&maxRecords=1000"
        );
    }

    #[test]
    fn collection() {
        let encoded = Query::new()
            .collection("Sentinel2")
            .encode(&config())
            .unwrap();
        assert_eq!(
            encoded.base(),
            "http://creodias.test/resto/api/collections/Sentinel2/search.json"
        );
    }

    #[test]
    fn api_url_without_trailing_slash() {
        let config = Config::new("http://creodias.test/collections").unwrap();
        let encoded = Query::new()
            .collection("Landsat8")
            .encode(&config)
            .unwrap();
        assert_eq!(
            encoded.base(),
            "http://creodias.test/collections/Landsat8/search.json"
        );
    }

    #[test]
    fn empty_strings_are_missing() {
        let encoded = Query::new()
            .collection("")
            .start_date("")
            .end_date("")
            .geometry("")
            .encode(&config())
            .unwrap();
        assert_eq!(encoded, Query::new().encode(&config()).unwrap());
    }

    #[test]
    fn order() {
        let encoded = Query::new()
            .filter("b", "x")
            .geometry("POINT (1 2)")
            .end_date("2020-01-31")
            .filter("a", "y")
            .start_date("2020-01-01T10:00:00")
            .encode(&config())
            .unwrap();
        let keys: Vec<_> = encoded
            .fragments()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(
            keys,
            [
                "startDate",
                "completionDate",
                "geometry",
                "a",
                "b",
                "maxRecords"
            ]
        );
        assert!(encoded.url().contains("&a=y&b=x&"));
        assert_eq!(
            encoded.page_url(2),
            "http://creodias.test/resto/api/collections/search.json?\
             &startDate=2020-01-01T10:00:00&completionDate=2020-01-31T23:59:59\
             &geometry=POINT(1+2)&a=y&b=x&maxRecords=1000&page=2"
        );
    }

    #[test]
    fn deterministic() {
        let query = Query::new()
            .collection("Sentinel1")
            .filter("sensorMode", "IW")
            .filter("productType", "GRD")
            .filter("orbitNumber", FilterValue::range(1, 100));
        assert_eq!(
            query.encode(&config()).unwrap().url(),
            query.clone().encode(&config()).unwrap().url()
        );
    }

    #[test]
    fn structured_dates() {
        let encoded = Query::new()
            .start_date(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
            .end_date(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap())
            .encode(&config())
            .unwrap();
        assert_eq!(
            encoded.fragments()[..2],
            [
                (
                    "startDate".to_string(),
                    "2020-01-01T00:00:00+00:00".to_string()
                ),
                (
                    "completionDate".to_string(),
                    "2020-01-02T23:59:59+00:00".to_string()
                )
            ]
        );
    }

    #[test]
    fn max_records() {
        let encoded = Query::new()
            .encode(&config().with_max_records(10))
            .unwrap();
        assert_eq!(
            encoded.fragments().last().unwrap(),
            &("maxRecords".to_string(), "10".to_string())
        );
    }

    #[test]
    fn invalid_start_date() {
        assert!(matches!(
            Query::new()
                .start_date("yesterday")
                .encode(&config())
                .unwrap_err(),
            Error::InvalidDateFormat(_)
        ));
    }

    #[test]
    fn geometry_without_keyword() {
        let encoded = Query::new()
            .geometry(" POINT (1 2)")
            .encode(&config())
            .unwrap();
        assert_eq!(
            encoded.fragments()[0],
            ("geometry".to_string(), "POINT+(1+2)".to_string())
        );
    }
}
