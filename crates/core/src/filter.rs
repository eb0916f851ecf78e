use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

const COMPOSITE_DELIMITERS: [(char, char); 4] = [('[', ']'), ('{', '}'), ('/', '/'), ('(', ')')];

/// The value of an additional search filter, e.g. `productType=L1C`.
///
/// See <https://creodias.eu/eo-data-finder-api-manual> for the available
/// filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A single value, or an expression the API already understands such as
    /// `[0,10]`.
    Scalar(String),

    /// A closed range, e.g. of cloud cover or dates.
    Range(String, String),
}

impl FilterValue {
    /// Creates a range filter value.
    ///
    /// # Examples
    ///
    /// ```
    /// use creodias_finder::FilterValue;
    ///
    /// assert_eq!(FilterValue::range(0, 20).encode(), "[0,20]");
    /// ```
    pub fn range(first: impl Display, second: impl Display) -> FilterValue {
        FilterValue::Range(first.to_string(), second.to_string())
    }

    /// Encodes this value for use in a query string.
    ///
    /// Scalars are trimmed and their whitespace is escaped with a backslash,
    /// unless they are already bracketed by `[]`, `{}`, `//`, or `()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use creodias_finder::FilterValue;
    ///
    /// assert_eq!(FilterValue::from("hello world").encode(), "hello\\ world");
    /// assert_eq!(FilterValue::from(" [a, b] ").encode(), "[a, b]");
    /// ```
    pub fn encode(&self) -> String {
        match self {
            FilterValue::Scalar(value) => {
                let value = value.trim();
                if is_composite(value) {
                    value.to_string()
                } else {
                    let mut escaped = String::with_capacity(value.len());
                    for c in value.chars() {
                        if c.is_whitespace() {
                            escaped.push('\\');
                        }
                        escaped.push(c);
                    }
                    escaped
                }
            }
            FilterValue::Range(first, second) => format!("[{first},{second}]"),
        }
    }
}

fn is_composite(value: &str) -> bool {
    COMPOSITE_DELIMITERS
        .iter()
        .any(|&(start, end)| value.starts_with(start) && value.ends_with(end))
}

/// Encodes a filter value for use in a query string.
///
/// This is [FilterValue::encode] as a free function.
pub fn encode_filter_value(value: &FilterValue) -> String {
    value.encode()
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Scalar(value)
    }
}

impl<A: Display, B: Display> From<(A, B)> for FilterValue {
    fn from((first, second): (A, B)) -> Self {
        FilterValue::range(first, second)
    }
}

impl<T: Display> TryFrom<Vec<T>> for FilterValue {
    type Error = Error;

    fn try_from(values: Vec<T>) -> Result<FilterValue> {
        match values.as_slice() {
            [first, second] => Ok(FilterValue::range(first, second)),
            _ => Err(Error::InvalidArgumentCount(values.len())),
        }
    }
}

impl TryFrom<Value> for FilterValue {
    type Error = Error;

    fn try_from(value: Value) -> Result<FilterValue> {
        match value {
            Value::String(s) => Ok(FilterValue::Scalar(s)),
            Value::Array(values) => {
                let values = values
                    .into_iter()
                    .map(|value| match value {
                        Value::String(s) => s,
                        value => value.to_string(),
                    })
                    .collect::<Vec<_>>();
                values.try_into()
            }
            Value::Null => Err(Error::UnsupportedArgumentType("null".to_string())),
            Value::Bool(_) => Err(Error::UnsupportedArgumentType("boolean".to_string())),
            Value::Number(_) => Err(Error::UnsupportedArgumentType("number".to_string())),
            Value::Object(_) => Err(Error::UnsupportedArgumentType("object".to_string())),
        }
    }
}
