use crate::{Error, Result};
use serde_json::Value;

/// Converts a well-known text geometry to the encoding expected by the API.
///
/// The space after each comma is dropped, then the space after the geometry
/// keyword, and every remaining space becomes a `+`.
///
/// # Examples
///
/// ```
/// use creodias_finder::encode_geometry;
///
/// assert_eq!(
///     encode_geometry("POLYGON ((1 2, 3 4))").unwrap(),
///     "POLYGON((1+2,3+4))"
/// );
/// ```
///
/// Any text is accepted; only non-string values, through
/// [encode_geometry_value], are rejected.
pub fn encode_geometry(wkt: &str) -> Result<String> {
    Ok(wkt.replace(", ", ",").replacen(' ', "", 1).replace(' ', "+"))
}

/// Encodes a geometry that came from untyped JSON, e.g. a config file.
///
/// # Examples
///
/// ```
/// use creodias_finder::encode_geometry_value;
/// use serde_json::json;
///
/// assert_eq!(encode_geometry_value(&json!("POINT (1 2)")).unwrap(), "POINT(1+2)");
/// encode_geometry_value(&json!([1, 2])).unwrap_err();
/// ```
pub fn encode_geometry_value(value: &Value) -> Result<String> {
    match value {
        Value::String(wkt) => encode_geometry(wkt),
        _ => Err(Error::InvalidGeometryFormat(value.to_string())),
    }
}
