use crate::{Error, Result};
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike,
};
use regex::Regex;
use std::{fmt::Display, sync::LazyLock};

static ISO_8601_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(|Z|[+-][0-9]{2}:[0-9]{2}))?$",
    )
    .expect("the ISO 8601 regex is valid")
});

/// A point in time, with or without a UTC offset.
///
/// Bare dates and datetimes without an offset stay naive, so they are sent to
/// the API exactly as the caller wrote them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timestamp {
    /// A datetime without an offset.
    Naive(NaiveDateTime),

    /// A datetime with a fixed UTC offset.
    Fixed(DateTime<FixedOffset>),
}

/// A start or end date as provided by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateInput {
    /// An already-structured timestamp.
    Timestamp(Timestamp),

    /// An ISO 8601 string, validated by [normalize_date].
    Text(String),
}

impl Timestamp {
    /// Returns the hour of this timestamp.
    pub fn hour(&self) -> u32 {
        match self {
            Timestamp::Naive(datetime) => datetime.hour(),
            Timestamp::Fixed(datetime) => datetime.hour(),
        }
    }

    /// Returns the minute of this timestamp.
    pub fn minute(&self) -> u32 {
        match self {
            Timestamp::Naive(datetime) => datetime.minute(),
            Timestamp::Fixed(datetime) => datetime.minute(),
        }
    }

    /// Returns the second of this timestamp.
    pub fn second(&self) -> u32 {
        match self {
            Timestamp::Naive(datetime) => datetime.second(),
            Timestamp::Fixed(datetime) => datetime.second(),
        }
    }

    /// Formats this timestamp as an ISO 8601 string.
    ///
    /// Microseconds are only written when non-zero, and the offset is only
    /// written for [Timestamp::Fixed].
    ///
    /// # Examples
    ///
    /// ```
    /// use creodias_finder::normalize_date;
    ///
    /// let timestamp = normalize_date("2021-03-04").unwrap();
    /// assert_eq!(timestamp.isoformat(), "2021-03-04T00:00:00");
    /// let timestamp = normalize_date("2021-03-04T05:06:07.5Z").unwrap();
    /// assert_eq!(timestamp.isoformat(), "2021-03-04T05:06:07.500000+00:00");
    /// ```
    pub fn isoformat(&self) -> String {
        let format = if self.microsecond() == 0 {
            "%Y-%m-%dT%H:%M:%S"
        } else {
            "%Y-%m-%dT%H:%M:%S%.6f"
        };
        match self {
            Timestamp::Naive(datetime) => datetime.format(format).to_string(),
            Timestamp::Fixed(datetime) => {
                format!("{}{}", datetime.format(format), datetime.format("%:z"))
            }
        }
    }

    fn microsecond(&self) -> u32 {
        self.nanosecond() / 1_000
    }

    fn nanosecond(&self) -> u32 {
        match self {
            Timestamp::Naive(datetime) => datetime.nanosecond(),
            Timestamp::Fixed(datetime) => datetime.nanosecond(),
        }
    }

    fn add(self, delta: TimeDelta) -> Timestamp {
        match self {
            Timestamp::Naive(datetime) => Timestamp::Naive(datetime + delta),
            Timestamp::Fixed(datetime) => Timestamp::Fixed(datetime + delta),
        }
    }
}

/// Validates and parses a date.
///
/// Timestamps are returned unchanged. Strings must look like `YYYY-MM-DD`,
/// optionally followed by `THH:MM:SS[.fraction][Z|±HH:MM]`.
///
/// # Examples
///
/// ```
/// use creodias_finder::{Error, normalize_date};
///
/// let timestamp = normalize_date("2021-03-04T05:06:07+02:00").unwrap();
/// assert_eq!(timestamp.hour(), 5);
/// assert!(matches!(
///     normalize_date("03/04/2021").unwrap_err(),
///     Error::InvalidDateFormat(_)
/// ));
/// ```
pub fn normalize_date(value: impl Into<DateInput>) -> Result<Timestamp> {
    match value.into() {
        DateInput::Timestamp(timestamp) => Ok(timestamp),
        DateInput::Text(s) => parse(&s).ok_or(Error::InvalidDateFormat(s)),
    }
}

/// Moves a timestamp to the end of its day if it has no time of day.
///
/// A timestamp at exactly midnight is treated as a bare date and gets
/// 23:59:59 added, so an end date includes the whole day. Any other timestamp
/// is returned unchanged.
///
/// # Examples
///
/// ```
/// use creodias_finder::{end_of_day, normalize_date};
///
/// let timestamp = end_of_day(normalize_date("2021-03-04").unwrap());
/// assert_eq!(timestamp.isoformat(), "2021-03-04T23:59:59");
/// ```
pub fn end_of_day(timestamp: Timestamp) -> Timestamp {
    if timestamp.hour() == 0 && timestamp.minute() == 0 && timestamp.second() == 0 {
        timestamp.add(TimeDelta::hours(23) + TimeDelta::minutes(59) + TimeDelta::seconds(59))
    } else {
        timestamp
    }
}

fn parse(s: &str) -> Option<Timestamp> {
    let captures = ISO_8601_REGEX.captures(s)?;
    let timestamp = match (captures.get(1), captures.get(3)) {
        (None, _) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|date| Timestamp::Naive(date.and_time(NaiveTime::MIN))),
        (Some(_), Some(offset)) if !offset.as_str().is_empty() => {
            DateTime::parse_from_rfc3339(s).ok().map(Timestamp::Fixed)
        }
        (Some(_), _) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(Timestamp::Naive),
    }?;
    // chrono stores leap seconds as nanosecond >= 1_000_000_000
    if timestamp.nanosecond() >= 1_000_000_000 {
        None
    } else {
        Some(timestamp)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.isoformat())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Timestamp::Naive(datetime)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Timestamp::Naive(date.and_time(NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(datetime: DateTime<Tz>) -> Self {
        Timestamp::Fixed(datetime.fixed_offset())
    }
}

impl From<Timestamp> for DateInput {
    fn from(timestamp: Timestamp) -> Self {
        DateInput::Timestamp(timestamp)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(datetime: NaiveDateTime) -> Self {
        DateInput::Timestamp(datetime.into())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Timestamp(date.into())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(datetime: DateTime<Tz>) -> Self {
        DateInput::Timestamp(datetime.into())
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

impl DateInput {
    /// Returns true if this is an empty string.
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, DateInput::Text(s) if s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{DateInput, Timestamp, end_of_day, normalize_date};
    use crate::Error;
    use chrono::{NaiveDate, Utc};
    use rstest::rstest;

    #[rstest]
    #[case("2021-03-04", "2021-03-04T00:00:00")]
    #[case("2021-03-04T05:06:07", "2021-03-04T05:06:07")]
    #[case("2021-03-04T05:06:07Z", "2021-03-04T05:06:07+00:00")]
    #[case("2021-03-04T05:06:07+02:00", "2021-03-04T05:06:07+02:00")]
    #[case("2021-03-04T05:06:07-05:30", "2021-03-04T05:06:07-05:30")]
    #[case("2021-03-04T05:06:07.123456", "2021-03-04T05:06:07.123456")]
    #[case("2021-03-04T05:06:07.25Z", "2021-03-04T05:06:07.250000+00:00")]
    #[case("2021-03-04T05:06:07.000Z", "2021-03-04T05:06:07+00:00")]
    fn isoformat_round_trip(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_date(input).unwrap().isoformat(), expected);
    }

    #[rstest]
    #[case("2021-3-4")]
    #[case("04/03/2021")]
    #[case("2021-03-04 05:06:07")]
    #[case("2021-03-04T05:06")]
    #[case("2021-03-04T05:06:07+0200")]
    #[case("2021-02-30")]
    #[case("2021-03-04T25:06:07")]
    #[case("2016-12-31T23:59:60")]
    #[case("2016-12-31T23:59:60Z")]
    #[case("")]
    fn invalid_date_format(#[case] input: &str) {
        match normalize_date(input).unwrap_err() {
            Error::InvalidDateFormat(value) => assert_eq!(value, input),
            error => panic!("unexpected error: {error}"),
        }
    }

    #[test]
    fn timestamp_passes_through() {
        let datetime = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            normalize_date(datetime).unwrap(),
            Timestamp::Naive(datetime)
        );
        let now = Utc::now();
        assert_eq!(normalize_date(now).unwrap(), Timestamp::from(now));
    }

    #[test]
    fn end_of_day_bare_date() {
        let timestamp = end_of_day(normalize_date("2020-12-31").unwrap());
        assert_eq!(timestamp.isoformat(), "2020-12-31T23:59:59");
    }

    #[test]
    fn end_of_day_keeps_offset() {
        let timestamp = end_of_day(normalize_date("2020-12-31T00:00:00+01:00").unwrap());
        assert_eq!(timestamp.isoformat(), "2020-12-31T23:59:59+01:00");
    }

    #[test]
    fn end_of_day_with_time() {
        let timestamp = normalize_date("2020-12-31T12:00:00").unwrap();
        assert_eq!(end_of_day(timestamp), timestamp);
    }

    #[test]
    fn end_of_day_is_idempotent() {
        let once = end_of_day(normalize_date("2020-06-01").unwrap());
        assert_eq!(end_of_day(once), once);
    }

    #[test]
    fn empty_text() {
        assert!(DateInput::from("").is_empty());
        assert!(!DateInput::from("2020-01-01").is_empty());
    }
}
