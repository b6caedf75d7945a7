//! Built-in custom scalar codecs for dates and timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

use crate::error::ScalarError;
use crate::scalar::ScalarCodec;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(text: &str) -> Result<NaiveDate, ScalarError> {
	NaiveDate::parse_from_str(text, DATE_FORMAT)
		.map_err(|e| ScalarError::with_source(format!("invalid date '{text}'"), e))
}

/// ISO 8601 calendar date, `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso8601Date;

impl ScalarCodec for Iso8601Date {
	type Value = NaiveDate;

	fn serialize(&self, value: &NaiveDate) -> Result<String, ScalarError> {
		Ok(value.format(DATE_FORMAT).to_string())
	}

	fn deserialize(&self, text: &str) -> Result<NaiveDate, ScalarError> {
		parse_date(text.trim())
	}
}

/// XML Schema `xs:date`.
///
/// Writes `YYYY-MM-DD`. On input a trailing timezone (`Z`, `+hh:mm` or `-hh:mm`) is
/// accepted and discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct XsdDate;

impl ScalarCodec for XsdDate {
	type Value = NaiveDate;

	fn serialize(&self, value: &NaiveDate) -> Result<String, ScalarError> {
		Ok(value.format(DATE_FORMAT).to_string())
	}

	fn deserialize(&self, text: &str) -> Result<NaiveDate, ScalarError> {
		parse_date(strip_timezone(text.trim()))
	}
}

fn strip_timezone(text: &str) -> &str {
	if let Some(date) = text.strip_suffix('Z') {
		return date;
	}
	// A plain date is `YYYY-MM-DD`; a sign after that starts the offset.
	match text.get(10..) {
		Some(rest) if rest.starts_with('+') || rest.starts_with('-') => &text[..10],
		_ => text,
	}
}

/// XML Schema `xs:dateTime` with an explicit offset.
///
/// Parses RFC 3339 and writes it back with a numeric offset, e.g.
/// `2024-03-01T09:30:00+00:00`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XsdDateTime;

impl ScalarCodec for XsdDateTime {
	type Value = DateTime<FixedOffset>;

	fn serialize(&self, value: &DateTime<FixedOffset>) -> Result<String, ScalarError> {
		Ok(value.to_rfc3339_opts(SecondsFormat::AutoSi, false))
	}

	fn deserialize(&self, text: &str) -> Result<DateTime<FixedOffset>, ScalarError> {
		let text = text.trim();
		DateTime::parse_from_rfc3339(text)
			.map_err(|e| ScalarError::with_source(format!("invalid date-time '{text}'"), e))
	}
}
