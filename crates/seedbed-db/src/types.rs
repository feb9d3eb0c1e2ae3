//! Query values and fetched rows.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::DatabaseError;

/// Storage format for datetimes. Lexical order matches chronological order.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_INPUT_FORMATS: &[&str] = &[
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%d %H:%M",
	"%Y-%m-%dT%H:%M",
];

/// A value bound to or read from a SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Bytes(Vec<u8>),
	Timestamp(NaiveDateTime),
}

impl QueryValue {
	/// Returns true for SQL `NULL`.
	pub fn is_null(&self) -> bool {
		matches!(self, QueryValue::Null)
	}

	/// Converts the value to JSON for fixture output.
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::types::QueryValue;
	/// use serde_json::json;
	///
	/// assert_eq!(QueryValue::Int(3).to_json(), json!(3));
	/// assert_eq!(QueryValue::Null.to_json(), json!(null));
	/// ```
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			QueryValue::Null => serde_json::Value::Null,
			QueryValue::Bool(b) => serde_json::Value::Bool(*b),
			QueryValue::Int(i) => serde_json::Value::from(*i),
			QueryValue::Float(f) => serde_json::Value::from(*f),
			QueryValue::String(s) => serde_json::Value::String(s.clone()),
			QueryValue::Bytes(b) => serde_json::Value::Array(
				b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
			),
			QueryValue::Timestamp(dt) => {
				serde_json::Value::String(format_datetime(dt).replacen(' ', "T", 1))
			}
		}
	}
}

/// Formats a datetime in storage format, keeping microseconds when present.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use seedbed_db::types::format_datetime;
///
/// let dt = NaiveDate::from_ymd_opt(2006, 6, 16).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// assert_eq!(format_datetime(&dt), "2006-06-16 12:00:00");
/// ```
pub fn format_datetime(dt: &NaiveDateTime) -> String {
	let base = dt.format(DATETIME_FORMAT).to_string();
	let micros = dt.nanosecond() / 1_000;
	if micros == 0 {
		base
	} else {
		format!("{}.{:06}", base, micros)
	}
}

/// Parses a datetime from the accepted text forms.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS[.ffffff]]` with a space or `T` separator,
/// RFC 3339 strings (converted to UTC) and bare dates (midnight).
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
	let value = value.trim();
	for format in DATETIME_INPUT_FORMATS {
		if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
			return Some(dt);
		}
	}
	if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
		return Some(dt.naive_utc());
	}
	NaiveDate::parse_from_str(value, DATE_FORMAT)
		.ok()
		.and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl From<&str> for QueryValue {
	fn from(s: &str) -> Self {
		QueryValue::String(s.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(s: String) -> Self {
		QueryValue::String(s)
	}
}

impl From<i64> for QueryValue {
	fn from(i: i64) -> Self {
		QueryValue::Int(i)
	}
}

impl From<i32> for QueryValue {
	fn from(i: i32) -> Self {
		QueryValue::Int(i64::from(i))
	}
}

/// Text comparison, so fetched columns can be checked against literals.
impl PartialEq<&str> for QueryValue {
	fn eq(&self, other: &&str) -> bool {
		matches!(self, QueryValue::String(s) if s == other)
	}
}

impl From<bool> for QueryValue {
	fn from(b: bool) -> Self {
		QueryValue::Bool(b)
	}
}

impl From<f64> for QueryValue {
	fn from(f: f64) -> Self {
		QueryValue::Float(f)
	}
}

impl From<NaiveDateTime> for QueryValue {
	fn from(dt: NaiveDateTime) -> Self {
		QueryValue::Timestamp(dt)
	}
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(QueryValue::Null)
	}
}

/// A fetched row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
	pub(crate) data: HashMap<String, QueryValue>,
}

impl Row {
	pub fn new() -> Self {
		Self {
			data: HashMap::new(),
		}
	}

	pub fn insert(&mut self, key: String, value: QueryValue) {
		self.data.insert(key, value);
	}

	/// Returns the raw value of a column.
	pub fn value(&self, key: &str) -> Option<&QueryValue> {
		self.data.get(key)
	}

	/// Reads a column converted to `T`.
	pub fn get<T: TryFrom<QueryValue>>(&self, key: &str) -> std::result::Result<T, DatabaseError>
	where
		DatabaseError: From<<T as TryFrom<QueryValue>>::Error>,
	{
		self.data
			.get(key)
			.cloned()
			.ok_or_else(|| DatabaseError::ColumnNotFound(key.to_string()))
			.and_then(|v| v.try_into().map_err(Into::into))
	}

	/// Reads a nullable column converted to `T`.
	pub fn get_opt<T: TryFrom<QueryValue>>(
		&self,
		key: &str,
	) -> std::result::Result<Option<T>, DatabaseError>
	where
		DatabaseError: From<<T as TryFrom<QueryValue>>::Error>,
	{
		match self.data.get(key) {
			None => Err(DatabaseError::ColumnNotFound(key.to_string())),
			Some(QueryValue::Null) => Ok(None),
			Some(v) => v.clone().try_into().map(Some).map_err(Into::into),
		}
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

impl TryFrom<QueryValue> for i64 {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => Ok(i),
			QueryValue::Bool(b) => Ok(i64::from(b)),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to i64",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for String {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::String(s) => Ok(s),
			QueryValue::Timestamp(dt) => Ok(format_datetime(&dt)),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to String",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for bool {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Bool(b) => Ok(b),
			// SQLite stores booleans as integers
			QueryValue::Int(i) => Ok(i != 0),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to bool",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for f64 {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Float(f) => Ok(f),
			QueryValue::Int(i) => Ok(i as f64),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to f64",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for NaiveDateTime {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Timestamp(dt) => Ok(dt),
			QueryValue::String(ref s) => parse_datetime(s).ok_or_else(|| {
				DatabaseError::TypeError(format!("Cannot parse {:?} as datetime", s))
			}),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to NaiveDateTime",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for NaiveDate {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Timestamp(dt) => Ok(dt.date()),
			QueryValue::String(ref s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
				.map_err(|_| DatabaseError::TypeError(format!("Cannot parse {:?} as date", s))),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to NaiveDate",
				value
			))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn dt(h: u32, m: u32, s: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2006, 6, 16)
			.unwrap()
			.and_hms_opt(h, m, s)
			.unwrap()
	}

	#[rstest]
	#[case("2006-06-16 12:00:00", dt(12, 0, 0))]
	#[case("2006-06-16T13:00:00", dt(13, 0, 0))]
	#[case("2006-06-16 14:00", dt(14, 0, 0))]
	#[case("2006-06-16T15:30:00Z", dt(15, 30, 0))]
	#[case("2006-06-16", dt(0, 0, 0))]
	fn test_parse_datetime(#[case] input: &str, #[case] expected: NaiveDateTime) {
		assert_eq!(parse_datetime(input), Some(expected));
	}

	#[rstest]
	fn test_parse_datetime_rejects_garbage() {
		assert_eq!(parse_datetime("yesterday"), None);
	}

	#[rstest]
	fn test_format_datetime_keeps_microseconds() {
		let value = dt(12, 0, 0) + chrono::Duration::microseconds(1500);
		assert_eq!(format_datetime(&value), "2006-06-16 12:00:00.001500");
	}

	#[rstest]
	fn test_row_get_and_missing_column() {
		let mut row = Row::new();
		row.insert("headline".to_string(), QueryValue::from("Poker"));
		row.insert("id".to_string(), QueryValue::Int(2));

		assert_eq!(row.get::<String>("headline").unwrap(), "Poker");
		assert_eq!(row.get::<i64>("id").unwrap(), 2);
		assert!(matches!(
			row.get::<String>("missing"),
			Err(DatabaseError::ColumnNotFound(_))
		));
	}

	#[rstest]
	fn test_row_reads_stored_datetime_text() {
		let mut row = Row::new();
		row.insert(
			"pub_date".to_string(),
			QueryValue::from("2006-06-16 12:00:00"),
		);
		assert_eq!(row.get::<NaiveDateTime>("pub_date").unwrap(), dt(12, 0, 0));
	}

	#[rstest]
	fn test_bool_from_integer_storage() {
		assert!(bool::try_from(QueryValue::Int(1)).unwrap());
		assert!(!bool::try_from(QueryValue::Int(0)).unwrap());
	}

	#[rstest]
	fn test_get_opt_null() {
		let mut row = Row::new();
		row.insert("note".to_string(), QueryValue::Null);
		assert_eq!(row.get_opt::<String>("note").unwrap(), None);
	}

	#[rstest]
	fn test_timestamp_to_json_uses_t_separator() {
		assert_eq!(
			QueryValue::Timestamp(dt(15, 0, 0)).to_json(),
			serde_json::json!("2006-06-16T15:00:00")
		);
	}
}
