//! Fixture format definitions.
//!
//! This module defines the data structures for the Django fixture format and
//! the serialization and compression formats fixture files may use.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One serialized model instance.
///
/// # Example
///
/// ```json
/// {
///   "model": "fixtures_model_package.article",
///   "pk": 2,
///   "fields": {
///     "headline": "Poker has no place on ESPN",
///     "pub_date": "2006-06-16 12:00:00"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixtureRecord {
	/// Model identifier in format "app.Model".
	pub model: String,

	/// Primary key value. Optional for auto-increment fields.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pk: Option<Value>,

	/// Field values as a JSON object.
	#[serde(default = "empty_fields")]
	pub fields: Value,
}

fn empty_fields() -> Value {
	Value::Object(serde_json::Map::new())
}

impl FixtureRecord {
	/// Creates a new fixture record.
	pub fn new(model: impl Into<String>, fields: Value) -> Self {
		Self {
			model: model.into(),
			pk: None,
			fields,
		}
	}

	/// Creates a new fixture record with a primary key.
	pub fn with_pk(model: impl Into<String>, pk: Value, fields: Value) -> Self {
		Self {
			model: model.into(),
			pk: Some(pk),
			fields,
		}
	}

	/// Returns the app label portion of the model identifier.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed_seeding::fixtures::FixtureRecord;
	/// # use serde_json::json;
	/// let record = FixtureRecord::new("library.Book", json!({}));
	/// assert_eq!(record.app_label(), Some("library"));
	/// assert_eq!(record.model_name(), Some("Book"));
	/// ```
	pub fn app_label(&self) -> Option<&str> {
		self.model.split_once('.').map(|(app, _)| app)
	}

	/// Returns the model name portion of the model identifier.
	pub fn model_name(&self) -> Option<&str> {
		self.model.split_once('.').map(|(_, model)| model)
	}
}

/// Serialization formats of fixture files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FixtureFormat {
	/// JSON format (default).
	#[default]
	Json,

	/// YAML format (requires `yaml` feature).
	Yaml,
}

impl FixtureFormat {
	/// Determines the fixture format from a file extension.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed_seeding::fixtures::FixtureFormat;
	/// assert_eq!(FixtureFormat::from_extension("json"), Some(FixtureFormat::Json));
	/// assert_eq!(FixtureFormat::from_extension("yml"), Some(FixtureFormat::Yaml));
	/// assert_eq!(FixtureFormat::from_extension("xml"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}

	/// Determines the fixture format from a file path, skipping a
	/// compression extension.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed_seeding::fixtures::FixtureFormat;
	/// # use std::path::Path;
	/// assert_eq!(
	///     FixtureFormat::from_path(Path::new("dump.json.gz")),
	///     Some(FixtureFormat::Json)
	/// );
	/// ```
	pub fn from_path(path: &Path) -> Option<Self> {
		let file_name = path.file_name()?.to_str()?;
		let stem = match Compression::from_path(path) {
			Compression::None => file_name,
			compression => file_name.strip_suffix(compression.extension())?.strip_suffix('.')?,
		};
		let (_, ext) = stem.rsplit_once('.')?;
		Self::from_extension(ext)
	}

	/// Returns the default file extension for this format.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Yaml => "yaml",
		}
	}

	/// Every extension a fixture file of this format may carry.
	pub fn extensions(&self) -> &'static [&'static str] {
		match self {
			Self::Json => &["json"],
			Self::Yaml => &["yaml", "yml"],
		}
	}

	/// Returns true when this build can read and write the format.
	pub fn is_available(&self) -> bool {
		match self {
			Self::Json => true,
			Self::Yaml => cfg!(feature = "yaml"),
		}
	}

	/// Formats this build can read, in discovery order.
	pub fn available() -> Vec<Self> {
		[Self::Json, Self::Yaml]
			.into_iter()
			.filter(Self::is_available)
			.collect()
	}
}

impl std::fmt::Display for FixtureFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json => write!(f, "json"),
			Self::Yaml => write!(f, "yaml"),
		}
	}
}

/// Compression applied to a fixture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Compression {
	/// Plain file.
	#[default]
	None,

	/// gzip (`.gz`).
	Gzip,
}

impl Compression {
	/// Compression named by an extension, if any.
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"gz" => Some(Self::Gzip),
			_ => None,
		}
	}

	/// Compression implied by the last extension of a path.
	pub fn from_path(path: &Path) -> Self {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(Self::from_extension)
			.unwrap_or_default()
	}

	/// Extension without the dot; empty for uncompressed files.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::None => "",
			Self::Gzip => "gz",
		}
	}

	/// Every compression, uncompressed first.
	pub fn all() -> [Self; 2] {
		[Self::None, Self::Gzip]
	}
}

/// Parsed fixture data containing multiple records.
#[derive(Debug, Clone)]
pub struct FixtureData {
	/// Collection of fixture records.
	pub records: Vec<FixtureRecord>,

	/// Format the data was parsed from.
	pub format: FixtureFormat,

	/// Optional source file path.
	pub source: Option<String>,
}

impl FixtureData {
	/// Creates a new empty fixture data container.
	pub fn new(format: FixtureFormat) -> Self {
		Self {
			records: Vec::new(),
			format,
			source: None,
		}
	}

	/// Creates fixture data from a vector of records.
	pub fn from_records(records: Vec<FixtureRecord>, format: FixtureFormat) -> Self {
		Self {
			records,
			format,
			source: None,
		}
	}

	/// Returns the number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns true if there are no records.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Adds a record to the collection.
	pub fn push(&mut self, record: FixtureRecord) {
		self.records.push(record);
	}

	/// Returns an iterator over the records.
	pub fn iter(&self) -> impl Iterator<Item = &FixtureRecord> {
		self.records.iter()
	}

	/// Filters records by app label.
	pub fn filter_by_app(&self, app_labels: &[&str]) -> Vec<&FixtureRecord> {
		self.records
			.iter()
			.filter(|record| {
				record
					.app_label()
					.map(|app| app_labels.contains(&app))
					.unwrap_or(false)
			})
			.collect()
	}
}

impl IntoIterator for FixtureData {
	type Item = FixtureRecord;
	type IntoIter = std::vec::IntoIter<FixtureRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.records.into_iter()
	}
}

impl<'a> IntoIterator for &'a FixtureData {
	type Item = &'a FixtureRecord;
	type IntoIter = std::slice::Iter<'a, FixtureRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.records.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use std::path::PathBuf;

	#[rstest]
	fn test_record_without_fields_key() {
		let record: FixtureRecord =
			serde_json::from_value(json!({"model": "library.Book", "pk": 1})).unwrap();
		assert_eq!(record.fields, json!({}));
	}

	#[rstest]
	fn test_record_model_without_dot() {
		let record = FixtureRecord::new("Book", json!({}));
		assert_eq!(record.app_label(), None);
		assert_eq!(record.model_name(), None);
	}

	#[rstest]
	#[case("fixture1.json", Some(FixtureFormat::Json))]
	#[case("fixture1.JSON", Some(FixtureFormat::Json))]
	#[case("data.yml", Some(FixtureFormat::Yaml))]
	#[case("data.yaml.gz", Some(FixtureFormat::Yaml))]
	#[case("data.gz", None)]
	#[case("no_extension", None)]
	fn test_format_from_path(#[case] path: &str, #[case] expected: Option<FixtureFormat>) {
		assert_eq!(FixtureFormat::from_path(&PathBuf::from(path)), expected);
	}

	#[rstest]
	fn test_compression_from_path() {
		assert_eq!(
			Compression::from_path(Path::new("dump.json.gz")),
			Compression::Gzip
		);
		assert_eq!(
			Compression::from_path(Path::new("dump.json")),
			Compression::None
		);
	}

	#[rstest]
	fn test_available_formats() {
		let formats = FixtureFormat::available();
		assert_eq!(formats[0], FixtureFormat::Json);
		assert_eq!(formats.contains(&FixtureFormat::Yaml), cfg!(feature = "yaml"));
	}

	#[rstest]
	fn test_fixture_data_operations() {
		let mut data = FixtureData::new(FixtureFormat::Json);
		assert!(data.is_empty());

		data.push(FixtureRecord::new("news.Article", json!({"headline": "a"})));
		data.push(FixtureRecord::new("news.Article", json!({"headline": "b"})));
		data.push(FixtureRecord::new("library.Book", json!({"name": "c"})));

		assert_eq!(data.len(), 3);
		assert_eq!(data.filter_by_app(&["library"]).len(), 1);
		assert_eq!(data.filter_by_app(&["news", "library"]).len(), 3);
		assert!(data.filter_by_app(&["auth"]).is_empty());
	}
}
