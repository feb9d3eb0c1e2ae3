//! Fixture parsing functionality.
//!
//! This module handles parsing of fixture files in JSON and YAML formats,
//! optionally gzip-compressed.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use super::format::{Compression, FixtureData, FixtureFormat, FixtureRecord};
use crate::error::{SeedingError, SeedingResult};

/// Parser for fixture files.
///
/// Supports both JSON and YAML formats (YAML requires the `yaml` feature).
#[derive(Debug, Clone, Default)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses a fixture file from the given path.
	///
	/// The format and compression are detected from the file name.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The file cannot be read
	/// - The file extension is not recognized
	/// - The file content is invalid
	pub fn parse_file(&self, path: &Path) -> SeedingResult<FixtureData> {
		let format = FixtureFormat::from_path(path).ok_or_else(|| {
			SeedingError::UnsupportedExtension(
				path.extension()
					.and_then(|e| e.to_str())
					.unwrap_or("(none)")
					.to_string(),
			)
		})?;

		let bytes = std::fs::read(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				SeedingError::FileNotFound(path.display().to_string())
			} else {
				SeedingError::IoError(e)
			}
		})?;
		let content = Self::decompress(&bytes, Compression::from_path(path))?;

		let mut data = self.parse_string(&content, format)?;
		data.source = Some(path.display().to_string());
		Ok(data)
	}

	fn decompress(bytes: &[u8], compression: Compression) -> SeedingResult<String> {
		match compression {
			Compression::None => String::from_utf8(bytes.to_vec())
				.map_err(|e| SeedingError::ParseError(format!("Fixture is not valid UTF-8: {}", e))),
			Compression::Gzip => {
				let mut content = String::new();
				GzDecoder::new(bytes).read_to_string(&mut content)?;
				Ok(content)
			}
		}
	}

	/// Parses fixture data from a string.
	pub fn parse_string(&self, content: &str, format: FixtureFormat) -> SeedingResult<FixtureData> {
		let records = match format {
			FixtureFormat::Json => self.parse_json(content)?,
			FixtureFormat::Yaml => self.parse_yaml(content)?,
		};

		Ok(FixtureData::from_records(records, format))
	}

	/// Parses JSON fixture content.
	fn parse_json(&self, content: &str) -> SeedingResult<Vec<FixtureRecord>> {
		let value: serde_json::Value = serde_json::from_str(content)?;

		match value {
			serde_json::Value::Array(arr) => {
				let mut records = Vec::with_capacity(arr.len());
				for (idx, item) in arr.into_iter().enumerate() {
					let record: FixtureRecord = serde_json::from_value(item).map_err(|e| {
						SeedingError::ParseError(format!("Invalid record at index {}: {}", idx, e))
					})?;
					self.validate_record(&record)?;
					records.push(record);
				}
				Ok(records)
			}
			serde_json::Value::Object(_) => {
				let record: FixtureRecord = serde_json::from_value(value)?;
				self.validate_record(&record)?;
				Ok(vec![record])
			}
			_ => Err(SeedingError::ParseError(
				"Expected array or object".to_string(),
			)),
		}
	}

	/// Parses YAML fixture content.
	#[cfg(feature = "yaml")]
	fn parse_yaml(&self, content: &str) -> SeedingResult<Vec<FixtureRecord>> {
		let value: serde_yaml::Value = serde_yaml::from_str(content)?;

		match value {
			serde_yaml::Value::Sequence(seq) => {
				let mut records = Vec::with_capacity(seq.len());
				for (idx, item) in seq.into_iter().enumerate() {
					let record: FixtureRecord = serde_yaml::from_value(item).map_err(|e| {
						SeedingError::ParseError(format!("Invalid record at index {}: {}", idx, e))
					})?;
					self.validate_record(&record)?;
					records.push(record);
				}
				Ok(records)
			}
			serde_yaml::Value::Mapping(_) => {
				let record: FixtureRecord = serde_yaml::from_value(value)?;
				self.validate_record(&record)?;
				Ok(vec![record])
			}
			// An empty YAML document holds no objects.
			serde_yaml::Value::Null => Ok(Vec::new()),
			_ => Err(SeedingError::ParseError(
				"Expected sequence or mapping".to_string(),
			)),
		}
	}

	#[cfg(not(feature = "yaml"))]
	fn parse_yaml(&self, _content: &str) -> SeedingResult<Vec<FixtureRecord>> {
		Err(SeedingError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	/// Validates a fixture record.
	fn validate_record(&self, record: &FixtureRecord) -> SeedingResult<()> {
		let valid_model = record
			.model
			.split_once('.')
			.is_some_and(|(app, model)| !app.is_empty() && !model.is_empty());
		if !valid_model {
			return Err(SeedingError::ValidationError {
				field: "model".to_string(),
				message: format!(
					"Model identifier '{}' must be in 'app.Model' format",
					record.model
				),
			});
		}

		if !record.fields.is_object() {
			return Err(SeedingError::ValidationError {
				field: "fields".to_string(),
				message: "Fields must be a JSON object".to_string(),
			});
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use flate2::Compression as GzLevel;
	use flate2::write::GzEncoder;
	use rstest::rstest;
	use std::io::Write;
	use tempfile::NamedTempFile;

	const FIXTURE: &str = r#"[
		{
			"pk": 2,
			"model": "fixtures_model_package.article",
			"fields": {"headline": "Poker has no place on ESPN", "pub_date": "2006-06-16 12:00:00"}
		},
		{
			"pk": 3,
			"model": "fixtures_model_package.article",
			"fields": {"headline": "Time to reform copyright", "pub_date": "2006-06-16 13:00:00"}
		}
	]"#;

	#[rstest]
	fn test_parse_json_array() {
		let data = FixtureParser::new()
			.parse_string(FIXTURE, FixtureFormat::Json)
			.unwrap();
		assert_eq!(data.len(), 2);
		assert_eq!(data.records[1].pk, Some(serde_json::json!(3)));
	}

	#[rstest]
	fn test_parse_json_single_object() {
		let content = r#"{"model": "library.book", "pk": 1, "fields": {"name": "x"}}"#;
		let data = FixtureParser::new()
			.parse_string(content, FixtureFormat::Json)
			.unwrap();
		assert_eq!(data.len(), 1);
	}

	#[rstest]
	fn test_parse_empty_array() {
		let data = FixtureParser::new()
			.parse_string("[]", FixtureFormat::Json)
			.unwrap();
		assert!(data.is_empty());
	}

	#[rstest]
	#[case(r#"[{"model": "Book", "fields": {}}]"#, "model")]
	#[case(r#"[{"model": ".Book", "fields": {}}]"#, "model")]
	#[case(r#"[{"model": "library.Book", "fields": "not an object"}]"#, "fields")]
	fn test_parse_invalid_record(#[case] content: &str, #[case] expected_field: &str) {
		let result = FixtureParser::new().parse_string(content, FixtureFormat::Json);
		match result {
			Err(SeedingError::ValidationError { field, .. }) => assert_eq!(field, expected_field),
			other => panic!("Expected ValidationError, got {:?}", other),
		}
	}

	#[rstest]
	fn test_parse_scalar_document() {
		let result = FixtureParser::new().parse_string("42", FixtureFormat::Json);
		assert!(matches!(result, Err(SeedingError::ParseError(_))));
	}

	#[rstest]
	fn test_parse_file() {
		let mut file = NamedTempFile::with_suffix(".json").unwrap();
		write!(file, "{}", FIXTURE).unwrap();

		let data = FixtureParser::new().parse_file(file.path()).unwrap();
		assert_eq!(data.len(), 2);
		assert!(data.source.is_some());
	}

	#[rstest]
	fn test_parse_gzip_file() {
		let file = NamedTempFile::with_suffix(".json.gz").unwrap();
		let mut encoder = GzEncoder::new(file.reopen().unwrap(), GzLevel::default());
		encoder.write_all(FIXTURE.as_bytes()).unwrap();
		encoder.finish().unwrap();

		let data = FixtureParser::new().parse_file(file.path()).unwrap();
		assert_eq!(data.len(), 2);
		assert_eq!(data.format, FixtureFormat::Json);
	}

	#[rstest]
	fn test_parse_file_not_found() {
		let result = FixtureParser::new().parse_file(Path::new("/nonexistent/file.json"));
		assert!(matches!(result, Err(SeedingError::FileNotFound(_))));
	}

	#[rstest]
	fn test_parse_unsupported_extension() {
		let result = FixtureParser::new().parse_file(Path::new("file.xml"));
		assert!(matches!(result, Err(SeedingError::UnsupportedExtension(_))));
	}

	#[cfg(feature = "yaml")]
	#[rstest]
	fn test_parse_yaml() {
		let content = r#"
- model: library.book
  pk: 1
  fields:
    name: Achieving self-awareness of Python programs
"#;
		let data = FixtureParser::new()
			.parse_string(content, FixtureFormat::Yaml)
			.unwrap();
		assert_eq!(data.len(), 1);
	}
}
