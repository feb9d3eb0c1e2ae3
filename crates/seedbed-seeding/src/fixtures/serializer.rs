//! Fixture output.
//!
//! This module handles writing fixture records as JSON or YAML, optionally
//! gzip-compressed.

use std::io::Write;
use std::path::Path;

use flate2::Compression as GzLevel;
use flate2::write::GzEncoder;
use serde::Serialize;

use super::format::{Compression, FixtureFormat, FixtureRecord};
use crate::error::{SeedingError, SeedingResult};

/// Fixture serializer for exporting model data.
#[derive(Debug, Clone, Default)]
pub struct FixtureSerializer {
	format: FixtureFormat,

	/// Spaces per indentation level; `None` writes compact JSON.
	indent: Option<usize>,
}

impl FixtureSerializer {
	/// Creates a serializer writing compact JSON.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the output format.
	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = format;
		self
	}

	/// Sets the indentation level.
	pub fn with_indent(mut self, indent: Option<usize>) -> Self {
		self.indent = indent;
		self
	}

	/// Serializes fixture records to a string.
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_seeding::fixtures::{FixtureRecord, FixtureSerializer};
	/// use serde_json::json;
	///
	/// let records = vec![FixtureRecord::with_pk("library.book", json!(1), json!({"name": "x"}))];
	/// let out = FixtureSerializer::new().serialize(&records).unwrap();
	/// assert_eq!(out, r#"[{"model":"library.book","pk":1,"fields":{"name":"x"}}]"#);
	/// ```
	pub fn serialize(&self, records: &[FixtureRecord]) -> SeedingResult<String> {
		if !self.format.is_available() {
			return Err(SeedingError::UnsupportedExtension(format!(
				"{} support requires the 'yaml' feature",
				self.format
			)));
		}
		match self.format {
			FixtureFormat::Json => self.serialize_json(records),
			FixtureFormat::Yaml => self.serialize_yaml(records),
		}
	}

	fn serialize_json(&self, records: &[FixtureRecord]) -> SeedingResult<String> {
		match self.indent {
			None => serde_json::to_string(records)
				.map_err(|e| SeedingError::SerializationError(e.to_string())),
			Some(indent) => {
				let spaces = " ".repeat(indent);
				let formatter = serde_json::ser::PrettyFormatter::with_indent(spaces.as_bytes());
				let mut out = Vec::new();
				let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
				records
					.serialize(&mut serializer)
					.map_err(|e| SeedingError::SerializationError(e.to_string()))?;
				String::from_utf8(out).map_err(|e| SeedingError::SerializationError(e.to_string()))
			}
		}
	}

	#[cfg(feature = "yaml")]
	fn serialize_yaml(&self, records: &[FixtureRecord]) -> SeedingResult<String> {
		serde_yaml::to_string(records).map_err(|e| SeedingError::SerializationError(e.to_string()))
	}

	#[cfg(not(feature = "yaml"))]
	fn serialize_yaml(&self, _records: &[FixtureRecord]) -> SeedingResult<String> {
		Err(SeedingError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	/// Writes serialized fixtures to a file, gzip-compressed for `.gz` paths.
	pub fn write_to_file(&self, records: &[FixtureRecord], path: &Path) -> SeedingResult<()> {
		let content = self.serialize(records)?;
		match Compression::from_path(path) {
			Compression::None => std::fs::write(path, content)?,
			Compression::Gzip => {
				let file = std::fs::File::create(path)?;
				let mut encoder = GzEncoder::new(file, GzLevel::default());
				encoder.write_all(content.as_bytes())?;
				encoder.finish()?;
			}
		}
		Ok(())
	}

	/// Returns the configured output format.
	pub fn format(&self) -> FixtureFormat {
		self.format
	}

	/// Returns the configured indentation level.
	pub fn indent(&self) -> Option<usize> {
		self.indent
	}
}
