//! Error types for the seeding module.
//!
//! This module defines the error types used throughout the seedbed-seeding crate.

use std::path::PathBuf;

use seedbed_db::DatabaseError;
use thiserror::Error;

/// Errors that can occur during seeding operations.
#[derive(Debug, Error)]
pub enum SeedingError {
	/// Model was not found in the app registry.
	#[error("Invalid model identifier: '{0}'")]
	ModelNotFound(String),

	/// Invalid fixture format detected.
	#[error("Invalid fixture format: {0}")]
	InvalidFormat(String),

	/// A fixture label names a serialization format that is not available.
	#[error("Problem installing fixture '{name}': {format} is not a known serialization format.")]
	UnknownFormat {
		/// Fixture name without extensions.
		name: String,
		/// Requested format extension.
		format: String,
	},

	/// Error parsing fixture data.
	#[error("Parse error: {0}")]
	ParseError(String),

	/// Error serializing data to fixture format.
	#[error("Serialization error: {0}")]
	SerializationError(String),

	/// Database operation failed.
	#[error(transparent)]
	Database(#[from] DatabaseError),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// Validation failed for a specific field.
	#[error("Validation error: {field}: {message}")]
	ValidationError {
		/// Field that failed validation.
		field: String,
		/// Validation error message.
		message: String,
	},

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// YAML serialization/deserialization error (when yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	YamlError(#[from] serde_yaml::Error),

	/// Fixture file not found.
	#[error("Fixture file not found: {0}")]
	FileNotFound(String),

	/// Unsupported file extension.
	#[error("Unsupported file extension: {0}")]
	UnsupportedExtension(String),

	/// More than one file in a fixture directory matches a label.
	#[error("Multiple fixtures named '{name}' in {dir}. Aborting.")]
	MultipleFixtures {
		/// Fixture name without extensions.
		name: String,
		/// Directory holding the conflicting files.
		dir: PathBuf,
	},

	/// Loading one fixture file failed; the whole load is rolled back.
	#[error("Problem installing fixture '{path}': {source}")]
	FixtureInstall {
		/// Fixture file being installed.
		path: PathBuf,
		/// Underlying failure.
		#[source]
		source: Box<SeedingError>,
	},
}

impl SeedingError {
	/// Wrap an error raised while installing `path`.
	///
	/// Errors that already name a fixture are returned unchanged.
	pub fn installing(path: impl Into<PathBuf>, error: SeedingError) -> Self {
		match error {
			SeedingError::FixtureInstall { .. } => error,
			other => SeedingError::FixtureInstall {
				path: path.into(),
				source: Box::new(other),
			},
		}
	}
}

/// Result type alias for seeding operations.
pub type SeedingResult<T> = Result<T, SeedingError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_model_not_found_error() {
		let error = SeedingError::ModelNotFound("auth.User".to_string());
		assert_eq!(error.to_string(), "Invalid model identifier: 'auth.User'");
	}

	#[rstest]
	fn test_validation_error() {
		let error = SeedingError::ValidationError {
			field: "model".to_string(),
			message: "must be in 'app.Model' format".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"Validation error: model: must be in 'app.Model' format"
		);
	}

	#[rstest]
	fn test_installing_wraps_once() {
		let inner = SeedingError::ParseError("Expected array or object".to_string());
		let wrapped = SeedingError::installing("/fixtures/bad.json", inner);
		assert_eq!(
			wrapped.to_string(),
			"Problem installing fixture '/fixtures/bad.json': Parse error: Expected array or object"
		);

		let rewrapped = SeedingError::installing("/other.json", wrapped);
		assert!(rewrapped.to_string().contains("/fixtures/bad.json"));
	}

	#[rstest]
	fn test_database_error_from() {
		let seeding_error: SeedingError = DatabaseError::DoesNotExist.into();
		assert!(matches!(seeding_error, SeedingError::Database(_)));
	}

	#[rstest]
	fn test_json_error_from() {
		let json_error: serde_json::Error =
			serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
		let seeding_error: SeedingError = json_error.into();
		assert!(matches!(seeding_error, SeedingError::JsonError(_)));
	}
}
