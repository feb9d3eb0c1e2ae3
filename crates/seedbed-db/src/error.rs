//! Error types for database operations.

use thiserror::Error;

/// Errors raised by the connection, transaction manager and ORM layer.
#[derive(Debug, Error)]
pub enum DatabaseError {
	/// Error reported by the SQLite driver.
	#[error("SQL error: {0}")]
	Sqlx(#[from] sqlx::Error),

	/// Column was not present in a fetched row.
	#[error("Column not found: {0}")]
	ColumnNotFound(String),

	/// A value could not be converted to the requested type.
	#[error("Type error: {0}")]
	TypeError(String),

	/// Invalid transaction state transition.
	#[error("Transaction error: {0}")]
	TransactionError(String),

	/// Model is not registered with the app registry.
	#[error("Model not found: {0}")]
	ModelNotFound(String),

	/// App label is not registered with the app registry.
	#[error("App not found: {0}")]
	AppNotFound(String),

	/// Model has no field with the given name.
	#[error("{model} has no field named '{field}'")]
	FieldNotFound {
		/// Model label.
		model: String,
		/// Requested field name.
		field: String,
	},

	/// A field value failed validation or coercion.
	#[error("Validation error: {field}: {message}")]
	ValidationError {
		/// Field that failed validation.
		field: String,
		/// Validation error message.
		message: String,
	},

	/// Registry or configuration problem.
	#[error("Improperly configured: {0}")]
	ImproperlyConfigured(String),

	/// Query returned no row where one was required.
	#[error("Query returned no rows")]
	DoesNotExist,
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_field_not_found_message() {
		let error = DatabaseError::FieldNotFound {
			model: "fixtures_model_package.Article".to_string(),
			field: "title".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"fixtures_model_package.Article has no field named 'title'"
		);
	}

	#[rstest]
	fn test_sqlx_error_from() {
		let error: DatabaseError = sqlx::Error::RowNotFound.into();
		assert!(matches!(error, DatabaseError::Sqlx(_)));
	}
}
