//! Database configuration
//!
//! This module provides the `DatabaseConfig` struct used to open a
//! [`DatabaseConnection`](crate::connection::DatabaseConnection).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Alias of the database used when none is specified.
pub const DEFAULT_DB_ALIAS: &str = "default";

const SQLITE_ENGINE: &str = "seedbed.db.backends.sqlite3";
const MEMORY_NAME: &str = ":memory:";

/// Database configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
	/// Connection alias. Database-specific fixtures are matched against it.
	#[serde(default = "default_alias")]
	pub alias: String,

	/// Database engine/backend
	pub engine: String,

	/// Database name or path
	pub name: String,

	/// Additional options
	#[serde(default)]
	pub options: HashMap<String, String>,
}

fn default_alias() -> String {
	DEFAULT_DB_ALIAS.to_string()
}

impl DatabaseConfig {
	/// Create a SQLite database configuration
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::config::DatabaseConfig;
	///
	/// let db = DatabaseConfig::sqlite("myapp.db");
	///
	/// assert_eq!(db.engine, "seedbed.db.backends.sqlite3");
	/// assert_eq!(db.name, "myapp.db");
	/// assert_eq!(db.alias, "default");
	/// ```
	pub fn sqlite(name: impl Into<String>) -> Self {
		Self {
			alias: default_alias(),
			engine: SQLITE_ENGINE.to_string(),
			name: name.into(),
			options: HashMap::new(),
		}
	}

	/// Create an in-memory SQLite configuration
	pub fn sqlite_memory() -> Self {
		Self::sqlite(MEMORY_NAME)
	}

	/// Parse a `sqlite:` URL
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::config::DatabaseConfig;
	///
	/// let db = DatabaseConfig::from_url("sqlite:data/app.db").unwrap();
	/// assert_eq!(db.name, "data/app.db");
	///
	/// let db = DatabaseConfig::from_url("sqlite::memory:").unwrap();
	/// assert!(db.is_memory());
	///
	/// assert!(DatabaseConfig::from_url("postgres://localhost/app").is_none());
	/// ```
	pub fn from_url(url: &str) -> Option<Self> {
		let rest = url.strip_prefix("sqlite:")?;
		let name = rest.strip_prefix("//").unwrap_or(rest);
		if name.is_empty() {
			return None;
		}
		Some(Self::sqlite(name))
	}

	/// Set the connection alias
	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = alias.into();
		self
	}

	/// Add a backend option
	pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.options.insert(key.into(), value.into());
		self
	}

	/// Returns true for in-memory databases
	pub fn is_memory(&self) -> bool {
		self.name == MEMORY_NAME
	}

	/// Convert DatabaseConfig to a connection URL
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::config::DatabaseConfig;
	///
	/// assert_eq!(DatabaseConfig::sqlite("db.sqlite3").to_url(), "sqlite:db.sqlite3");
	/// assert_eq!(DatabaseConfig::sqlite_memory().to_url(), "sqlite::memory:");
	/// ```
	pub fn to_url(&self) -> String {
		format!("sqlite:{}", self.name)
	}
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self::sqlite_memory()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_deserialize_with_default_alias() {
		let config: DatabaseConfig = serde_json::from_str(
			r#"{"engine": "seedbed.db.backends.sqlite3", "name": "app.db"}"#,
		)
		.unwrap();
		assert_eq!(config.alias, DEFAULT_DB_ALIAS);
		assert!(config.options.is_empty());
	}

	#[rstest]
	fn test_with_alias() {
		let config = DatabaseConfig::sqlite_memory().with_alias("other");
		assert_eq!(config.alias, "other");
		assert!(config.is_memory());
	}

	#[rstest]
	fn test_from_url_double_slash() {
		let config = DatabaseConfig::from_url("sqlite://tmp/app.db").unwrap();
		assert_eq!(config.name, "tmp/app.db");
	}
}
