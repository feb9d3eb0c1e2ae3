//! Project settings

use std::path::PathBuf;

use seedbed_db::DatabaseConfig;
use serde::{Deserialize, Serialize};

use crate::{CommandError, CommandResult};

/// Database URL override.
pub const DATABASE_URL_VAR: &str = "SEEDBED_DATABASE_URL";
/// Extra fixture directories, separated like `PATH`.
pub const FIXTURE_DIRS_VAR: &str = "SEEDBED_FIXTURE_DIRS";
pub const DEBUG_VAR: &str = "SEEDBED_DEBUG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
	#[serde(default = "default_database")]
	pub database: DatabaseConfig,

	/// Searched after the apps' `fixtures/` directories.
	#[serde(default)]
	pub fixture_dirs: Vec<PathBuf>,

	#[serde(default)]
	pub debug: bool,
}

fn default_database() -> DatabaseConfig {
	DatabaseConfig::sqlite("db.sqlite3")
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			database: default_database(),
			fixture_dirs: Vec::new(),
			debug: false,
		}
	}
}

impl Settings {
	pub fn new(database: DatabaseConfig) -> Self {
		Self {
			database,
			..Default::default()
		}
	}

	pub fn with_fixture_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
		self.fixture_dirs = dirs;
		self
	}

	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	/// Default settings overridden by `SEEDBED_*` environment variables.
	pub fn from_env() -> CommandResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Default settings overridden by the values `lookup` returns
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_commands::Settings;
	///
	/// let settings = Settings::from_lookup(|key| match key {
	///     "SEEDBED_DATABASE_URL" => Some("sqlite::memory:".to_string()),
	///     _ => None,
	/// })
	/// .unwrap();
	/// assert!(settings.database.is_memory());
	/// assert!(settings.fixture_dirs.is_empty());
	/// ```
	pub fn from_lookup<F>(lookup: F) -> CommandResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut settings = Self::default();
		if let Some(url) = lookup(DATABASE_URL_VAR) {
			settings.database = DatabaseConfig::from_url(&url).ok_or_else(|| {
				CommandError::ImproperlyConfigured(format!(
					"{} must be a sqlite: URL, got '{}'",
					DATABASE_URL_VAR, url
				))
			})?;
		}
		if let Some(dirs) = lookup(FIXTURE_DIRS_VAR) {
			settings.fixture_dirs = std::env::split_paths(&dirs)
				.filter(|p| !p.as_os_str().is_empty())
				.collect();
		}
		if let Some(debug) = lookup(DEBUG_VAR) {
			settings.debug = matches!(debug.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on");
		}
		Ok(settings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashMap;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| vars.get(key).cloned()
	}

	#[rstest]
	fn test_defaults_without_environment() {
		let settings = Settings::from_lookup(lookup(&[])).unwrap();
		assert_eq!(settings, Settings::default());
		assert_eq!(settings.database.name, "db.sqlite3");
	}

	#[rstest]
	fn test_environment_overrides() {
		let dirs = std::env::join_paths(["/srv/fixtures", "/opt/seed"]).unwrap();
		let settings = Settings::from_lookup(lookup(&[
			(DATABASE_URL_VAR, "sqlite:data/app.db"),
			(FIXTURE_DIRS_VAR, dirs.to_str().unwrap()),
			(DEBUG_VAR, "true"),
		]))
		.unwrap();
		assert_eq!(settings.database.name, "data/app.db");
		assert_eq!(
			settings.fixture_dirs,
			vec![PathBuf::from("/srv/fixtures"), PathBuf::from("/opt/seed")]
		);
		assert!(settings.debug);
	}

	#[rstest]
	fn test_rejects_non_sqlite_url() {
		let result = Settings::from_lookup(lookup(&[(DATABASE_URL_VAR, "postgres://localhost/app")]));
		assert!(matches!(result, Err(CommandError::ImproperlyConfigured(_))));
	}

	#[rstest]
	fn test_deserialize_with_defaults() {
		let settings: Settings = serde_json::from_str(r#"{"fixture_dirs": ["seed"]}"#).unwrap();
		assert_eq!(settings.database.name, "db.sqlite3");
		assert_eq!(settings.fixture_dirs, vec![PathBuf::from("seed")]);
		assert!(!settings.debug);
	}
}
