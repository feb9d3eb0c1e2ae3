//! loaddata command implementation.
//!
//! This command installs fixtures, named by label, into the database.

use std::path::PathBuf;

use seedbed_db::{Apps, DatabaseConnection};

use crate::error::SeedingResult;
use crate::fixtures::{FixtureLoader, LoadOptions, LoadResult};

/// Arguments for the loaddata command.
#[derive(Debug, Clone, Default)]
pub struct LoadDataArgs {
	/// Fixture labels to load (`fixture1`, `fixture1.json`, `dir/seed.json.gz`).
	pub fixture_labels: Vec<String>,
}

impl LoadDataArgs {
	pub fn new<I, S>(labels: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			fixture_labels: labels.into_iter().map(Into::into).collect(),
		}
	}
}

/// Options for the loaddata command.
#[derive(Debug, Clone)]
pub struct LoadDataOptions {
	/// Only load objects of these apps.
	pub app_labels: Vec<String>,

	/// Skip fields that no longer exist on the model.
	pub ignore_nonexistent: bool,

	/// Run the load in its own transaction unless one is already managed.
	pub commit: bool,

	/// Database alias to match alias-specific fixture files against.
	pub database: Option<String>,

	/// Verbosity level.
	pub verbosity: u8,

	/// Extra fixture directories.
	pub fixture_dirs: Vec<PathBuf>,
}

impl Default for LoadDataOptions {
	fn default() -> Self {
		Self {
			app_labels: Vec::new(),
			ignore_nonexistent: false,
			commit: true,
			database: None,
			verbosity: 1,
			fixture_dirs: Vec::new(),
		}
	}
}

impl LoadDataOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_app_labels(mut self, labels: Vec<String>) -> Self {
		self.app_labels = labels;
		self
	}

	pub fn with_ignore_nonexistent(mut self, ignore: bool) -> Self {
		self.ignore_nonexistent = ignore;
		self
	}

	pub fn with_commit(mut self, commit: bool) -> Self {
		self.commit = commit;
		self
	}

	pub fn with_database(mut self, db: impl Into<String>) -> Self {
		self.database = Some(db.into());
		self
	}

	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}

	pub fn with_fixture_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
		self.fixture_dirs = dirs;
		self
	}
}

impl From<LoadDataOptions> for LoadOptions {
	fn from(options: LoadDataOptions) -> Self {
		LoadOptions {
			app_labels: options.app_labels,
			ignore_nonexistent: options.ignore_nonexistent,
			commit: options.commit,
			verbosity: options.verbosity,
			fixture_dirs: options.fixture_dirs,
			database: options.database,
			hide_empty: false,
		}
	}
}

/// The loaddata command for loading fixtures into the database.
///
/// # Example
///
/// ```ignore
/// let command = LoadDataCommand::new(conn, apps);
/// let args = LoadDataArgs::new(["fixture1.json"]);
/// let result = command.execute(args, LoadDataOptions::new().with_verbosity(0)).await?;
/// assert!(result.warnings.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LoadDataCommand {
	conn: DatabaseConnection,
	apps: Apps,
}

impl LoadDataCommand {
	pub fn new(conn: DatabaseConnection, apps: Apps) -> Self {
		Self { conn, apps }
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"loaddata"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Installs the named fixture(s) in the database"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: loaddata [options] fixture [fixture ...]

Installs the named fixture(s) in the database.

Arguments:
  fixture              One or more fixture labels to load

Options:
  --app LABEL          Only load objects for the specified app(s)
  --ignorenonexistent  Ignore fields in fixtures that no longer exist on the model
  --database DB        Database alias to load fixtures into
  --verbosity LEVEL    Verbosity level (0=minimal, 1=normal, 2=verbose)
"#
	}

	/// Executes the loaddata command.
	pub async fn execute(
		&self,
		args: LoadDataArgs,
		options: LoadDataOptions,
	) -> SeedingResult<LoadResult> {
		let verbosity = options.verbosity;
		let loader = FixtureLoader::new(self.conn.clone(), self.apps.clone())
			.with_options(options.into());
		let labels: Vec<&str> = args.fixture_labels.iter().map(String::as_str).collect();

		let result = loader.load_labels(&labels).await?;

		if verbosity > 0 {
			for message in &result.messages {
				println!("{}", message);
			}
		}

		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::SeedingError;
	use rstest::rstest;

	#[rstest]
	fn test_options_builder() {
		let options = LoadDataOptions::new()
			.with_app_labels(vec!["news".to_string()])
			.with_ignore_nonexistent(true)
			.with_commit(false)
			.with_database("secondary")
			.with_verbosity(2);

		let load: LoadOptions = options.into();
		assert_eq!(load.app_labels, vec!["news".to_string()]);
		assert!(load.ignore_nonexistent);
		assert!(!load.commit);
		assert_eq!(load.database, Some("secondary".to_string()));
		assert_eq!(load.verbosity, 2);
	}

	#[rstest]
	fn test_execute_without_labels() {
		tokio_test::block_on(async {
			let conn = DatabaseConnection::connect_memory().await.unwrap();
			let cmd = LoadDataCommand::new(conn, Apps::new());
			assert_eq!(cmd.name(), "loaddata");
			assert!(!cmd.help().is_empty());

			let result = cmd.execute(LoadDataArgs::default(), LoadDataOptions::new()).await;
			assert!(matches!(result, Err(SeedingError::ValidationError { .. })));
		});
	}
}
