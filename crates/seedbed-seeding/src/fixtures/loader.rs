//! Fixture loading.
//!
//! [`FixtureLoader`] resolves fixture labels to files, deserializes their
//! records and saves them with raw saves, inside one atomic block unless
//! the caller manages the transaction.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use seedbed_db::{Apps, DatabaseConnection};
use tracing::{debug, info, warn};

use super::deserializer::Deserializer;
use super::discovery::FixtureFinder;
use super::format::{FixtureData, FixtureFormat, FixtureRecord};
use super::label::FixtureLabel;
use super::parser::FixtureParser;
use crate::error::{SeedingError, SeedingResult};

/// Name of the fixture applied after schema creation and after a flush.
pub const INITIAL_DATA: &str = "initial_data";

/// Options controlling a fixture load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
	/// Only save records of these apps. Empty means every app.
	pub app_labels: Vec<String>,

	/// Skip fields the model does not have.
	pub ignore_nonexistent: bool,

	/// Run the load in its own atomic block unless the caller already
	/// manages the transaction. When false, statements run in whatever
	/// transaction the caller holds.
	pub commit: bool,

	/// 0 = silent, 1 = summary, 2 = per-fixture progress.
	pub verbosity: u8,

	/// Searched after the apps' `fixtures/` directories.
	pub fixture_dirs: Vec<PathBuf>,

	/// Database alias used to match alias-specific fixture files.
	/// Defaults to the connection's alias.
	pub database: Option<String>,

	/// Omit the summary when no fixture was found.
	pub hide_empty: bool,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			app_labels: Vec::new(),
			ignore_nonexistent: false,
			commit: true,
			verbosity: 1,
			fixture_dirs: Vec::new(),
			database: None,
			hide_empty: false,
		}
	}
}

impl LoadOptions {
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

	pub fn with_verbosity(mut self, verbosity: u8) -> Self {
		self.verbosity = verbosity;
		self
	}

	pub fn with_fixture_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
		self.fixture_dirs = dirs;
		self
	}

	pub fn with_database(mut self, database: impl Into<String>) -> Self {
		self.database = Some(database.into());
		self
	}

	pub fn with_hide_empty(mut self, hide_empty: bool) -> Self {
		self.hide_empty = hide_empty;
		self
	}
}

/// Outcome of a fixture load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
	/// Fixture files installed.
	pub fixture_count: usize,
	/// Objects saved.
	pub loaded_object_count: usize,
	/// Objects found in the fixture files, saved or not.
	pub fixture_object_count: usize,
	/// Labels of the models that received objects.
	pub models: BTreeSet<String>,
	/// Non-fatal problems, such as missing fixtures.
	pub warnings: Vec<String>,
	/// Progress and summary lines for the configured verbosity.
	pub messages: Vec<String>,
}

impl LoadResult {
	/// `Installed N object(s) from M fixture(s)`
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_seeding::fixtures::LoadResult;
	///
	/// let result = LoadResult {
	///     fixture_count: 1,
	///     loaded_object_count: 1,
	///     fixture_object_count: 3,
	///     ..Default::default()
	/// };
	/// assert_eq!(result.summary(), "Installed 1 object(s) (of 3) from 1 fixture(s)");
	/// ```
	pub fn summary(&self) -> String {
		if self.fixture_object_count == self.loaded_object_count {
			format!(
				"Installed {} object(s) from {} fixture(s)",
				self.loaded_object_count, self.fixture_count
			)
		} else {
			format!(
				"Installed {} object(s) (of {}) from {} fixture(s)",
				self.loaded_object_count, self.fixture_object_count, self.fixture_count
			)
		}
	}

	fn warn(&mut self, message: String) {
		warn!("{}", message);
		self.warnings.push(message);
	}
}

/// Loads fixtures into a database.
#[derive(Debug, Clone)]
pub struct FixtureLoader {
	conn: DatabaseConnection,
	apps: Apps,
	options: LoadOptions,
	parser: FixtureParser,
	current_dir: Option<PathBuf>,
}

impl FixtureLoader {
	/// Creates a loader with default options.
	pub fn new(conn: DatabaseConnection, apps: Apps) -> Self {
		Self {
			conn,
			apps,
			options: LoadOptions::default(),
			parser: FixtureParser::new(),
			current_dir: None,
		}
	}

	pub fn with_options(mut self, options: LoadOptions) -> Self {
		self.options = options;
		self
	}

	/// Searches `dir` last instead of the process working directory.
	pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.current_dir = Some(dir.into());
		self
	}

	pub fn options(&self) -> &LoadOptions {
		&self.options
	}

	fn database(&self) -> &str {
		self.options
			.database
			.as_deref()
			.unwrap_or_else(|| self.conn.alias())
	}

	fn finder(&self) -> FixtureFinder {
		let finder = FixtureFinder::new(self.apps.clone(), self.options.fixture_dirs.clone());
		match &self.current_dir {
			Some(dir) => finder.with_current_dir(dir),
			None => finder,
		}
	}

	fn deserializer(&self) -> Deserializer {
		Deserializer::new(self.apps.clone()).ignore_nonexistent(self.options.ignore_nonexistent)
	}

	/// Loads the fixtures named by `labels`.
	///
	/// A label that matches no file records a warning and loading continues.
	/// Any other failure aborts the load.
	pub async fn load_labels(&self, labels: &[&str]) -> SeedingResult<LoadResult> {
		if labels.is_empty() {
			return Err(SeedingError::ValidationError {
				field: "fixture_labels".to_string(),
				message: "No database fixture specified. Please provide the path of at least one fixture in the command line.".to_string(),
			});
		}
		let mut result = self
			.in_load_transaction(async {
				let mut result = LoadResult::default();
				for label in labels {
					self.load_label(label, &mut result).await?;
				}
				Ok(result)
			})
			.await?;
		self.summarize(&mut result);
		Ok(result)
	}

	/// Loads fixture files by path, bypassing discovery.
	pub async fn load_from_paths(&self, paths: &[&Path]) -> SeedingResult<LoadResult> {
		let mut result = self
			.in_load_transaction(async {
				let mut result = LoadResult::default();
				for path in paths {
					if !path.exists() {
						return Err(SeedingError::FileNotFound(path.display().to_string()));
					}
					let name = fixture_name(path);
					self.install_file(path, &name, &mut result)
						.await
						.map_err(|e| SeedingError::installing(*path, e))?;
				}
				Ok(result)
			})
			.await?;
		self.summarize(&mut result);
		Ok(result)
	}

	/// Loads one fixture file by path.
	pub async fn load_from_path(&self, path: &Path) -> SeedingResult<LoadResult> {
		self.load_from_paths(&[path]).await
	}

	/// Saves already parsed records in the caller's transaction.
	///
	/// Returns the number of objects saved.
	pub async fn load_data(&self, data: &FixtureData) -> SeedingResult<usize> {
		let mut result = LoadResult::default();
		self.save_records(data, &mut result).await?;
		Ok(result.loaded_object_count)
	}

	async fn in_load_transaction<F>(&self, load: F) -> SeedingResult<LoadResult>
	where
		F: std::future::Future<Output = SeedingResult<LoadResult>>,
	{
		if !self.options.commit {
			return load.await;
		}
		match self.conn.commit_on_success_unless_managed().await? {
			Some(atomic) => atomic.finish(load.await).await,
			None => load.await,
		}
	}

	async fn load_label(&self, label: &str, result: &mut LoadResult) -> SeedingResult<()> {
		let label = FixtureLabel::parse(label)?;
		if self.options.verbosity >= 2 {
			result
				.messages
				.push(format!("Loading '{}' fixtures...", label.name));
		}

		let files = self.finder().find(&label, self.database())?;
		if files.is_empty() {
			if label.name != INITIAL_DATA {
				result.warn(format!("No fixture named '{}' found.", label.name));
			} else {
				debug!("no initial_data fixture");
			}
			return Ok(());
		}

		for path in files {
			self.install_file(&path, &label.name, result)
				.await
				.map_err(|e| SeedingError::installing(&path, e))?;
		}
		Ok(())
	}

	async fn install_file(
		&self,
		path: &Path,
		name: &str,
		result: &mut LoadResult,
	) -> SeedingResult<()> {
		if self.options.verbosity >= 2 {
			result.messages.push(format!(
				"Installing {} fixture '{}' from {}.",
				FixtureFormat::from_path(path).unwrap_or_default(),
				name,
				path.parent().unwrap_or(path).display()
			));
		}
		let data = self.parser.parse_file(path)?;
		result.fixture_count += 1;

		let before = result.fixture_object_count;
		self.save_records(&data, result).await?;
		if result.fixture_object_count == before {
			result.warn(format!(
				"No fixture data found for '{}'. (File format may be invalid.)",
				name
			));
		}
		Ok(())
	}

	async fn save_records(&self, data: &FixtureData, result: &mut LoadResult) -> SeedingResult<()> {
		let deserializer = self.deserializer();
		result.fixture_object_count += data.len();
		let records: Vec<&FixtureRecord> = if self.options.app_labels.is_empty() {
			data.iter().collect()
		} else {
			let labels: Vec<&str> = self.options.app_labels.iter().map(String::as_str).collect();
			data.filter_by_app(&labels)
		};
		for record in records {
			let instance = deserializer.deserialize(record)?;
			instance.save_raw(&self.conn).await?;
			result.loaded_object_count += 1;
			result.models.insert(instance.meta.label());
		}
		Ok(())
	}

	fn summarize(&self, result: &mut LoadResult) {
		if result.fixture_count == 0 && self.options.hide_empty {
			return;
		}
		let summary = result.summary();
		info!(
			fixtures = result.fixture_count,
			objects = result.loaded_object_count,
			"{}",
			summary
		);
		if self.options.verbosity >= 1 {
			result.messages.push(summary);
		}
	}
}

/// Fixture name of a file: its file name without format and compression
/// extensions.
fn fixture_name(path: &Path) -> String {
	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	match FixtureLabel::parse(&file_name) {
		Ok(label) => label.name,
		Err(_) => file_name,
	}
}
