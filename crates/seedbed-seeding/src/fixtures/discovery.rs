//! Fixture discovery.
//!
//! Fixture files are searched for in every installed app's `fixtures/`
//! directory, then in the configured fixture directories, then in the
//! current directory.

use std::path::{Path, PathBuf};

use seedbed_db::Apps;
use tracing::debug;

use super::label::FixtureLabel;
use crate::error::{SeedingError, SeedingResult};

/// Locates fixture files for labels.
#[derive(Debug, Clone)]
pub struct FixtureFinder {
	apps: Apps,
	fixture_dirs: Vec<PathBuf>,
	current_dir: Option<PathBuf>,
}

impl FixtureFinder {
	/// Creates a finder over the installed apps and extra fixture directories.
	pub fn new(apps: Apps, fixture_dirs: Vec<PathBuf>) -> Self {
		Self {
			apps,
			fixture_dirs,
			current_dir: None,
		}
	}

	/// Searches `dir` last instead of the process working directory.
	pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.current_dir = Some(dir.into());
		self
	}

	/// Directories searched for relative labels, in order, without duplicates.
	pub fn fixture_dirs(&self) -> Vec<PathBuf> {
		let mut dirs: Vec<PathBuf> = self
			.apps
			.app_configs()
			.iter()
			.map(|app| app.fixtures_dir())
			.filter(|dir| dir.is_dir())
			.collect();
		dirs.extend(self.fixture_dirs.iter().cloned());
		match &self.current_dir {
			Some(dir) => dirs.push(dir.clone()),
			None => {
				if let Ok(dir) = std::env::current_dir() {
					dirs.push(dir);
				}
			}
		}

		let mut unique: Vec<PathBuf> = Vec::with_capacity(dirs.len());
		for dir in dirs {
			let dir = std::fs::canonicalize(&dir).unwrap_or(dir);
			if !unique.contains(&dir) {
				unique.push(dir);
			}
		}
		unique
	}

	/// Finds the files matching a label for the given database alias.
	///
	/// At most one file per directory may match. An empty result means the
	/// fixture does not exist.
	pub fn find(&self, label: &FixtureLabel, database: &str) -> SeedingResult<Vec<PathBuf>> {
		let search_dirs: Vec<PathBuf> = match &label.dir {
			Some(dir) if label.is_absolute() => vec![dir.clone()],
			Some(dir) => self.fixture_dirs().iter().map(|d| d.join(dir)).collect(),
			None => self.fixture_dirs(),
		};
		let targets = label.targets(database);

		let mut found = Vec::new();
		for dir in &search_dirs {
			debug!(dir = %dir.display(), fixture = %label.name, "checking for fixtures");
			let matches = Self::matches_in_dir(dir, &targets)?;
			if matches.len() > 1 {
				return Err(SeedingError::MultipleFixtures {
					name: label.name.clone(),
					dir: dir.clone(),
				});
			}
			match matches.into_iter().next() {
				Some(path) => found.push(path),
				None => debug!(dir = %dir.display(), fixture = %label.name, "no fixture in directory"),
			}
		}
		Ok(found)
	}

	fn matches_in_dir(dir: &Path, targets: &[String]) -> SeedingResult<Vec<PathBuf>> {
		let entries = match std::fs::read_dir(dir) {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};
		let mut matches = Vec::new();
		for entry in entries {
			let entry = entry?;
			let is_target = entry
				.file_name()
				.to_str()
				.is_some_and(|name| targets.iter().any(|target| target == name));
			if is_target && entry.path().is_file() {
				matches.push(entry.path());
			}
		}
		matches.sort();
		Ok(matches)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use seedbed_db::AppConfig;
	use std::fs;
	use tempfile::TempDir;

	fn app_with_fixtures(root: &Path, label: &str, files: &[&str]) -> AppConfig {
		let app_dir = root.join(label);
		fs::create_dir_all(app_dir.join("fixtures")).unwrap();
		for file in files {
			fs::write(app_dir.join("fixtures").join(file), "[]").unwrap();
		}
		AppConfig::new(label, app_dir)
	}

	#[rstest]
	fn test_finds_app_fixture() {
		let root = TempDir::new().unwrap();
		let apps = Apps::from_configs([app_with_fixtures(root.path(), "news", &["fixture1.json"])])
			.unwrap();
		let finder = FixtureFinder::new(apps, vec![]).with_current_dir(root.path());

		let label = FixtureLabel::parse("fixture1.json").unwrap();
		let found = finder.find(&label, "default").unwrap();
		assert_eq!(found.len(), 1);
		assert!(found[0].ends_with("news/fixtures/fixture1.json"));
	}

	#[rstest]
	fn test_missing_fixture_is_empty() {
		let root = TempDir::new().unwrap();
		let finder = FixtureFinder::new(Apps::new(), vec![]).with_current_dir(root.path());
		let label = FixtureLabel::parse("unknown.json").unwrap();
		assert!(finder.find(&label, "default").unwrap().is_empty());
	}

	#[rstest]
	fn test_multiple_matches_in_one_dir() {
		let root = TempDir::new().unwrap();
		let apps = Apps::from_configs([app_with_fixtures(
			root.path(),
			"news",
			&["seed.json", "seed.json.gz"],
		)])
		.unwrap();
		let finder = FixtureFinder::new(apps, vec![]).with_current_dir(root.path());
		let label = FixtureLabel::parse("seed").unwrap();
		assert!(matches!(
			finder.find(&label, "default"),
			Err(SeedingError::MultipleFixtures { .. })
		));
	}

	#[rstest]
	fn test_database_specific_file_matches() {
		let root = TempDir::new().unwrap();
		let apps = Apps::from_configs([app_with_fixtures(
			root.path(),
			"news",
			&["seed.other.json"],
		)])
		.unwrap();
		let finder = FixtureFinder::new(apps, vec![]).with_current_dir(root.path());
		let label = FixtureLabel::parse("seed.json").unwrap();
		assert!(finder.find(&label, "default").unwrap().is_empty());
		assert_eq!(finder.find(&label, "other").unwrap().len(), 1);
	}

	#[rstest]
	fn test_configured_dirs_follow_app_dirs() {
		let root = TempDir::new().unwrap();
		let extra = root.path().join("extra");
		fs::create_dir_all(&extra).unwrap();
		fs::write(extra.join("seed.json"), "[]").unwrap();
		let apps = Apps::from_configs([app_with_fixtures(root.path(), "news", &["seed.json"])])
			.unwrap();
		let finder = FixtureFinder::new(apps, vec![extra]).with_current_dir(root.path());

		let found = finder
			.find(&FixtureLabel::parse("seed.json").unwrap(), "default")
			.unwrap();
		assert_eq!(found.len(), 2);
		assert!(found[0].ends_with("news/fixtures/seed.json"));
		assert!(found[1].ends_with("extra/seed.json"));
	}

	#[rstest]
	fn test_relative_label_with_directory() {
		let root = TempDir::new().unwrap();
		let nested = root.path().join("backups");
		fs::create_dir_all(&nested).unwrap();
		fs::write(nested.join("seed.json"), "[]").unwrap();
		let finder = FixtureFinder::new(Apps::new(), vec![]).with_current_dir(root.path());

		let found = finder
			.find(&FixtureLabel::parse("backups/seed.json").unwrap(), "default")
			.unwrap();
		assert_eq!(found.len(), 1);
	}

	#[rstest]
	fn test_absolute_label_searches_only_its_dir() {
		let root = TempDir::new().unwrap();
		fs::write(root.path().join("seed.json"), "[]").unwrap();
		let path = root.path().join("seed.json");
		let finder = FixtureFinder::new(Apps::new(), vec![]);

		let label = FixtureLabel::parse(path.to_str().unwrap()).unwrap();
		assert_eq!(finder.find(&label, "default").unwrap(), vec![path]);
	}
}
