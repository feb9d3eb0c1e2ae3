//! Fixture labels.
//!
//! A label names a fixture the way users type it on the command line:
//! `name[.format][.compression]`, optionally with a directory component.
//! Files may additionally carry a database alias between the name and the
//! format (`name.alias.format`) to restrict them to one database.

use std::path::{Path, PathBuf};

use super::format::{Compression, FixtureFormat};
use crate::error::{SeedingError, SeedingResult};

/// A parsed fixture label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLabel {
	/// Directory component of the label, if any.
	pub dir: Option<PathBuf>,
	/// File name without format and compression extensions.
	pub name: String,
	/// Requested serialization format; `None` accepts every available one.
	pub format: Option<FixtureFormat>,
	/// Requested compression; `None` accepts every one.
	pub compression: Option<Compression>,
}

impl FixtureLabel {
	/// Parses a label.
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_seeding::fixtures::{Compression, FixtureFormat, FixtureLabel};
	///
	/// let label = FixtureLabel::parse("fixture1.json").unwrap();
	/// assert_eq!(label.name, "fixture1");
	/// assert_eq!(label.format, Some(FixtureFormat::Json));
	/// assert_eq!(label.compression, None);
	///
	/// let label = FixtureLabel::parse("backup/initial_data.json.gz").unwrap();
	/// assert_eq!(label.name, "initial_data");
	/// assert_eq!(label.compression, Some(Compression::Gzip));
	///
	/// assert!(FixtureLabel::parse("fixture1.xml").is_err());
	/// ```
	pub fn parse(label: &str) -> SeedingResult<Self> {
		let path = Path::new(label);
		let file_name = path
			.file_name()
			.and_then(|name| name.to_str())
			.ok_or_else(|| SeedingError::ValidationError {
				field: "fixture_label".to_string(),
				message: format!("'{}' does not name a fixture", label),
			})?;
		let dir = path
			.parent()
			.filter(|parent| !parent.as_os_str().is_empty())
			.map(Path::to_path_buf);

		let mut parts: Vec<&str> = file_name.rsplitn(3, '.').collect();
		parts.reverse();

		let compression = match parts.as_slice() {
			[.., ext] if parts.len() > 1 => Compression::from_extension(ext),
			_ => None,
		};
		if compression.is_some() {
			parts.pop();
		}

		let format = if parts.len() > 1 {
			let ext = parts[parts.len() - 1];
			match FixtureFormat::from_extension(ext).filter(FixtureFormat::is_available) {
				Some(format) => {
					parts.pop();
					Some(format)
				}
				None => {
					return Err(SeedingError::UnknownFormat {
						name: parts[..parts.len() - 1].join("."),
						format: ext.to_string(),
					});
				}
			}
		} else {
			None
		};

		Ok(Self {
			dir,
			name: parts.join("."),
			format,
			compression,
		})
	}

	/// Returns true when the label is an absolute path.
	pub fn is_absolute(&self) -> bool {
		self.dir.as_deref().is_some_and(Path::is_absolute)
	}

	/// File names that satisfy this label for the given database alias.
	///
	/// Names carrying the alias come first, then the alias-free ones.
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_seeding::fixtures::FixtureLabel;
	///
	/// let label = FixtureLabel::parse("fixture1.json").unwrap();
	/// assert_eq!(
	///     label.targets("default"),
	///     vec![
	///         "fixture1.default.json",
	///         "fixture1.default.json.gz",
	///         "fixture1.json",
	///         "fixture1.json.gz",
	///     ]
	/// );
	/// ```
	pub fn targets(&self, database: &str) -> Vec<String> {
		let formats = match self.format {
			Some(format) => vec![format],
			None => FixtureFormat::available(),
		};
		let compressions = match self.compression {
			Some(compression) => vec![compression],
			None => Compression::all().to_vec(),
		};

		let mut targets = Vec::new();
		for alias in [Some(database), None] {
			for format in &formats {
				for ext in format.extensions() {
					for compression in &compressions {
						let mut name = self.name.clone();
						for part in [alias.unwrap_or(""), ext, compression.extension()] {
							if !part.is_empty() {
								name.push('.');
								name.push_str(part);
							}
						}
						targets.push(name);
					}
				}
			}
		}
		targets
	}
}

impl std::fmt::Display for FixtureLabel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_bare_name_accepts_every_format() {
		let label = FixtureLabel::parse("initial_data").unwrap();
		assert_eq!(label.name, "initial_data");
		assert_eq!(label.format, None);
		assert!(label.targets("default").contains(&"initial_data.json".to_string()));
		assert!(
			label
				.targets("default")
				.contains(&"initial_data.default.json.gz".to_string())
		);
	}

	#[rstest]
	fn test_compression_only() {
		let label = FixtureLabel::parse("dump.gz").unwrap();
		assert_eq!(label.name, "dump");
		assert_eq!(label.format, None);
		assert_eq!(label.compression, Some(Compression::Gzip));
		assert!(label.targets("other").contains(&"dump.other.json.gz".to_string()));
		assert!(!label.targets("other").contains(&"dump.json".to_string()));
	}

	#[rstest]
	fn test_unknown_format_names_fixture() {
		let err = FixtureLabel::parse("fixture1.csv").unwrap_err();
		assert_eq!(
			err.to_string(),
			"Problem installing fixture 'fixture1': csv is not a known serialization format."
		);
	}

	#[rstest]
	fn test_dotted_name_keeps_alias_part() {
		let label = FixtureLabel::parse("fixture1.default.json").unwrap();
		assert_eq!(label.name, "fixture1.default");
		assert!(label.targets("default").contains(&"fixture1.default.json".to_string()));
	}

	#[rstest]
	fn test_directory_component() {
		let label = FixtureLabel::parse("nested/fixture2.json").unwrap();
		assert_eq!(label.dir, Some(PathBuf::from("nested")));
		assert!(!label.is_absolute());

		let label = FixtureLabel::parse("/srv/fixtures/fixture2.json").unwrap();
		assert!(label.is_absolute());
	}

	#[cfg(feature = "yaml")]
	#[rstest]
	fn test_yaml_label_accepts_yml_files() {
		let label = FixtureLabel::parse("seed.yaml").unwrap();
		assert!(label.targets("default").contains(&"seed.yml".to_string()));
	}
}
