//! Fixture loading and dumping for seedbed.
//!
//! This crate provides Django-compatible fixture support:
//!
//! - **Fixture System**: find fixture files by label, parse them and install
//!   their objects with raw saves
//! - **Commands**: typed `loaddata` and `dumpdata` commands
//!
//! # Features
//!
//! - `json` - JSON fixture format support (enabled by default)
//! - `yaml` - YAML fixture format support
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! Create a fixture file in an app's `fixtures/` directory
//! (`news/fixtures/fixture1.json`):
//!
//! ```json
//! [
//!   {
//!     "model": "news.article",
//!     "pk": 2,
//!     "fields": {
//!       "headline": "Poker has no place on ESPN",
//!       "pub_date": "2006-06-16 12:00:00"
//!     }
//!   }
//! ]
//! ```
//!
//! Load it by label:
//!
//! ```ignore
//! use seedbed_seeding::prelude::*;
//!
//! let loader = FixtureLoader::new(conn, apps)
//!     .with_options(LoadOptions::new().with_verbosity(0));
//! let result = loader.load_labels(&["fixture1"]).await?;
//! assert_eq!(result.loaded_object_count, 1);
//! ```
//!
//! # Fixture lookup
//!
//! A label is `name[.format][.compression]`. Files are searched for in each
//! installed app's `fixtures/` directory, then in the configured fixture
//! directories, then in the current directory. A file may also name the
//! database alias it belongs to (`fixture1.default.json`). A label that
//! matches no file is not an error: the load records a warning and
//! continues.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod commands;
pub mod error;
pub mod fixtures;
pub mod prelude;

// Re-export commonly used types at crate root
pub use error::{SeedingError, SeedingResult};
pub use fixtures::{
	FixtureData, FixtureFormat, FixtureLabel, FixtureLoader, FixtureParser, FixtureRecord,
	LoadOptions, LoadResult,
};
