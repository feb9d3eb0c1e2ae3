//! # Seedbed
//!
//! Django-style fixtures for Rust: models declared per app, fixture files
//! found by naming convention, and the management commands that install
//! them.
//!
//! ## Crates
//!
//! - [`db`]: SQLite connection, transactions, models, app registry and schema
//! - [`seeding`]: fixture discovery, parsing, loading and dumping
//! - [`commands`]: `migrate` (`syncdb`), `flush`, `loaddata`, `dumpdata`
//! - `test` (feature `test`): per-test databases and test cases
//!
//! ## Feature Flags
//!
//! - `json` (default) - JSON fixtures
//! - `yaml` - YAML fixtures (via `serde_yaml`)
//! - `test` - the `test` module
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use seedbed::prelude::*;
//!
//! let apps = Apps::from_configs([
//!     AppConfig::new("library", "apps/library").with_model::<Book>(),
//! ])?;
//! let project = Project::connect(Settings::from_env()?, apps).await?;
//!
//! // Create tables, then install apps/library/fixtures/initial_data.json
//! call_command(&project, "migrate", &CommandContext::default()).await?;
//!
//! // Install apps/library/fixtures/classics.json
//! let output = call_command(
//!     &project,
//!     "loaddata",
//!     &CommandContext::new(vec!["classics".to_string()]),
//! )
//! .await?;
//! ```

pub mod db {
	//! Database layer
	pub use seedbed_db::*;
}

pub mod seeding {
	//! Fixture loading and dumping
	pub use seedbed_seeding::*;
}

pub mod commands {
	//! Management commands
	pub use seedbed_commands::*;
}

#[cfg(feature = "test")]
pub mod test {
	//! Testing utilities
	pub use seedbed_test::*;
}

pub use seedbed_commands::{
	CommandContext, CommandError, CommandOutput, CommandResult, Project, Settings, call_command,
};
pub use seedbed_db::{
	AppConfig, Apps, DatabaseConfig, DatabaseConnection, DatabaseError, FieldDef, Model,
	ModelMeta, QuerySet, QueryValue, Row,
};
pub use seedbed_seeding::{FixtureLoader, LoadOptions, LoadResult, SeedingError};

pub mod prelude {
	//! Commonly used types
	pub use seedbed_commands::{
		BaseCommand, CommandContext, CommandError, CommandOutput, CommandResult, Project, Settings,
		call_command,
	};
	pub use seedbed_db::{
		AppConfig, Apps, DatabaseConfig, DatabaseConnection, FieldDef, Model, ModelMeta,
		QuerySet, QueryValue, Row,
	};
	pub use seedbed_seeding::{FixtureFormat, FixtureLoader, LoadOptions, LoadResult};
}
