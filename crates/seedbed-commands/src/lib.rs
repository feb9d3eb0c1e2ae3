//! Management commands for seedbed projects.
//!
//! Commands run against a [`Project`] (settings, installed apps and an open
//! connection) and are invoked by name:
//!
//! ```no_run
//! use seedbed_commands::{CommandContext, Project, Settings, call_command};
//! use seedbed_db::Apps;
//!
//! # async fn example(apps: Apps) -> seedbed_commands::CommandResult<()> {
//! let project = Project::connect(Settings::from_env()?, apps).await?;
//! let output = call_command(
//!     &project,
//!     "loaddata",
//!     &CommandContext::new(vec!["fixture1".to_string()]),
//! )
//! .await?;
//! for warning in &output.warnings {
//!     eprintln!("{}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Built-in commands
//!
//! - `migrate` (`syncdb`): create missing tables, then install `initial_data`
//! - `flush`: empty every model table, then reinstall `initial_data`
//! - `loaddata`: install fixtures by label
//! - `dumpdata`: serialize the database as a fixture
//!
//! Options are passed as strings in the [`CommandContext`]. Boolean options
//! accept `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`.

pub mod base;
pub mod builtin;
pub mod cli;
pub mod context;
pub mod error;
pub mod project;
pub mod registry;
pub mod settings;

pub use base::{BaseCommand, CommandArgument, CommandOption, CommandOutput};
pub use builtin::{DumpDataCommand, FlushCommand, LoadDataCommand, MigrateCommand};
pub use cli::execute_from_command_line;
pub use context::CommandContext;
pub use error::{CommandError, CommandResult};
pub use project::Project;
pub use registry::{CommandRegistry, call_command};
pub use settings::Settings;
