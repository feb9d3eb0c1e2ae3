//! Per-test databases

use seedbed_commands::{
	CommandContext, CommandOutput, CommandResult, Project, Settings, call_command,
};
use seedbed_db::{Apps, DatabaseConfig, DatabaseConnection};
use tracing::debug;

/// A private in-memory database with every installed model's table.
///
/// Creating one runs `migrate`, so `initial_data` fixtures are installed.
/// Each `TestDatabase` is its own database: tests never see each other's
/// rows.
#[derive(Debug, Clone)]
pub struct TestDatabase {
	project: Project,
}

impl TestDatabase {
	pub async fn create(apps: Apps) -> CommandResult<Self> {
		Self::create_with_settings(Settings::new(DatabaseConfig::sqlite_memory()), apps).await
	}

	/// Creates the database with the given settings.
	///
	/// The configured database is replaced by an in-memory one under the same
	/// alias; the fixture directories are kept.
	pub async fn create_with_settings(mut settings: Settings, apps: Apps) -> CommandResult<Self> {
		if !settings.database.is_memory() {
			debug!(database = %settings.database.name, "using an in-memory test database");
			settings.database =
				DatabaseConfig::sqlite_memory().with_alias(settings.database.alias.clone());
		}
		let project = Project::connect(settings, apps).await?;
		call_command(&project, "migrate", &CommandContext::default().with_verbosity(0)).await?;
		Ok(Self { project })
	}

	pub fn project(&self) -> &Project {
		&self.project
	}

	pub fn connection(&self) -> &DatabaseConnection {
		self.project.connection()
	}

	pub fn apps(&self) -> &Apps {
		self.project.apps()
	}

	/// Runs a management command against this database.
	pub async fn call_command(&self, name: &str, ctx: &CommandContext) -> CommandResult<CommandOutput> {
		call_command(&self.project, name, ctx).await
	}
}
