//! Command registry

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::builtin::{DumpDataCommand, FlushCommand, LoadDataCommand, MigrateCommand};
use crate::{BaseCommand, CommandContext, CommandError, CommandOutput, CommandResult, Project};

/// Commands by name, plus aliases.
#[derive(Default, Clone)]
pub struct CommandRegistry {
	commands: HashMap<String, Arc<dyn BaseCommand>>,
	aliases: HashMap<String, String>,
}

impl CommandRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding `migrate` (alias `syncdb`), `flush`, `loaddata`
	/// and `dumpdata`.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.register(MigrateCommand);
		registry.register(FlushCommand);
		registry.register(LoadDataCommand);
		registry.register(DumpDataCommand);
		registry.register_alias("syncdb", "migrate");
		registry
	}

	/// Adds a command, replacing one with the same name.
	pub fn register<C: BaseCommand + 'static>(&mut self, command: C) {
		self.commands
			.insert(command.name().to_string(), Arc::new(command));
	}

	pub fn register_alias(&mut self, alias: impl Into<String>, name: impl Into<String>) {
		self.aliases.insert(alias.into(), name.into());
	}

	pub fn get(&self, name: &str) -> Option<Arc<dyn BaseCommand>> {
		let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);
		self.commands.get(name).cloned()
	}

	/// Registered command names, sorted
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Runs a command by name or alias.
	pub async fn call(
		&self,
		project: &Project,
		name: &str,
		ctx: &CommandContext,
	) -> CommandResult<CommandOutput> {
		let command = self
			.get(name)
			.ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
		debug!(command = %command.name(), args = ?ctx.args, "running command");
		command.execute(project, ctx).await
	}
}

impl std::fmt::Debug for CommandRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CommandRegistry")
			.field("commands", &self.names())
			.field("aliases", &self.aliases)
			.finish()
	}
}

/// Runs a built-in command
///
/// # Examples
///
/// ```no_run
/// use seedbed_commands::{CommandContext, Project, call_command};
///
/// # async fn example(project: Project) -> seedbed_commands::CommandResult<()> {
/// let ctx = CommandContext::default()
///     .with_verbosity(0)
///     .with_option("load_initial_data", "false");
/// call_command(&project, "syncdb", &ctx).await?;
/// # Ok(())
/// # }
/// ```
pub async fn call_command(
	project: &Project,
	name: &str,
	ctx: &CommandContext,
) -> CommandResult<CommandOutput> {
	CommandRegistry::with_builtins().call(project, name, ctx).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_builtins_and_alias() {
		let registry = CommandRegistry::with_builtins();
		assert_eq!(registry.names(), vec!["dumpdata", "flush", "loaddata", "migrate"]);
		let syncdb = registry.get("syncdb").unwrap();
		assert_eq!(syncdb.name(), "migrate");
		assert!(registry.get("runserver").is_none());
	}
}
