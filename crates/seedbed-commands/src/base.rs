//! Base command trait and command metadata

use async_trait::async_trait;
use seedbed_seeding::LoadResult;

use crate::{CommandContext, CommandResult, Project};

/// A management command.
///
/// Commands receive the project they run against and a context holding the
/// positional arguments and options of the invocation. They report what they
/// did through the returned [`CommandOutput`] instead of printing.
#[async_trait]
pub trait BaseCommand: Send + Sync {
	fn name(&self) -> &str;

	fn description(&self) -> &str;

	fn arguments(&self) -> Vec<CommandArgument> {
		Vec::new()
	}

	fn options(&self) -> Vec<CommandOption> {
		Vec::new()
	}

	async fn execute(&self, project: &Project, ctx: &CommandContext) -> CommandResult<CommandOutput>;
}

/// Positional argument of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgument {
	pub name: String,
	pub help: String,
	pub required: bool,
	/// Accepts any number of values.
	pub multiple: bool,
}

impl CommandArgument {
	pub fn required(name: impl Into<String>, help: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			help: help.into(),
			required: true,
			multiple: false,
		}
	}

	pub fn optional(name: impl Into<String>, help: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			help: help.into(),
			required: false,
			multiple: false,
		}
	}

	pub fn multiple(mut self) -> Self {
		self.multiple = true;
		self
	}
}

/// Named option of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
	pub short: Option<char>,
	pub long: String,
	pub help: String,
	/// Flags take no value.
	pub takes_value: bool,
	pub default: Option<String>,
}

impl CommandOption {
	pub fn flag(short: Option<char>, long: impl Into<String>, help: impl Into<String>) -> Self {
		Self {
			short,
			long: long.into(),
			help: help.into(),
			takes_value: false,
			default: None,
		}
	}

	pub fn option(short: Option<char>, long: impl Into<String>, help: impl Into<String>) -> Self {
		Self {
			short,
			long: long.into(),
			help: help.into(),
			takes_value: true,
			default: None,
		}
	}

	pub fn with_default(mut self, default: impl Into<String>) -> Self {
		self.default = Some(default.into());
		self
	}
}

/// What a command reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
	/// Lines meant for standard output.
	pub stdout: Vec<String>,
	/// Non-fatal problems, such as a fixture that could not be found.
	pub warnings: Vec<String>,
}

impl CommandOutput {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn write(&mut self, line: impl Into<String>) {
		self.stdout.push(line.into());
	}

	pub fn warn(&mut self, warning: impl Into<String>) {
		self.warnings.push(warning.into());
	}

	/// Appends the output of a nested command.
	pub fn merge(&mut self, other: CommandOutput) {
		self.stdout.extend(other.stdout);
		self.warnings.extend(other.warnings);
	}
}

impl From<LoadResult> for CommandOutput {
	fn from(result: LoadResult) -> Self {
		Self {
			stdout: result.messages,
			warnings: result.warnings,
		}
	}
}
