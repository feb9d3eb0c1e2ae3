//! Command execution context

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use crate::{CommandError, CommandResult};

#[derive(Debug, Clone)]
pub struct CommandContext {
	pub args: Vec<String>,
	pub options: HashMap<String, Vec<String>>,
	pub verbosity: u8,
	/// Answer given to confirmation prompts instead of reading stdin.
	input: Option<String>,
}

impl CommandContext {
	pub fn new(args: Vec<String>) -> Self {
		Self {
			args,
			options: HashMap::new(),
			verbosity: 1,
			input: None,
		}
	}

	pub fn with_args(mut self, args: Vec<String>) -> Self {
		self.args = args;
		self
	}

	pub fn with_options(mut self, options: HashMap<String, Vec<String>>) -> Self {
		self.options = options;
		self
	}

	/// Sets a single-valued option
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_commands::CommandContext;
	///
	/// let ctx = CommandContext::default()
	///     .with_option("load_initial_data", "false")
	///     .with_verbosity(0);
	/// assert!(!ctx.bool_option("load_initial_data", true).unwrap());
	/// assert!(ctx.bool_option("interactive", true).unwrap());
	/// ```
	pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.options.insert(key.into(), vec![value.into()]);
		self
	}

	pub fn with_verbosity(mut self, verbosity: u8) -> Self {
		self.verbosity = verbosity;
		self
	}

	/// Answers every confirmation prompt with `answer`.
	pub fn with_input(mut self, answer: impl Into<String>) -> Self {
		self.input = Some(answer.into());
		self
	}

	pub fn arg(&self, index: usize) -> Option<&String> {
		self.args.get(index)
	}

	pub fn option(&self, key: &str) -> Option<&String> {
		self.options.get(key).and_then(|v| v.first())
	}

	pub fn option_values(&self, key: &str) -> Option<Vec<String>> {
		self.options.get(key).cloned()
	}

	pub fn has_option(&self, key: &str) -> bool {
		self.options.contains_key(key)
	}

	/// Reads a boolean option.
	///
	/// A present option without a value counts as `true`. Unrecognised
	/// values are rejected.
	pub fn bool_option(&self, key: &str, default: bool) -> CommandResult<bool> {
		let Some(values) = self.options.get(key) else {
			return Ok(default);
		};
		let Some(value) = values.first() else {
			return Ok(true);
		};
		match value.trim().to_lowercase().as_str() {
			"" | "true" | "1" | "yes" | "on" => Ok(true),
			"false" | "0" | "no" | "off" => Ok(false),
			other => Err(CommandError::InvalidArguments(format!(
				"'{}' is not a valid boolean value for option '{}'",
				other, key
			))),
		}
	}

	/// Reads an unsigned integer option.
	pub fn usize_option(&self, key: &str) -> CommandResult<Option<usize>> {
		self.option(key)
			.map(|value| {
				value.trim().parse::<usize>().map_err(|_| {
					CommandError::InvalidArguments(format!(
						"'{}' is not a valid value for option '{}'",
						value, key
					))
				})
			})
			.transpose()
	}

	pub fn set_option(&mut self, key: String, value: String) {
		self.options.insert(key, vec![value]);
	}

	pub fn set_option_multi(&mut self, key: String, values: Vec<String>) {
		self.options.insert(key, values);
	}

	pub fn add_arg(&mut self, arg: String) {
		self.args.push(arg);
	}

	pub fn set_verbosity(&mut self, verbosity: u8) {
		self.verbosity = verbosity;
	}

	pub fn verbosity(&self) -> u8 {
		self.verbosity
	}

	/// Prints `prompt` and returns the trimmed answer.
	pub fn prompt(&self, prompt: &str) -> CommandResult<String> {
		if let Some(answer) = &self.input {
			return Ok(answer.trim().to_string());
		}
		let mut stdout = io::stdout();
		write!(stdout, "{}", prompt)?;
		stdout.flush()?;
		let mut answer = String::new();
		io::stdin().lock().read_line(&mut answer)?;
		Ok(answer.trim().to_string())
	}
}

impl Default for CommandContext {
	fn default() -> Self {
		Self::new(Vec::new())
	}
}
