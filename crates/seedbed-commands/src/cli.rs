//! CLI runner for seedbed management commands
//!
//! A project binary hands its installed apps to
//! [`execute_from_command_line`], which parses the arguments, connects to
//! the database configured through the environment and runs the command.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use seedbed_db::Apps;
use tracing_subscriber::EnvFilter;

use crate::{CommandContext, CommandOutput, CommandRegistry, CommandResult, Project, Settings};

/// Seedbed management CLI
#[derive(Debug, Parser)]
#[command(name = "manage")]
#[command(about = "Seedbed management interface", long_about = None)]
#[command(version)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	/// Verbosity level; 0=minimal, 1=normal, 2=verbose, 3=very verbose
	#[arg(short, long, global = true, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
	pub verbosity: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
	/// Create missing tables and install initial data
	#[command(alias = "syncdb")]
	Migrate {
		#[arg(long, value_name = "DATABASE")]
		database: Option<String>,

		/// Skip the initial_data fixtures
		#[arg(long)]
		no_initial_data: bool,
	},

	/// Remove all data and reinstall initial data
	Flush {
		#[arg(long, value_name = "DATABASE")]
		database: Option<String>,

		/// Do not ask for confirmation
		#[arg(long)]
		noinput: bool,

		/// Skip the initial_data fixtures
		#[arg(long)]
		no_initial_data: bool,
	},

	/// Install fixtures
	Loaddata {
		#[arg(value_name = "FIXTURE", required = true)]
		fixture_labels: Vec<String>,

		#[arg(long, value_name = "DATABASE")]
		database: Option<String>,

		/// Only install objects of this app (repeatable)
		#[arg(short, long, value_name = "APP_LABEL")]
		app: Vec<String>,

		/// Ignore fields that no longer exist on the model
		#[arg(short, long)]
		ignorenonexistent: bool,
	},

	/// Output the database contents as a fixture
	Dumpdata {
		#[arg(value_name = "APP_LABEL[.ModelName]")]
		app_labels: Vec<String>,

		#[arg(long, default_value = "json")]
		format: String,

		#[arg(long)]
		indent: Option<usize>,

		#[arg(short, long, value_name = "FILE")]
		output: Option<PathBuf>,
	},
}

impl Commands {
	/// Command name and context for this invocation.
	pub fn into_invocation(self, verbosity: u8) -> (&'static str, CommandContext) {
		let mut ctx = CommandContext::default().with_verbosity(verbosity);
		let name = match self {
			Commands::Migrate {
				database,
				no_initial_data,
			} => {
				set_database(&mut ctx, database);
				ctx.set_option("load_initial_data".to_string(), (!no_initial_data).to_string());
				"migrate"
			}
			Commands::Flush {
				database,
				noinput,
				no_initial_data,
			} => {
				set_database(&mut ctx, database);
				ctx.set_option("interactive".to_string(), (!noinput).to_string());
				ctx.set_option("load_initial_data".to_string(), (!no_initial_data).to_string());
				"flush"
			}
			Commands::Loaddata {
				fixture_labels,
				database,
				app,
				ignorenonexistent,
			} => {
				ctx = ctx.with_args(fixture_labels);
				set_database(&mut ctx, database);
				if !app.is_empty() {
					ctx.set_option_multi("app".to_string(), app);
				}
				ctx.set_option("ignorenonexistent".to_string(), ignorenonexistent.to_string());
				"loaddata"
			}
			Commands::Dumpdata {
				app_labels,
				format,
				indent,
				output,
			} => {
				ctx = ctx.with_args(app_labels);
				ctx.set_option("format".to_string(), format);
				if let Some(indent) = indent {
					ctx.set_option("indent".to_string(), indent.to_string());
				}
				if let Some(output) = output {
					ctx.set_option("output".to_string(), output.display().to_string());
				}
				"dumpdata"
			}
		};
		(name, ctx)
	}
}

fn set_database(ctx: &mut CommandContext, database: Option<String>) {
	if let Some(database) = database {
		ctx.set_option("database".to_string(), database);
	}
}

/// Runs a parsed command line against a project.
pub async fn run_cli(project: &Project, cli: Cli) -> CommandResult<CommandOutput> {
	let (name, ctx) = cli.command.into_invocation(cli.verbosity);
	CommandRegistry::with_builtins().call(project, name, &ctx).await
}

/// Parses the process arguments and runs the command
///
/// Logging goes to stderr and is filtered by `RUST_LOG` (default `warn`).
pub async fn execute_from_command_line(apps: Apps) -> anyhow::Result<()> {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.try_init();

	let cli = Cli::parse();
	let settings = Settings::from_env().context("invalid settings")?;
	let project = Project::connect(settings, apps)
		.await
		.context("could not open the database")?;

	let output = run_cli(&project, cli).await?;
	for line in &output.stdout {
		println!("{}", line);
	}
	for warning in &output.warnings {
		eprintln!("Warning: {}", warning);
	}
	Ok(())
}
