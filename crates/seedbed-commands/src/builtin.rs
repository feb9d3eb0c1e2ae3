//! Built-in commands
//!
//! `migrate` (also registered as `syncdb`), `flush`, `loaddata` and
//! `dumpdata`.

use std::path::PathBuf;

use async_trait::async_trait;
use seedbed_db::{SchemaEditor, Result as DbResult};
use seedbed_seeding::commands::{DumpDataArgs, DumpDataCommand as DumpData, DumpDataOptions};
use seedbed_seeding::{FixtureFormat, FixtureLoader, LoadOptions, fixtures::INITIAL_DATA};
use tracing::{debug, info};

use crate::{
	BaseCommand, CommandArgument, CommandContext, CommandError, CommandOption, CommandOutput,
	CommandResult, Project,
};

const FLUSH_PROMPT: &str = "You have requested a flush of the database.
This will IRREVERSIBLY DESTROY all data currently in the '{alias}' database,
and return each table to the state it was in after syncdb.
Are you sure you want to do this?

    Type 'yes' to continue, or 'no' to cancel: ";

/// Rejects a `database` option naming another connection.
fn check_database(project: &Project, ctx: &CommandContext) -> CommandResult<()> {
	match ctx.option("database") {
		Some(alias) if alias != project.connection().alias() => Err(
			CommandError::InvalidArguments(format!("The connection '{}' doesn't exist.", alias)),
		),
		_ => Ok(()),
	}
}

/// Loads `initial_data` with the given transaction handling.
async fn load_initial_data(
	project: &Project,
	verbosity: u8,
	commit: bool,
	hide_empty: bool,
) -> CommandResult<CommandOutput> {
	let options = LoadOptions::new()
		.with_verbosity(verbosity)
		.with_commit(commit)
		.with_hide_empty(hide_empty)
		.with_fixture_dirs(project.settings().fixture_dirs.clone());
	let result = FixtureLoader::new(project.connection().clone(), project.apps().clone())
		.with_options(options)
		.load_labels(&[INITIAL_DATA])
		.await?;
	Ok(result.into())
}

/// Creates the tables of all installed models
pub struct MigrateCommand;

impl MigrateCommand {
	async fn create_missing_tables(
		project: &Project,
		verbosity: u8,
		output: &mut CommandOutput,
	) -> DbResult<usize> {
		let editor = SchemaEditor::new(project.connection().clone());
		let mut tables = editor.table_names().await?;
		let mut created = 0;
		for meta in project.apps().all_models() {
			if verbosity >= 3 {
				output.write(format!("Processing {}.{} model", meta.app_label, meta.model_name));
			}
			if tables.contains(&meta.db_table) {
				continue;
			}
			if verbosity >= 1 {
				output.write(format!("Creating table {}", meta.db_table));
			}
			editor.create_model(&meta).await?;
			tables.push(meta.db_table.clone());
			created += 1;
		}
		Ok(created)
	}
}

#[async_trait]
impl BaseCommand for MigrateCommand {
	fn name(&self) -> &str {
		"migrate"
	}

	fn description(&self) -> &str {
		"Create the database tables of all installed models that don't have them yet"
	}

	fn options(&self) -> Vec<CommandOption> {
		vec![
			CommandOption::option(Some('d'), "database", "Database to synchronize")
				.with_default("default"),
			CommandOption::option(
				None,
				"load_initial_data",
				"Load the initial_data fixtures after creating tables",
			)
			.with_default("true"),
			CommandOption::option(None, "commit", "Commit the initial data load")
				.with_default("true"),
		]
	}

	async fn execute(&self, project: &Project, ctx: &CommandContext) -> CommandResult<CommandOutput> {
		check_database(project, ctx)?;
		let verbosity = ctx.verbosity();
		let load_initial = ctx.bool_option("load_initial_data", true)?;
		let commit = ctx.bool_option("commit", true)?;

		let mut output = CommandOutput::new();
		if verbosity >= 1 {
			output.write("Creating tables ...");
		}

		let conn = project.connection();
		let created = match conn.commit_on_success_unless_managed().await? {
			Some(atomic) => {
				let created = Self::create_missing_tables(project, verbosity, &mut output).await;
				atomic.finish(created).await?
			}
			None => Self::create_missing_tables(project, verbosity, &mut output).await?,
		};
		info!(created, database = %conn.alias(), "synchronized tables");

		if load_initial {
			output.merge(load_initial_data(project, verbosity, commit, true).await?);
		}
		Ok(output)
	}
}

/// Deletes all rows from the tables of installed models
pub struct FlushCommand;

impl FlushCommand {
	async fn model_tables(project: &Project) -> DbResult<Vec<String>> {
		let existing = SchemaEditor::new(project.connection().clone())
			.table_names()
			.await?;
		Ok(project
			.apps()
			.all_models()
			.into_iter()
			.map(|meta| meta.db_table.clone())
			.filter(|table| existing.contains(table))
			.collect())
	}

	async fn flush_tables(project: &Project, commit: bool) -> DbResult<u64> {
		let conn = project.connection();
		let editor = SchemaEditor::new(conn.clone());
		if !commit {
			let tables = Self::model_tables(project).await?;
			return editor.flush(&tables).await;
		}
		match conn.commit_on_success_unless_managed().await? {
			Some(atomic) => {
				let flushed = match Self::model_tables(project).await {
					Ok(tables) => editor.flush(&tables).await,
					Err(e) => Err(e),
				};
				atomic.finish(flushed).await
			}
			None => {
				let tables = Self::model_tables(project).await?;
				editor.flush(&tables).await
			}
		}
	}
}

#[async_trait]
impl BaseCommand for FlushCommand {
	fn name(&self) -> &str {
		"flush"
	}

	fn description(&self) -> &str {
		"Remove all data from the database and reinstall the initial data"
	}

	fn options(&self) -> Vec<CommandOption> {
		vec![
			CommandOption::option(Some('d'), "database", "Database to flush")
				.with_default("default"),
			CommandOption::option(None, "interactive", "Ask for confirmation first")
				.with_default("true"),
			CommandOption::option(
				None,
				"load_initial_data",
				"Reinstall the initial_data fixtures after flushing",
			)
			.with_default("true"),
			CommandOption::option(
				None,
				"commit",
				"Run in its own transaction unless one is already managed",
			)
			.with_default("true"),
		]
	}

	async fn execute(&self, project: &Project, ctx: &CommandContext) -> CommandResult<CommandOutput> {
		check_database(project, ctx)?;
		let verbosity = ctx.verbosity();
		let interactive = ctx.bool_option("interactive", true)?;
		let load_initial = ctx.bool_option("load_initial_data", true)?;
		let commit = ctx.bool_option("commit", true)?;
		let alias = project.connection().alias().to_string();

		let mut output = CommandOutput::new();
		if interactive {
			let answer = ctx.prompt(&FLUSH_PROMPT.replace("{alias}", &alias))?;
			if answer != "yes" {
				output.write("Flush cancelled.");
				return Ok(output);
			}
		}

		let deleted = Self::flush_tables(project, commit).await.map_err(|e| {
			CommandError::ExecutionError(format!(
				"Database {} couldn't be flushed. Possible reasons:\n  \
				 * The database isn't running or isn't configured correctly.\n  \
				 * At least one of the expected database tables doesn't exist.\n  \
				 * The SQL was invalid.\n\
				 The full error: {}",
				alias, e
			))
		})?;
		info!(deleted, database = %alias, "flushed database");

		if load_initial {
			output.merge(load_initial_data(project, verbosity, commit, false).await?);
		}
		Ok(output)
	}
}

/// Installs fixtures by label
pub struct LoadDataCommand;

#[async_trait]
impl BaseCommand for LoadDataCommand {
	fn name(&self) -> &str {
		"loaddata"
	}

	fn description(&self) -> &str {
		"Install the named fixture(s) in the database"
	}

	fn arguments(&self) -> Vec<CommandArgument> {
		vec![CommandArgument::required("fixture", "Fixture label").multiple()]
	}

	fn options(&self) -> Vec<CommandOption> {
		vec![
			CommandOption::option(Some('d'), "database", "Database to load fixtures into")
				.with_default("default"),
			CommandOption::option(Some('a'), "app", "Only load objects of this app"),
			CommandOption::flag(
				Some('i'),
				"ignorenonexistent",
				"Ignore fields that no longer exist on the model",
			),
			CommandOption::option(
				None,
				"commit",
				"Run in its own transaction unless one is already managed",
			)
			.with_default("true"),
		]
	}

	async fn execute(&self, project: &Project, ctx: &CommandContext) -> CommandResult<CommandOutput> {
		check_database(project, ctx)?;
		let options = LoadOptions::new()
			.with_verbosity(ctx.verbosity())
			.with_commit(ctx.bool_option("commit", true)?)
			.with_ignore_nonexistent(ctx.bool_option("ignorenonexistent", false)?)
			.with_app_labels(ctx.option_values("app").unwrap_or_default())
			.with_fixture_dirs(project.settings().fixture_dirs.clone());
		let labels: Vec<&str> = ctx.args.iter().map(String::as_str).collect();
		debug!(?labels, "loaddata");

		let result = FixtureLoader::new(project.connection().clone(), project.apps().clone())
			.with_options(options)
			.load_labels(&labels)
			.await?;
		Ok(result.into())
	}
}

/// Writes the contents of the database as a fixture
pub struct DumpDataCommand;

#[async_trait]
impl BaseCommand for DumpDataCommand {
	fn name(&self) -> &str {
		"dumpdata"
	}

	fn description(&self) -> &str {
		"Output the contents of the database as a fixture"
	}

	fn arguments(&self) -> Vec<CommandArgument> {
		vec![CommandArgument::optional("app_label", "App or app.Model label").multiple()]
	}

	fn options(&self) -> Vec<CommandOption> {
		vec![
			CommandOption::option(Some('f'), "format", "Serialization format").with_default("json"),
			CommandOption::option(None, "indent", "Indentation of pretty output"),
			CommandOption::option(Some('o'), "output", "File to write to"),
		]
	}

	async fn execute(&self, project: &Project, ctx: &CommandContext) -> CommandResult<CommandOutput> {
		let format_name = ctx.option("format").map(String::as_str).unwrap_or("json");
		let format = FixtureFormat::from_extension(format_name)
			.filter(FixtureFormat::is_available)
			.ok_or_else(|| {
				CommandError::InvalidArguments(format!("Unknown serialization format: {}", format_name))
			})?;

		let mut options = DumpDataOptions::new().with_format(format);
		if let Some(indent) = ctx.usize_option("indent")? {
			options = options.with_indent(indent);
		}
		if let Some(path) = ctx.option("output") {
			options = options.with_output(PathBuf::from(path));
		}

		let result = DumpData::new(project.connection().clone(), project.apps().clone())
			.execute(
				DumpDataArgs {
					labels: ctx.args.clone(),
				},
				options,
			)
			.await?;

		let mut output = CommandOutput::new();
		if !result.content.is_empty() {
			output.write(result.content);
		}
		Ok(output)
	}
}
