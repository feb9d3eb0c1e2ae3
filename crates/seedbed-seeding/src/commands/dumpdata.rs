//! dumpdata command implementation.
//!
//! This command writes the contents of model tables as a fixture.

use std::path::PathBuf;
use std::sync::Arc;

use seedbed_db::{Apps, DatabaseConnection, ModelInstance, ModelMeta};
use tracing::debug;

use crate::error::{SeedingError, SeedingResult};
use crate::fixtures::{FixtureFormat, FixtureRecord, FixtureSerializer, to_record};

/// Arguments for the dumpdata command.
#[derive(Debug, Clone, Default)]
pub struct DumpDataArgs {
	/// `app_label` or `app_label.ModelName` labels. Empty dumps every model.
	pub labels: Vec<String>,
}

/// Options for the dumpdata command.
#[derive(Debug, Clone, Default)]
pub struct DumpDataOptions {
	/// Output format.
	pub format: FixtureFormat,

	/// Indentation for pretty-printed output.
	pub indent: Option<usize>,

	/// File to write instead of returning the output.
	pub output: Option<PathBuf>,
}

impl DumpDataOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = format;
		self
	}

	pub fn with_indent(mut self, indent: usize) -> Self {
		self.indent = Some(indent);
		self
	}

	pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
		self.output = Some(output.into());
		self
	}
}

/// Outcome of a dump.
#[derive(Debug, Clone)]
pub struct DumpResult {
	/// Dumped records, grouped by model and ordered by primary key.
	pub records: Vec<FixtureRecord>,
	/// Serialized fixture. Empty when written to a file.
	pub content: String,
}

/// The dumpdata command for exporting model data as a fixture.
#[derive(Debug, Clone)]
pub struct DumpDataCommand {
	conn: DatabaseConnection,
	apps: Apps,
}

impl DumpDataCommand {
	pub fn new(conn: DatabaseConnection, apps: Apps) -> Self {
		Self { conn, apps }
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"dumpdata"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Output the contents of the database as a fixture of the given format"
	}

	/// Models selected by the labels, in registry order, without duplicates.
	pub fn select_models(&self, labels: &[String]) -> SeedingResult<Vec<Arc<ModelMeta>>> {
		if labels.is_empty() {
			return Ok(self.apps.all_models());
		}
		let mut models: Vec<Arc<ModelMeta>> = Vec::new();
		for label in labels {
			let selected = match label.split_once('.') {
				Some(_) => vec![self.apps.get_model_by_label(label).map_err(|_| {
					SeedingError::ValidationError {
						field: "labels".to_string(),
						message: format!("Unknown model: {}", label),
					}
				})?],
				None => self
					.apps
					.get_app_config(label)
					.map_err(|_| SeedingError::ValidationError {
						field: "labels".to_string(),
						message: format!("Unknown application: {}", label),
					})?
					.models,
			};
			for model in selected {
				if !models.iter().any(|m| m.label() == model.label()) {
					models.push(model);
				}
			}
		}
		Ok(models)
	}

	/// Executes the dumpdata command.
	pub async fn execute(
		&self,
		args: DumpDataArgs,
		options: DumpDataOptions,
	) -> SeedingResult<DumpResult> {
		let models = self.select_models(&args.labels)?;
		let mut records = Vec::new();
		for meta in models {
			let instances = ModelInstance::all(&self.conn, Arc::clone(&meta)).await?;
			debug!(model = %meta.label(), objects = instances.len(), "dumping model");
			records.extend(instances.iter().map(to_record));
		}

		let serializer = FixtureSerializer::new()
			.with_format(options.format)
			.with_indent(options.indent);
		let content = match &options.output {
			Some(path) => {
				serializer.write_to_file(&records, path)?;
				String::new()
			}
			None => serializer.serialize(&records)?,
		};
		Ok(DumpResult { records, content })
	}
}
