//! A connected project: settings, installed apps and the database

use seedbed_db::{Apps, DatabaseConnection};
use tracing::debug;

use crate::{CommandResult, Settings};

/// Everything a command runs against.
#[derive(Debug, Clone)]
pub struct Project {
	settings: Settings,
	apps: Apps,
	connection: DatabaseConnection,
}

impl Project {
	pub fn new(settings: Settings, apps: Apps, connection: DatabaseConnection) -> Self {
		Self {
			settings,
			apps,
			connection,
		}
	}

	/// Opens the configured database.
	pub async fn connect(settings: Settings, apps: Apps) -> CommandResult<Self> {
		debug!(database = %settings.database.to_url(), "connecting");
		let connection = DatabaseConnection::connect(&settings.database).await?;
		Ok(Self::new(settings, apps, connection))
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn apps(&self) -> &Apps {
		&self.apps
	}

	pub fn connection(&self) -> &DatabaseConnection {
		&self.connection
	}
}
