//! Command errors

use seedbed_db::DatabaseError;
use seedbed_seeding::SeedingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
	#[error("Unknown command: {0}")]
	UnknownCommand(String),

	#[error("Invalid arguments: {0}")]
	InvalidArguments(String),

	#[error("{0}")]
	ExecutionError(String),

	#[error("Improperly configured: {0}")]
	ImproperlyConfigured(String),

	#[error(transparent)]
	Database(#[from] DatabaseError),

	#[error(transparent)]
	Seeding(#[from] SeedingError),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type CommandResult<T> = std::result::Result<T, CommandError>;
