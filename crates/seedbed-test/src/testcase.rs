//! Test cases with fixture setup and database isolation
//!
//! [`TestCase`] runs its body inside a transaction that is rolled back
//! afterwards. [`TransactionTestCase`] lets the body commit and empties the
//! database afterwards instead, which is slower but allows testing
//! transaction handling itself.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use seedbed_commands::{CommandContext, CommandResult, Project, call_command};
use tracing::{debug, warn};

fn loaddata_context(fixtures: &[String], commit: bool) -> CommandContext {
	CommandContext::new(fixtures.to_vec())
		.with_verbosity(0)
		.with_option("commit", commit.to_string())
}

/// Test isolated by a rolled back transaction
///
/// # Example
///
/// ```no_run
/// use seedbed_test::{TestCase, TestDatabase};
/// # use seedbed_db::Apps;
///
/// # async fn example(apps: Apps) -> seedbed_commands::CommandResult<()> {
/// let db = TestDatabase::create(apps).await?;
/// TestCase::new(db.project().clone())
///     .with_fixtures(["fixture1.json", "fixture2.json"])
///     .run(|project| async move {
///         // rows from both fixtures are visible here
///         let _ = project.connection();
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestCase {
	project: Project,
	fixtures: Vec<String>,
}

impl TestCase {
	pub fn new(project: Project) -> Self {
		Self {
			project,
			fixtures: Vec::new(),
		}
	}

	/// Fixture labels installed before every run.
	pub fn with_fixtures<I, S>(mut self, fixtures: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fixtures = fixtures.into_iter().map(Into::into).collect();
		self
	}

	pub fn fixtures(&self) -> &[String] {
		&self.fixtures
	}

	/// Runs `body` in an atomic block that is always rolled back.
	///
	/// Fixtures are installed inside the block without committing. A panic
	/// in `body` is resumed after the rollback.
	pub async fn run<F, Fut, T>(&self, body: F) -> CommandResult<T>
	where
		F: FnOnce(Project) -> Fut,
		Fut: Future<Output = T>,
	{
		let atomic = self.project.connection().atomic().await?;
		if !self.fixtures.is_empty() {
			let ctx = loaddata_context(&self.fixtures, false);
			if let Err(e) = call_command(&self.project, "loaddata", &ctx).await {
				atomic.rollback().await?;
				return Err(e);
			}
		}

		let outcome = AssertUnwindSafe(body(self.project.clone()))
			.catch_unwind()
			.await;
		atomic.rollback().await?;
		debug!(fixtures = ?self.fixtures, "rolled back test transaction");

		match outcome {
			Ok(value) => Ok(value),
			Err(panic) => std::panic::resume_unwind(panic),
		}
	}
}

/// Test that may commit, followed by a flush
#[derive(Debug, Clone)]
pub struct TransactionTestCase {
	project: Project,
	fixtures: Vec<String>,
}

impl TransactionTestCase {
	pub fn new(project: Project) -> Self {
		Self {
			project,
			fixtures: Vec::new(),
		}
	}

	pub fn with_fixtures<I, S>(mut self, fixtures: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fixtures = fixtures.into_iter().map(Into::into).collect();
		self
	}

	pub fn fixtures(&self) -> &[String] {
		&self.fixtures
	}

	/// Installs the fixtures, runs `body`, then flushes the database.
	///
	/// The flush reinstalls `initial_data`, so the next test starts from the
	/// state right after `migrate`. It also runs when `body` panics.
	pub async fn run<F, Fut, T>(&self, body: F) -> CommandResult<T>
	where
		F: FnOnce(Project) -> Fut,
		Fut: Future<Output = T>,
	{
		if !self.fixtures.is_empty() {
			call_command(
				&self.project,
				"loaddata",
				&loaddata_context(&self.fixtures, true),
			)
			.await?;
		}

		let outcome = AssertUnwindSafe(body(self.project.clone()))
			.catch_unwind()
			.await;
		let teardown = self.teardown().await;

		match outcome {
			Ok(value) => teardown.map(|()| value),
			Err(panic) => {
				if let Err(e) = teardown {
					warn!(error = %e, "flush after failed test did not complete");
				}
				std::panic::resume_unwind(panic)
			}
		}
	}

	async fn teardown(&self) -> CommandResult<()> {
		let conn = self.project.connection();
		// A body that left a manual transaction open must not leak it into the flush.
		if !conn.get_autocommit() && !conn.in_atomic_block() {
			conn.rollback().await?;
			conn.set_autocommit(true).await?;
		}
		let ctx = CommandContext::default()
			.with_verbosity(0)
			.with_option("interactive", "false");
		call_command(&self.project, "flush", &ctx).await?;
		Ok(())
	}
}
