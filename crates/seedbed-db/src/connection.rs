//! SQLite connection with Django-style transaction management.

use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex as StateMutex;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row as SqlxRow, Sqlite, SqliteConnection, ValueRef};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, Result};
use crate::transaction::TransactionManager;
use crate::types::{QueryValue, Row, format_datetime};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

struct ConnectionInner {
	alias: String,
	conn: Mutex<SqliteConnection>,
	transactions: StateMutex<TransactionManager>,
}

/// Handle to a single SQLite connection.
///
/// Clones share the underlying connection and its transaction state, so an
/// in-memory database stays alive as long as any handle exists.
#[derive(Clone)]
pub struct DatabaseConnection {
	inner: Arc<ConnectionInner>,
}

impl std::fmt::Debug for DatabaseConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DatabaseConnection")
			.field("alias", &self.inner.alias)
			.finish()
	}
}

impl DatabaseConnection {
	/// Open a connection. File databases are created when missing.
	pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(&config.to_url())?.create_if_missing(true);
		let conn = options.connect().await?;
		debug!(alias = %config.alias, url = %config.to_url(), "opened database connection");
		Ok(Self {
			inner: Arc::new(ConnectionInner {
				alias: config.alias.clone(),
				conn: Mutex::new(conn),
				transactions: StateMutex::new(TransactionManager::new()),
			}),
		})
	}

	/// Open an in-memory database under the default alias
	pub async fn connect_memory() -> Result<Self> {
		Self::connect(&DatabaseConfig::sqlite_memory()).await
	}

	pub fn alias(&self) -> &str {
		&self.inner.alias
	}

	fn bind_value(query: SqliteQuery<'_>, value: QueryValue) -> SqliteQuery<'_> {
		match value {
			QueryValue::Null => query.bind(None::<i64>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::Float(f) => query.bind(f),
			QueryValue::String(s) => query.bind(s),
			QueryValue::Bytes(b) => query.bind(b),
			QueryValue::Timestamp(dt) => query.bind(format_datetime(&dt)),
		}
	}

	fn build_query(sql: &str, params: Vec<QueryValue>) -> SqliteQuery<'_> {
		let mut query = sqlx::query(sql);
		for param in params {
			query = Self::bind_value(query, param);
		}
		query
	}

	fn convert_row(sqlite_row: &SqliteRow) -> Result<Row> {
		let mut row = Row::new();
		for column in sqlite_row.columns() {
			let index = column.ordinal();
			let name = column.name().to_string();

			if sqlite_row.try_get_raw(index)?.is_null() {
				row.insert(name, QueryValue::Null);
				continue;
			}

			let value = if let Ok(value) = sqlite_row.try_get::<i64, _>(index) {
				QueryValue::Int(value)
			} else if let Ok(value) = sqlite_row.try_get::<f64, _>(index) {
				QueryValue::Float(value)
			} else if let Ok(value) = sqlite_row.try_get::<String, _>(index) {
				QueryValue::String(value)
			} else if let Ok(value) = sqlite_row.try_get::<Vec<u8>, _>(index) {
				QueryValue::Bytes(value)
			} else {
				QueryValue::Null
			};
			row.insert(name, value);
		}
		Ok(row)
	}

	/// Run statements queued by dropped atomic guards.
	async fn run_pending(&self, conn: &mut SqliteConnection) -> Result<()> {
		let pending = self.inner.transactions.lock().take_pending();
		Self::run_control(conn, pending).await
	}

	async fn run_control(conn: &mut SqliteConnection, statements: Vec<String>) -> Result<()> {
		for sql in statements {
			debug!(sql = %sql, "transaction control");
			sqlx::query(&sql).execute(&mut *conn).await?;
		}
		Ok(())
	}

	/// Execute a statement and return the number of affected rows
	pub async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<u64> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		debug!(sql, params = params.len(), "execute");
		let result = Self::build_query(sql, params).execute(&mut *conn).await?;
		Ok(result.rows_affected())
	}

	/// Execute several parameterless statements in order
	pub async fn execute_many(&self, statements: &[String]) -> Result<u64> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		let mut affected = 0;
		for sql in statements {
			debug!(sql = %sql, "execute");
			affected += sqlx::query(sql).execute(&mut *conn).await?.rows_affected();
		}
		Ok(affected)
	}

	pub async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		debug!(sql, params = params.len(), "fetch_all");
		let rows = Self::build_query(sql, params).fetch_all(&mut *conn).await?;
		rows.iter().map(Self::convert_row).collect()
	}

	pub async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		debug!(sql, params = params.len(), "fetch_optional");
		let row = Self::build_query(sql, params)
			.fetch_optional(&mut *conn)
			.await?;
		row.as_ref().map(Self::convert_row).transpose()
	}

	pub async fn fetch_one(&self, sql: &str, params: Vec<QueryValue>) -> Result<Row> {
		self.fetch_optional(sql, params)
			.await?
			.ok_or(DatabaseError::DoesNotExist)
	}

	/// Returns false while autocommit is disabled
	pub fn get_autocommit(&self) -> bool {
		self.inner.transactions.lock().autocommit()
	}

	/// Enable or disable autocommit
	///
	/// Disabling autocommit opens a transaction that stays open until
	/// [`commit`](Self::commit), [`rollback`](Self::rollback) or autocommit is
	/// enabled again (which commits).
	pub async fn set_autocommit(&self, autocommit: bool) -> Result<()> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		let statements = self.inner.transactions.lock().set_autocommit(autocommit)?;
		Self::run_control(&mut conn, statements).await
	}

	/// Commit the manual transaction
	pub async fn commit(&self) -> Result<()> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		let statements = self.inner.transactions.lock().commit()?;
		Self::run_control(&mut conn, statements).await
	}

	/// Roll back the manual transaction
	pub async fn rollback(&self) -> Result<()> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		let statements = self.inner.transactions.lock().rollback()?;
		Self::run_control(&mut conn, statements).await
	}

	pub fn in_atomic_block(&self) -> bool {
		self.inner.transactions.lock().in_atomic_block()
	}

	/// True when autocommit is disabled or an atomic block is open
	pub fn is_managed(&self) -> bool {
		self.inner.transactions.lock().is_managed()
	}

	/// Open an atomic block
	///
	/// # Examples
	///
	/// ```no_run
	/// # async fn example(conn: seedbed_db::DatabaseConnection) -> seedbed_db::Result<()> {
	/// let atomic = conn.atomic().await?;
	/// conn.execute("DELETE FROM app_book", vec![]).await?;
	/// atomic.rollback().await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn atomic(&self) -> Result<Atomic> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		let (depth, statements) = self.inner.transactions.lock().enter_atomic();
		if let Err(e) = Self::run_control(&mut conn, statements).await {
			self.inner.transactions.lock().abandon_atomic(depth);
			return Err(e);
		}
		Ok(Atomic {
			connection: self.clone(),
			depth,
			finished: false,
		})
	}

	/// Open an atomic block unless the caller already manages the transaction
	///
	/// Returns `None` when autocommit is disabled or an atomic block is open;
	/// statements then run in the caller's transaction.
	pub async fn commit_on_success_unless_managed(&self) -> Result<Option<Atomic>> {
		if self.is_managed() {
			Ok(None)
		} else {
			self.atomic().await.map(Some)
		}
	}

	/// Check that the connection is still usable
	pub async fn ping(&self) -> Result<()> {
		let mut conn = self.inner.conn.lock().await;
		conn.ping().await?;
		Ok(())
	}

	async fn exit_atomic(&self, depth: usize, commit: bool) -> Result<()> {
		let mut conn = self.inner.conn.lock().await;
		self.run_pending(&mut conn).await?;
		let statements = self.inner.transactions.lock().exit_atomic(depth, commit)?;
		Self::run_control(&mut conn, statements).await
	}
}

/// Guard for an open atomic block.
///
/// Close it with [`commit`](Atomic::commit) or [`rollback`](Atomic::rollback).
/// Dropping an open guard rolls the block back before the next statement on
/// the connection.
#[must_use = "an atomic block must be committed or rolled back"]
#[derive(Debug)]
pub struct Atomic {
	connection: DatabaseConnection,
	depth: usize,
	finished: bool,
}

impl Atomic {
	pub fn depth(&self) -> usize {
		self.depth
	}

	pub async fn commit(mut self) -> Result<()> {
		self.finished = true;
		self.connection.exit_atomic(self.depth, true).await
	}

	pub async fn rollback(mut self) -> Result<()> {
		self.finished = true;
		self.connection.exit_atomic(self.depth, false).await
	}

	/// Commit when `result` is `Ok`, roll back otherwise, and pass `result` through
	pub async fn finish<T, E>(self, result: std::result::Result<T, E>) -> std::result::Result<T, E>
	where
		E: From<DatabaseError>,
	{
		match result {
			Ok(value) => {
				self.commit().await?;
				Ok(value)
			}
			Err(e) => {
				if let Err(rollback_error) = self.rollback().await {
					warn!(error = %rollback_error, "rollback after failure did not complete");
				}
				Err(e)
			}
		}
	}
}

impl Drop for Atomic {
	fn drop(&mut self) {
		if !self.finished {
			warn!(depth = self.depth, "atomic block dropped while open, rolling back");
			self.connection
				.inner
				.transactions
				.lock()
				.abandon_atomic(self.depth);
		}
	}
}
