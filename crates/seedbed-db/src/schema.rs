//! Table creation and flushing.

use tracing::debug;

use crate::connection::DatabaseConnection;
use crate::error::Result;
use crate::models::ModelMeta;

/// Quotes an identifier for SQLite.
///
/// # Examples
///
/// ```
/// use seedbed_db::schema::quote_name;
///
/// assert_eq!(quote_name("app_book"), "\"app_book\"");
/// assert_eq!(quote_name("\"already\""), "\"already\"");
/// assert_eq!(quote_name("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_name(name: &str) -> String {
	if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
		return name.to_string();
	}
	format!("\"{}\"", name.replace('"', "\"\""))
}

/// Issues schema statements on a connection.
#[derive(Debug, Clone)]
pub struct SchemaEditor {
	conn: DatabaseConnection,
}

impl SchemaEditor {
	pub fn new(conn: DatabaseConnection) -> Self {
		Self { conn }
	}

	/// `CREATE TABLE` statement for a model
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::fields::FieldDef;
	/// use seedbed_db::models::ModelMeta;
	/// use seedbed_db::schema::SchemaEditor;
	///
	/// let meta = ModelMeta::new("library", "Book").with_field(FieldDef::char("name", 100));
	/// assert_eq!(
	///     SchemaEditor::create_table_sql(&meta),
	///     "CREATE TABLE \"library_book\" (\"id\" integer NOT NULL PRIMARY KEY, \"name\" varchar(100) NOT NULL)"
	/// );
	/// ```
	pub fn create_table_sql(meta: &ModelMeta) -> String {
		let columns: Vec<String> = meta.fields.iter().map(|f| f.column_definition()).collect();
		format!(
			"CREATE TABLE {} ({})",
			quote_name(&meta.db_table),
			columns.join(", ")
		)
	}

	/// Statements that empty the given tables
	pub fn sql_flush(tables: &[String]) -> Vec<String> {
		tables
			.iter()
			.map(|table| format!("DELETE FROM {}", quote_name(table)))
			.collect()
	}

	/// Names of the user tables in the database, sorted
	pub async fn table_names(&self) -> Result<Vec<String>> {
		let rows = self
			.conn
			.fetch_all(
				"SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
				Vec::new(),
			)
			.await?;
		rows.iter().map(|row| row.get::<String>("name")).collect()
	}

	pub async fn table_exists(&self, table: &str) -> Result<bool> {
		let row = self
			.conn
			.fetch_optional(
				"SELECT 1 AS \"present\" FROM sqlite_master WHERE type = 'table' AND name = ?",
				vec![table.into()],
			)
			.await?;
		Ok(row.is_some())
	}

	pub async fn create_model(&self, meta: &ModelMeta) -> Result<()> {
		let sql = Self::create_table_sql(meta);
		debug!(table = %meta.db_table, "creating table");
		self.conn.execute(&sql, Vec::new()).await?;
		Ok(())
	}

	/// Deletes every row of the given tables
	pub async fn flush(&self, tables: &[String]) -> Result<u64> {
		self.conn.execute_many(&Self::sql_flush(tables)).await
	}
}
