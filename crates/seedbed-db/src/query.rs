//! Typed query sets.

use std::marker::PhantomData;

use crate::connection::DatabaseConnection;
use crate::error::{DatabaseError, Result};
use crate::models::Model;
use crate::schema::quote_name;
use crate::types::QueryValue;

/// Lazily built query over a model's table.
///
/// Filters are equality conditions joined with `AND`. Without an explicit
/// [`order_by`](QuerySet::order_by) the model's default ordering applies.
pub struct QuerySet<M: Model> {
	conn: DatabaseConnection,
	filters: Vec<(String, QueryValue)>,
	ordering: Option<Vec<String>>,
	limit: Option<usize>,
	_model: PhantomData<M>,
}

impl<M: Model> Clone for QuerySet<M> {
	fn clone(&self) -> Self {
		Self {
			conn: self.conn.clone(),
			filters: self.filters.clone(),
			ordering: self.ordering.clone(),
			limit: self.limit,
			_model: PhantomData,
		}
	}
}

impl<M: Model> QuerySet<M> {
	pub fn new(conn: DatabaseConnection) -> Self {
		Self {
			conn,
			filters: Vec::new(),
			ordering: None,
			limit: None,
			_model: PhantomData,
		}
	}

	/// Adds an equality filter on a field (`pk` is accepted).
	pub fn filter(mut self, field: &str, value: impl Into<QueryValue>) -> Self {
		self.filters.push((field.to_string(), value.into()));
		self
	}

	/// Replaces the ordering. Prefix a field with `-` for descending order.
	pub fn order_by(mut self, fields: &[&str]) -> Self {
		self.ordering = Some(fields.iter().map(|f| f.to_string()).collect());
		self
	}

	fn where_clause(&self) -> Result<(String, Vec<QueryValue>)> {
		if self.filters.is_empty() {
			return Ok((String::new(), Vec::new()));
		}
		let meta = M::meta();
		let mut conditions = Vec::with_capacity(self.filters.len());
		let mut params = Vec::with_capacity(self.filters.len());
		for (name, value) in &self.filters {
			let field = meta.field(name)?;
			if value.is_null() {
				conditions.push(format!("{} IS NULL", quote_name(&field.column)));
			} else {
				conditions.push(format!("{} = ?", quote_name(&field.column)));
				params.push(value.clone());
			}
		}
		Ok((format!(" WHERE {}", conditions.join(" AND ")), params))
	}

	fn select_sql(&self, columns: &str) -> Result<(String, Vec<QueryValue>)> {
		let meta = M::meta();
		let (where_sql, params) = self.where_clause()?;
		let ordering = self.ordering.as_ref().unwrap_or(&meta.ordering);
		let mut sql = format!(
			"SELECT {} FROM {}{}",
			columns,
			quote_name(&meta.db_table),
			where_sql
		);
		if !ordering.is_empty() {
			sql.push_str(" ORDER BY ");
			sql.push_str(&meta.order_by_sql(ordering)?);
		}
		if let Some(limit) = self.limit {
			sql.push_str(&format!(" LIMIT {}", limit));
		}
		Ok((sql, params))
	}

	/// Fetches every matching row in order.
	pub async fn all(&self) -> Result<Vec<M>> {
		let (sql, params) = self.select_sql("*")?;
		let rows = self.conn.fetch_all(&sql, params).await?;
		rows.iter().map(M::from_row).collect()
	}

	pub async fn first(&self) -> Result<Option<M>> {
		let mut limited = self.clone();
		limited.limit = Some(1);
		Ok(limited.all().await?.into_iter().next())
	}

	/// Fetches exactly one row.
	pub async fn get(&self) -> Result<M> {
		let mut rows = self.all().await?;
		match rows.len() {
			0 => Err(DatabaseError::DoesNotExist),
			1 => Ok(rows.remove(0)),
			n => Err(DatabaseError::TypeError(format!(
				"get() returned more than one {} -- it returned {}!",
				M::meta().model_name,
				n
			))),
		}
	}

	pub async fn count(&self) -> Result<i64> {
		let meta = M::meta();
		let (where_sql, params) = self.where_clause()?;
		let sql = format!(
			"SELECT COUNT(*) AS \"count\" FROM {}{}",
			quote_name(&meta.db_table),
			where_sql
		);
		self.conn.fetch_one(&sql, params).await?.get("count")
	}

	pub async fn exists(&self) -> Result<bool> {
		Ok(self.count().await? > 0)
	}

	/// Deletes every matching row and returns how many were removed.
	pub async fn delete(&self) -> Result<u64> {
		let meta = M::meta();
		let (where_sql, params) = self.where_clause()?;
		let sql = format!("DELETE FROM {}{}", quote_name(&meta.db_table), where_sql);
		self.conn.execute(&sql, params).await
	}

	/// Values of one field for every matching row, in order.
	pub async fn values_list(&self, field: &str) -> Result<Vec<QueryValue>> {
		let column = quote_name(&M::meta().field(field)?.column);
		let (sql, params) = self.select_sql(&format!("{} AS \"value\"", column))?;
		let rows = self.conn.fetch_all(&sql, params).await?;
		rows.iter()
			.map(|row| {
				row.value("value")
					.cloned()
					.ok_or_else(|| DatabaseError::ColumnNotFound("value".to_string()))
			})
			.collect()
	}
}
