//! Untyped model rows used by fixture loading and dumping.

use std::sync::Arc;

use crate::connection::DatabaseConnection;
use crate::error::Result;
use crate::models::ModelMeta;
use crate::schema::quote_name;
use crate::types::QueryValue;

/// One row of a model, with values keyed by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
	pub meta: Arc<ModelMeta>,
	pub pk: Option<QueryValue>,
	/// Non-primary-key values in field order.
	pub values: Vec<(String, QueryValue)>,
}

impl ModelInstance {
	pub fn new(meta: Arc<ModelMeta>) -> Self {
		Self {
			meta,
			pk: None,
			values: Vec::new(),
		}
	}

	pub fn with_pk(mut self, pk: impl Into<QueryValue>) -> Self {
		self.pk = Some(pk.into());
		self
	}

	/// Sets a field value, replacing an earlier one.
	pub fn set(&mut self, field: &str, value: QueryValue) {
		match self.values.iter_mut().find(|(name, _)| name == field) {
			Some(slot) => slot.1 = value,
			None => self.values.push((field.to_string(), value)),
		}
	}

	pub fn get(&self, field: &str) -> Option<&QueryValue> {
		self.values
			.iter()
			.find(|(name, _)| name == field)
			.map(|(_, value)| value)
	}

	fn pk_value(&self) -> Option<&QueryValue> {
		self.pk.as_ref().filter(|pk| !pk.is_null())
	}

	fn columns_and_params(&self) -> Result<(Vec<String>, Vec<QueryValue>)> {
		let mut columns = Vec::with_capacity(self.values.len());
		let mut params = Vec::with_capacity(self.values.len());
		for (name, value) in &self.values {
			columns.push(quote_name(&self.meta.field(name)?.column));
			params.push(value.clone());
		}
		Ok((columns, params))
	}

	/// Saves the row without any model-level processing.
	///
	/// With a primary key the row is updated in place, and inserted with that
	/// key when no row was updated. Without one a new row is inserted. Returns
	/// the primary key of the saved row.
	pub async fn save_raw(&self, conn: &DatabaseConnection) -> Result<QueryValue> {
		let table = quote_name(&self.meta.db_table);
		let pk_column = quote_name(&self.meta.pk().column);
		let (columns, params) = self.columns_and_params()?;

		if let Some(pk) = self.pk_value() {
			let updated = if columns.is_empty() {
				let sql = format!("SELECT 1 AS \"present\" FROM {} WHERE {} = ?", table, pk_column);
				conn.fetch_optional(&sql, vec![pk.clone()]).await?.is_some()
			} else {
				let assignments: Vec<String> =
					columns.iter().map(|c| format!("{} = ?", c)).collect();
				let sql = format!(
					"UPDATE {} SET {} WHERE {} = ?",
					table,
					assignments.join(", "),
					pk_column
				);
				let mut update_params = params.clone();
				update_params.push(pk.clone());
				conn.execute(&sql, update_params).await? > 0
			};
			if updated {
				return Ok(pk.clone());
			}

			let mut insert_columns = vec![pk_column];
			insert_columns.extend(columns);
			let mut insert_params = vec![pk.clone()];
			insert_params.extend(params);
			let placeholders = vec!["?"; insert_columns.len()].join(", ");
			let sql = format!(
				"INSERT INTO {} ({}) VALUES ({})",
				table,
				insert_columns.join(", "),
				placeholders
			);
			conn.execute(&sql, insert_params).await?;
			return Ok(pk.clone());
		}

		let sql = if columns.is_empty() {
			format!("INSERT INTO {} DEFAULT VALUES RETURNING {} AS \"pk\"", table, pk_column)
		} else {
			let placeholders = vec!["?"; columns.len()].join(", ");
			format!(
				"INSERT INTO {} ({}) VALUES ({}) RETURNING {} AS \"pk\"",
				table,
				columns.join(", "),
				placeholders,
				pk_column
			)
		};
		let row = conn.fetch_one(&sql, params).await?;
		Ok(row.value("pk").cloned().unwrap_or(QueryValue::Null))
	}

	/// Every row of a model ordered by primary key.
	pub async fn all(conn: &DatabaseConnection, meta: Arc<ModelMeta>) -> Result<Vec<Self>> {
		let sql = format!(
			"SELECT * FROM {} ORDER BY {} ASC",
			quote_name(&meta.db_table),
			quote_name(&meta.pk().column)
		);
		let rows = conn.fetch_all(&sql, Vec::new()).await?;
		let mut instances = Vec::with_capacity(rows.len());
		for row in rows {
			let pk = row.value(&meta.pk().column).cloned();
			let values = meta
				.concrete_fields()
				.map(|field| {
					let value = row.value(&field.column).cloned().unwrap_or(QueryValue::Null);
					(field.name.clone(), field.from_db_value(value))
				})
				.collect();
			instances.push(Self {
				meta: Arc::clone(&meta),
				pk,
				values,
			});
		}
		Ok(instances)
	}
}
