//! Model metadata and the `Model` trait.

use crate::connection::DatabaseConnection;
use crate::error::{DatabaseError, Result};
use crate::fields::FieldDef;
use crate::query::QuerySet;
use crate::schema::quote_name;
use crate::types::Row;

/// Metadata describing a model and its table.
///
/// # Example
///
/// ```
/// use seedbed_db::fields::FieldDef;
/// use seedbed_db::models::ModelMeta;
///
/// let meta = ModelMeta::new("library", "Book")
///     .with_field(FieldDef::char("name", 100))
///     .with_ordering(&["name"]);
///
/// assert_eq!(meta.label(), "library.Book");
/// assert_eq!(meta.db_table, "library_book");
/// assert_eq!(meta.pk().name, "id");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeta {
	pub app_label: String,
	pub model_name: String,
	pub db_table: String,
	pub fields: Vec<FieldDef>,
	pub ordering: Vec<String>,
}

impl ModelMeta {
	/// Creates metadata with an `id` auto primary key and the default table name.
	pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
		let app_label = app_label.into();
		let model_name = model_name.into();
		Self {
			db_table: format!("{}_{}", app_label, model_name.to_lowercase()),
			app_label,
			model_name,
			fields: vec![FieldDef::auto("id")],
			ordering: Vec::new(),
		}
	}

	/// Adds a field. A primary-key field replaces the current primary key.
	pub fn with_field(mut self, field: FieldDef) -> Self {
		if field.primary_key {
			self.fields.retain(|f| !f.primary_key);
			self.fields.insert(0, field);
		} else {
			self.fields.push(field);
		}
		self
	}

	pub fn with_db_table(mut self, db_table: impl Into<String>) -> Self {
		self.db_table = db_table.into();
		self
	}

	/// Default ordering. Prefix a field with `-` for descending order.
	pub fn with_ordering(mut self, ordering: &[&str]) -> Self {
		self.ordering = ordering.iter().map(|s| s.to_string()).collect();
		self
	}

	/// `app_label.ModelName`
	pub fn label(&self) -> String {
		format!("{}.{}", self.app_label, self.model_name)
	}

	/// `app_label.modelname`
	pub fn label_lower(&self) -> String {
		self.label().to_lowercase()
	}

	pub fn pk(&self) -> &FieldDef {
		self.fields
			.iter()
			.find(|f| f.primary_key)
			.unwrap_or(&self.fields[0])
	}

	/// Looks up a field by name; `pk` resolves to the primary key.
	pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
		if name == "pk" {
			return Some(self.pk());
		}
		self.fields.iter().find(|f| f.name == name)
	}

	/// Like [`get_field`](Self::get_field) but fails with `FieldNotFound`.
	pub fn field(&self, name: &str) -> Result<&FieldDef> {
		self.get_field(name)
			.ok_or_else(|| DatabaseError::FieldNotFound {
				model: self.label(),
				field: name.to_string(),
			})
	}

	/// Fields other than the primary key
	pub fn concrete_fields(&self) -> impl Iterator<Item = &FieldDef> {
		self.fields.iter().filter(|f| !f.primary_key)
	}

	/// Builds an `ORDER BY` clause body from ordering entries.
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::fields::FieldDef;
	/// use seedbed_db::models::ModelMeta;
	///
	/// let meta = ModelMeta::new("news", "Article")
	///     .with_field(FieldDef::char("headline", 100))
	///     .with_field(FieldDef::datetime("pub_date"));
	/// let ordering = vec!["-pub_date".to_string(), "headline".to_string()];
	///
	/// assert_eq!(
	///     meta.order_by_sql(&ordering).unwrap(),
	///     "\"pub_date\" DESC, \"headline\" ASC"
	/// );
	/// ```
	pub fn order_by_sql(&self, ordering: &[String]) -> Result<String> {
		let mut parts = Vec::with_capacity(ordering.len());
		for entry in ordering {
			let (name, direction) = match entry.strip_prefix('-') {
				Some(name) => (name, "DESC"),
				None => (entry.as_str(), "ASC"),
			};
			let field = self.field(name)?;
			parts.push(format!("{} {}", quote_name(&field.column), direction));
		}
		Ok(parts.join(", "))
	}
}

/// A type backed by a database table.
///
/// # Example
///
/// ```
/// use once_cell::sync::Lazy;
/// use seedbed_db::{FieldDef, Model, ModelMeta, Result, Row};
///
/// struct Book {
///     name: String,
/// }
///
/// static BOOK: Lazy<ModelMeta> = Lazy::new(|| {
///     ModelMeta::new("library", "Book").with_field(FieldDef::char("name", 100))
/// });
///
/// impl Model for Book {
///     fn meta() -> &'static ModelMeta {
///         &BOOK
///     }
///
///     fn from_row(row: &Row) -> Result<Self> {
///         Ok(Self { name: row.get("name")? })
///     }
/// }
/// ```
pub trait Model: Sized + Send + Sync + 'static {
	fn meta() -> &'static ModelMeta;

	fn from_row(row: &Row) -> Result<Self>;

	/// Query set over all rows of this model
	fn objects(conn: &DatabaseConnection) -> QuerySet<Self> {
		QuerySet::new(conn.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fields::FieldType;
	use rstest::rstest;

	fn article() -> ModelMeta {
		ModelMeta::new("fixtures_model_package", "Article")
			.with_field(FieldDef::char("headline", 100).with_default("Default headline"))
			.with_field(FieldDef::datetime("pub_date"))
			.with_ordering(&["-pub_date", "headline"])
	}

	#[rstest]
	fn test_default_table_and_labels() {
		let meta = article();
		assert_eq!(meta.db_table, "fixtures_model_package_article");
		assert_eq!(meta.label(), "fixtures_model_package.Article");
		assert_eq!(meta.label_lower(), "fixtures_model_package.article");
	}

	#[rstest]
	fn test_custom_primary_key_replaces_id() {
		let meta = ModelMeta::new("shop", "Item")
			.with_field(FieldDef::char("sku", 20).primary_key())
			.with_field(FieldDef::integer("stock"));
		assert_eq!(meta.pk().name, "sku");
		assert_eq!(meta.fields.len(), 2);
		assert!(meta.get_field("id").is_none());
		assert_eq!(meta.field("pk").unwrap().field_type, FieldType::Char { max_length: 20 });
	}

	#[rstest]
	fn test_concrete_fields_skip_pk() {
		let names: Vec<_> = article().concrete_fields().map(|f| f.name.clone()).collect();
		assert_eq!(names, vec!["headline", "pub_date"]);
	}

	#[rstest]
	fn test_order_by_unknown_field() {
		let result = article().order_by_sql(&["title".to_string()]);
		assert!(matches!(result, Err(DatabaseError::FieldNotFound { .. })));
	}
}
