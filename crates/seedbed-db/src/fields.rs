//! Model field definitions and value coercion.

use serde_json::Value;

use crate::error::{DatabaseError, Result};
use crate::schema::quote_name;
use crate::types::{DATE_FORMAT, QueryValue, parse_datetime};

/// Column type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	/// Auto-incrementing integer primary key.
	Auto,
	Char { max_length: usize },
	Text,
	Integer,
	Boolean,
	Float,
	DateTime,
	Date,
}

impl FieldType {
	/// SQLite column type
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::fields::FieldType;
	///
	/// assert_eq!(FieldType::Char { max_length: 100 }.sql_type(), "varchar(100)");
	/// assert_eq!(FieldType::DateTime.sql_type(), "datetime");
	/// ```
	pub fn sql_type(&self) -> String {
		match self {
			FieldType::Auto | FieldType::Integer => "integer".to_string(),
			FieldType::Char { max_length } => format!("varchar({})", max_length),
			FieldType::Text => "text".to_string(),
			FieldType::Boolean => "bool".to_string(),
			FieldType::Float => "real".to_string(),
			FieldType::DateTime => "datetime".to_string(),
			FieldType::Date => "date".to_string(),
		}
	}

	fn is_textual(&self) -> bool {
		matches!(self, FieldType::Char { .. } | FieldType::Text)
	}
}

/// A single model field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
	pub name: String,
	pub column: String,
	pub field_type: FieldType,
	pub null: bool,
	pub default: Option<Value>,
	pub primary_key: bool,
}

impl FieldDef {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		let name = name.into();
		Self {
			column: name.clone(),
			name,
			field_type,
			null: false,
			default: None,
			primary_key: false,
		}
	}

	/// Auto-incrementing primary key
	pub fn auto(name: impl Into<String>) -> Self {
		let mut field = Self::new(name, FieldType::Auto);
		field.primary_key = true;
		field
	}

	pub fn char(name: impl Into<String>, max_length: usize) -> Self {
		Self::new(name, FieldType::Char { max_length })
	}

	pub fn text(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::Text)
	}

	pub fn integer(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::Integer)
	}

	pub fn boolean(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::Boolean)
	}

	pub fn float(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::Float)
	}

	pub fn datetime(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::DateTime)
	}

	pub fn date(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::Date)
	}

	pub fn nullable(mut self) -> Self {
		self.null = true;
		self
	}

	pub fn with_default(mut self, default: impl Into<Value>) -> Self {
		self.default = Some(default.into());
		self
	}

	pub fn db_column(mut self, column: impl Into<String>) -> Self {
		self.column = column.into();
		self
	}

	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self
	}

	/// Column definition used in `CREATE TABLE`
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::fields::FieldDef;
	///
	/// assert_eq!(
	///     FieldDef::auto("id").column_definition(),
	///     "\"id\" integer NOT NULL PRIMARY KEY"
	/// );
	/// assert_eq!(
	///     FieldDef::char("name", 100).nullable().column_definition(),
	///     "\"name\" varchar(100) NULL"
	/// );
	/// ```
	pub fn column_definition(&self) -> String {
		let mut definition = format!(
			"{} {} {}",
			quote_name(&self.column),
			self.field_type.sql_type(),
			if self.null { "NULL" } else { "NOT NULL" }
		);
		if self.primary_key {
			definition.push_str(" PRIMARY KEY");
		}
		definition
	}

	/// Value used when a field is absent from the input.
	///
	/// The explicit default wins, then `""` for text fields, then `NULL`
	/// for nullable fields.
	pub fn default_value(&self) -> Result<QueryValue> {
		if let Some(default) = &self.default {
			return self.to_query_value(default);
		}
		if self.field_type.is_textual() {
			return Ok(QueryValue::String(String::new()));
		}
		if self.null {
			return Ok(QueryValue::Null);
		}
		Err(self.invalid("this field is required"))
	}

	/// Coerce a JSON value to the storage value of this field
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::fields::FieldDef;
	/// use seedbed_db::types::QueryValue;
	/// use serde_json::json;
	///
	/// let field = FieldDef::integer("rank");
	/// assert_eq!(field.to_query_value(&json!("7")).unwrap(), QueryValue::Int(7));
	/// assert!(field.to_query_value(&json!(null)).is_err());
	/// ```
	pub fn to_query_value(&self, value: &Value) -> Result<QueryValue> {
		if value.is_null() {
			return if self.null {
				Ok(QueryValue::Null)
			} else {
				Err(self.invalid("this field cannot be null"))
			};
		}

		match self.field_type {
			FieldType::Auto | FieldType::Integer => match value {
				Value::Number(n) => n
					.as_i64()
					.or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
					.map(QueryValue::Int)
					.ok_or_else(|| self.invalid(format!("'{}' value must be an integer", n))),
				Value::String(s) => s
					.trim()
					.parse::<i64>()
					.map(QueryValue::Int)
					.map_err(|_| self.invalid(format!("'{}' value must be an integer", s))),
				Value::Bool(b) => Ok(QueryValue::Int(i64::from(*b))),
				_ => Err(self.invalid("value must be an integer")),
			},
			FieldType::Char { .. } | FieldType::Text => match value {
				Value::String(s) => Ok(QueryValue::String(s.clone())),
				Value::Number(n) => Ok(QueryValue::String(n.to_string())),
				Value::Bool(b) => Ok(QueryValue::String(b.to_string())),
				_ => Err(self.invalid("value must be a string")),
			},
			FieldType::Boolean => match value {
				Value::Bool(b) => Ok(QueryValue::Bool(*b)),
				Value::Number(n) => match n.as_i64() {
					Some(0) => Ok(QueryValue::Bool(false)),
					Some(1) => Ok(QueryValue::Bool(true)),
					_ => Err(self.invalid(format!("'{}' value must be either True or False", n))),
				},
				Value::String(s) => match s.trim().to_lowercase().as_str() {
					"true" | "t" | "1" => Ok(QueryValue::Bool(true)),
					"false" | "f" | "0" => Ok(QueryValue::Bool(false)),
					_ => Err(self.invalid(format!("'{}' value must be either True or False", s))),
				},
				_ => Err(self.invalid("value must be either True or False")),
			},
			FieldType::Float => match value {
				Value::Number(n) => n
					.as_f64()
					.map(QueryValue::Float)
					.ok_or_else(|| self.invalid("value must be a float")),
				Value::String(s) => s
					.trim()
					.parse::<f64>()
					.map(QueryValue::Float)
					.map_err(|_| self.invalid(format!("'{}' value must be a float", s))),
				_ => Err(self.invalid("value must be a float")),
			},
			FieldType::DateTime => match value {
				Value::String(s) => parse_datetime(s).map(QueryValue::Timestamp).ok_or_else(|| {
					self.invalid(format!(
						"'{}' value has an invalid format. It must be in YYYY-MM-DD HH:MM[:ss[.uuuuuu]] format",
						s
					))
				}),
				_ => Err(self.invalid("value must be a datetime string")),
			},
			FieldType::Date => match value {
				Value::String(s) => chrono::NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
					.map(|d| QueryValue::String(d.format(DATE_FORMAT).to_string()))
					.map_err(|_| {
						self.invalid(format!(
							"'{}' value has an invalid date format. It must be in YYYY-MM-DD format",
							s
						))
					}),
				_ => Err(self.invalid("value must be a date string")),
			},
		}
	}

	/// Restores the field's natural value from SQLite storage.
	pub fn from_db_value(&self, value: QueryValue) -> QueryValue {
		match (self.field_type, value) {
			(FieldType::Boolean, QueryValue::Int(i)) => QueryValue::Bool(i != 0),
			(FieldType::DateTime, QueryValue::String(s)) => match parse_datetime(&s) {
				Some(dt) => QueryValue::Timestamp(dt),
				None => QueryValue::String(s),
			},
			(_, value) => value,
		}
	}

	fn invalid(&self, message: impl Into<String>) -> DatabaseError {
		DatabaseError::ValidationError {
			field: self.name.clone(),
			message: message.into(),
		}
	}
}
