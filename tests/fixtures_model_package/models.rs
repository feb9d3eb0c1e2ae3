use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use seedbed::db::{FieldDef, Model, ModelMeta, Result, Row};

pub const APP_LABEL: &str = "fixtures_model_package";

static ARTICLE: Lazy<ModelMeta> = Lazy::new(|| {
	ModelMeta::new(APP_LABEL, "Article")
		.with_field(FieldDef::char("headline", 100).with_default("Default headline"))
		.with_field(FieldDef::datetime("pub_date"))
		.with_ordering(&["-pub_date", "headline"])
});

static BOOK: Lazy<ModelMeta> = Lazy::new(|| {
	ModelMeta::new(APP_LABEL, "Book")
		.with_field(FieldDef::char("name", 100))
		.with_ordering(&["name"])
});

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
	pub id: i64,
	pub headline: String,
	pub pub_date: NaiveDateTime,
}

impl Model for Article {
	fn meta() -> &'static ModelMeta {
		&ARTICLE
	}

	fn from_row(row: &Row) -> Result<Self> {
		Ok(Self {
			id: row.get("id")?,
			headline: row.get("headline")?,
			pub_date: row.get("pub_date")?,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
	pub id: i64,
	pub name: String,
}

impl Model for Book {
	fn meta() -> &'static ModelMeta {
		&BOOK
	}

	fn from_row(row: &Row) -> Result<Self> {
		Ok(Self {
			id: row.get("id")?,
			name: row.get("name")?,
		})
	}
}
