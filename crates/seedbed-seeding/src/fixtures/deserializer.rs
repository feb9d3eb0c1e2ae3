//! Turns fixture records into model instances.

use std::sync::Arc;

use seedbed_db::{Apps, DatabaseError, ModelInstance, ModelMeta};
use serde_json::Value;

use super::format::FixtureRecord;
use crate::error::{SeedingError, SeedingResult};

/// Resolves fixture records against the app registry.
#[derive(Debug, Clone)]
pub struct Deserializer {
	apps: Apps,
	ignore_nonexistent: bool,
}

impl Deserializer {
	pub fn new(apps: Apps) -> Self {
		Self {
			apps,
			ignore_nonexistent: false,
		}
	}

	/// Skip fields the model does not have instead of failing.
	pub fn ignore_nonexistent(mut self, ignore: bool) -> Self {
		self.ignore_nonexistent = ignore;
		self
	}

	/// Model named by a record's `app_label.ModelName` identifier.
	pub fn resolve_model(&self, record: &FixtureRecord) -> SeedingResult<Arc<ModelMeta>> {
		self.apps
			.get_model_by_label(&record.model)
			.map_err(|_| SeedingError::ModelNotFound(record.model.clone()))
	}

	/// Builds an instance from a record.
	///
	/// Fields missing from the record take their defaults. The primary key
	/// comes from `pk`, or from the primary-key field inside `fields`.
	pub fn deserialize(&self, record: &FixtureRecord) -> SeedingResult<ModelInstance> {
		let meta = self.resolve_model(record)?;
		let fields = record
			.fields
			.as_object()
			.ok_or_else(|| SeedingError::ValidationError {
				field: "fields".to_string(),
				message: "Fields must be a JSON object".to_string(),
			})?;

		let pk_field = meta.pk();
		let mut instance = ModelInstance::new(Arc::clone(&meta));
		let pk = record
			.pk
			.as_ref()
			.filter(|pk| !pk.is_null())
			.or_else(|| fields.get(&pk_field.name).filter(|pk| !pk.is_null()));
		if let Some(pk) = pk {
			instance.pk = Some(pk_field.to_query_value(pk)?);
		}

		for name in fields.keys() {
			if name == &pk_field.name {
				continue;
			}
			if meta.get_field(name).is_none() {
				if self.ignore_nonexistent {
					continue;
				}
				return Err(DatabaseError::FieldNotFound {
					model: meta.label(),
					field: name.clone(),
				}
				.into());
			}
		}

		for field in meta.concrete_fields() {
			let value = match fields.get(&field.name) {
				Some(value) => field.to_query_value(value)?,
				None => field.default_value()?,
			};
			instance.set(&field.name, value);
		}

		Ok(instance)
	}

	/// Builds instances for every record, stopping at the first failure.
	pub fn deserialize_all<'a>(
		&self,
		records: impl IntoIterator<Item = &'a FixtureRecord>,
	) -> SeedingResult<Vec<ModelInstance>> {
		records
			.into_iter()
			.map(|record| self.deserialize(record))
			.collect()
	}
}

/// Converts a stored instance back into a fixture record.
pub fn to_record(instance: &ModelInstance) -> FixtureRecord {
	let fields = instance
		.values
		.iter()
		.map(|(name, value)| (name.clone(), value.to_json()))
		.collect::<serde_json::Map<String, Value>>();
	FixtureRecord {
		model: instance.meta.label_lower(),
		pk: instance.pk.as_ref().map(|pk| pk.to_json()),
		fields: Value::Object(fields),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;
	use rstest::rstest;
	use seedbed_db::{AppConfig, FieldDef, QueryValue};
	use serde_json::json;

	fn apps() -> Apps {
		Apps::from_configs([AppConfig::new("news", "/tmp/news").with_model_meta(
			ModelMeta::new("news", "Article")
				.with_field(FieldDef::char("headline", 100).with_default("Default headline"))
				.with_field(FieldDef::datetime("pub_date")),
		)])
		.unwrap()
	}

	#[rstest]
	fn test_deserialize_record() {
		let record = FixtureRecord::with_pk(
			"news.article",
			json!(3),
			json!({"headline": "Time to reform copyright", "pub_date": "2006-06-16 13:00:00"}),
		);
		let instance = Deserializer::new(apps()).deserialize(&record).unwrap();
		assert_eq!(instance.pk, Some(QueryValue::Int(3)));
		assert_eq!(
			instance.get("pub_date"),
			Some(&QueryValue::Timestamp(
				NaiveDate::from_ymd_opt(2006, 6, 16)
					.unwrap()
					.and_hms_opt(13, 0, 0)
					.unwrap()
			))
		);
	}

	#[rstest]
	fn test_missing_field_takes_default() {
		let record = FixtureRecord::new("news.Article", json!({"pub_date": "2006-06-16 13:00:00"}));
		let instance = Deserializer::new(apps()).deserialize(&record).unwrap();
		assert_eq!(instance.pk, None);
		assert_eq!(
			instance.get("headline"),
			Some(&QueryValue::String("Default headline".to_string()))
		);
	}

	#[rstest]
	fn test_pk_inside_fields() {
		let record = FixtureRecord::new(
			"news.article",
			json!({"id": "7", "pub_date": "2006-06-16 13:00:00"}),
		);
		let instance = Deserializer::new(apps()).deserialize(&record).unwrap();
		assert_eq!(instance.pk, Some(QueryValue::Int(7)));
	}

	#[rstest]
	fn test_unknown_model() {
		let record = FixtureRecord::new("news.Comment", json!({}));
		let err = Deserializer::new(apps()).deserialize(&record).unwrap_err();
		assert_eq!(err.to_string(), "Invalid model identifier: 'news.Comment'");
	}

	#[rstest]
	fn test_unknown_field_unless_ignored() {
		let record = FixtureRecord::new(
			"news.article",
			json!({"pub_date": "2006-06-16 13:00:00", "author": "nobody"}),
		);
		let err = Deserializer::new(apps()).deserialize(&record).unwrap_err();
		assert_eq!(err.to_string(), "news.Article has no field named 'author'");

		let instance = Deserializer::new(apps())
			.ignore_nonexistent(true)
			.deserialize(&record)
			.unwrap();
		assert!(instance.get("author").is_none());
	}

	#[rstest]
	fn test_to_record_uses_lowercase_label() {
		let record = FixtureRecord::with_pk(
			"news.Article",
			json!(2),
			json!({"headline": "Poker has no place on ESPN", "pub_date": "2006-06-16 12:00:00"}),
		);
		let instance = Deserializer::new(apps()).deserialize(&record).unwrap();
		let dumped = to_record(&instance);
		assert_eq!(dumped.model, "news.article");
		assert_eq!(dumped.pk, Some(json!(2)));
		assert_eq!(dumped.fields["pub_date"], json!("2006-06-16T12:00:00"));
	}
}
