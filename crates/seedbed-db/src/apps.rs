//! Application registry.
//!
//! An app groups models under a label and owns a directory on disk whose
//! `fixtures/` subdirectory is searched by the fixture loader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{DatabaseError, Result};
use crate::models::{Model, ModelMeta};

/// Configuration of one installed app.
#[derive(Debug, Clone)]
pub struct AppConfig {
	pub label: String,
	pub path: PathBuf,
	pub models: Vec<Arc<ModelMeta>>,
}

impl AppConfig {
	pub fn new(label: impl Into<String>, path: impl AsRef<Path>) -> Self {
		Self {
			label: label.into(),
			path: path.as_ref().to_path_buf(),
			models: Vec::new(),
		}
	}

	/// Registers a typed model with this app.
	pub fn with_model<M: Model>(self) -> Self {
		self.with_model_meta(M::meta().clone())
	}

	pub fn with_model_meta(mut self, meta: ModelMeta) -> Self {
		self.models.push(Arc::new(meta));
		self
	}

	/// Directory searched for this app's fixtures
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::apps::AppConfig;
	/// use std::path::Path;
	///
	/// let app = AppConfig::new("library", "/srv/library");
	/// assert_eq!(app.fixtures_dir(), Path::new("/srv/library/fixtures"));
	/// ```
	pub fn fixtures_dir(&self) -> PathBuf {
		self.path.join("fixtures")
	}

	/// Case-insensitive model lookup
	pub fn get_model(&self, model_name: &str) -> Option<Arc<ModelMeta>> {
		self.models
			.iter()
			.find(|m| m.model_name.eq_ignore_ascii_case(model_name))
			.cloned()
	}
}

/// Registry of installed apps.
///
/// Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct Apps {
	inner: Arc<RwLock<Vec<AppConfig>>>,
}

impl Apps {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry from app configs.
	pub fn from_configs(configs: impl IntoIterator<Item = AppConfig>) -> Result<Self> {
		let apps = Self::new();
		for config in configs {
			apps.register(config)?;
		}
		Ok(apps)
	}

	/// Installs an app.
	///
	/// Fails when the label is taken or a model declares another app label.
	pub fn register(&self, config: AppConfig) -> Result<()> {
		if let Some(model) = config.models.iter().find(|m| m.app_label != config.label) {
			return Err(DatabaseError::ImproperlyConfigured(format!(
				"Model '{}' declares app label '{}' but is registered with app '{}'",
				model.model_name, model.app_label, config.label
			)));
		}
		let mut apps = self.inner.write();
		if apps.iter().any(|a| a.label == config.label) {
			return Err(DatabaseError::ImproperlyConfigured(format!(
				"Application labels aren't unique, duplicates: {}",
				config.label
			)));
		}
		apps.push(config);
		Ok(())
	}

	pub fn is_installed(&self, label: &str) -> bool {
		self.inner.read().iter().any(|a| a.label == label)
	}

	pub fn get_app_config(&self, label: &str) -> Result<AppConfig> {
		self.inner
			.read()
			.iter()
			.find(|a| a.label == label)
			.cloned()
			.ok_or_else(|| DatabaseError::AppNotFound(label.to_string()))
	}

	/// Installed apps in registration order
	pub fn app_configs(&self) -> Vec<AppConfig> {
		self.inner.read().clone()
	}

	/// Looks up a model by app label and case-insensitive model name.
	pub fn get_model(&self, app_label: &str, model_name: &str) -> Result<Arc<ModelMeta>> {
		let apps = self.inner.read();
		let app = apps
			.iter()
			.find(|a| a.label == app_label)
			.ok_or_else(|| DatabaseError::AppNotFound(app_label.to_string()))?;
		app.get_model(model_name).ok_or_else(|| {
			DatabaseError::ModelNotFound(format!("{}.{}", app_label, model_name))
		})
	}

	/// Looks up a model from an `app_label.ModelName` label.
	pub fn get_model_by_label(&self, label: &str) -> Result<Arc<ModelMeta>> {
		let (app_label, model_name) = label
			.split_once('.')
			.ok_or_else(|| DatabaseError::ModelNotFound(label.to_string()))?;
		self.get_model(app_label, model_name)
	}

	/// Every registered model, in registration order
	pub fn all_models(&self) -> Vec<Arc<ModelMeta>> {
		self.inner
			.read()
			.iter()
			.flat_map(|a| a.models.iter().cloned())
			.collect()
	}
}
