//! SQLite database layer for seedbed.
//!
//! This crate provides the pieces the fixture engine and management
//! commands are built on:
//!
//! - **Connection**: a single SQLite connection with Django-style
//!   transaction control (autocommit, manual mode, nested atomic blocks)
//! - **Models**: static model metadata, a registry of installed apps, and
//!   typed query sets
//! - **Schema**: table creation and flushing
//!
//! # Quick Start
//!
//! ```ignore
//! use seedbed_db::{DatabaseConnection, SchemaEditor};
//!
//! let conn = DatabaseConnection::connect_memory().await?;
//! SchemaEditor::new(conn.clone()).create_model(Article::meta()).await?;
//!
//! let atomic = conn.atomic().await?;
//! conn.execute("DELETE FROM \"news_article\"", vec![]).await?;
//! atomic.rollback().await?;
//! ```
//!
//! # Transactions
//!
//! Outside any atomic block the connection is in autocommit mode and every
//! statement commits on its own. [`DatabaseConnection::set_autocommit`]
//! switches to manual mode, where [`DatabaseConnection::commit`] and
//! [`DatabaseConnection::rollback`] end the open transaction. Atomic blocks
//! nest through savepoints; an [`Atomic`] guard dropped without being
//! finished rolls its block back.

pub mod apps;
pub mod config;
pub mod connection;
pub mod error;
pub mod fields;
pub mod instance;
pub mod models;
pub mod query;
pub mod schema;
pub mod transaction;
pub mod types;

pub use apps::{AppConfig, Apps};
pub use config::{DEFAULT_DB_ALIAS, DatabaseConfig};
pub use connection::{Atomic, DatabaseConnection};
pub use error::{DatabaseError, Result};
pub use fields::{FieldDef, FieldType};
pub use instance::ModelInstance;
pub use models::{Model, ModelMeta};
pub use query::QuerySet;
pub use schema::SchemaEditor;
pub use transaction::TransactionState;
pub use types::{QueryValue, Row};
