//! Fixture system.
//!
//! - [`FixtureRecord`] / [`FixtureData`]: records in the Django fixture shape
//! - [`FixtureLabel`]: `name[.format][.compression]` labels
//! - [`FixtureFinder`]: locates fixture files for a label
//! - [`FixtureParser`]: reads JSON (and YAML) files, gzip-compressed or not
//! - [`Deserializer`]: turns records into model instances
//! - [`FixtureLoader`]: installs fixtures into a database
//! - [`FixtureSerializer`]: writes records back out

pub mod deserializer;
pub mod discovery;
pub mod format;
pub mod label;
pub mod loader;
pub mod parser;
pub mod serializer;

pub use deserializer::{Deserializer, to_record};
pub use discovery::FixtureFinder;
pub use format::{Compression, FixtureData, FixtureFormat, FixtureRecord};
pub use label::FixtureLabel;
pub use loader::{FixtureLoader, INITIAL_DATA, LoadOptions, LoadResult};
pub use parser::FixtureParser;
pub use serializer::FixtureSerializer;
