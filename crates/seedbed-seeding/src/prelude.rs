//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```ignore
//! use seedbed_seeding::prelude::*;
//!
//! let loader = FixtureLoader::new(conn, apps);
//! let result = loader.load_labels(&["fixture1.json"]).await?;
//! ```

// Error types
pub use crate::error::{SeedingError, SeedingResult};

// Fixture types
pub use crate::fixtures::{
	Compression, Deserializer, FixtureData, FixtureFinder, FixtureFormat, FixtureLabel,
	FixtureLoader, FixtureParser, FixtureRecord, FixtureSerializer, INITIAL_DATA, LoadOptions,
	LoadResult,
};

// Command types
pub use crate::commands::{
	DumpDataArgs, DumpDataCommand, DumpDataOptions, DumpResult, LoadDataArgs, LoadDataCommand,
	LoadDataOptions,
};
