//! Typed `loaddata` and `dumpdata` commands.

pub mod dumpdata;
pub mod loaddata;

pub use dumpdata::{DumpDataArgs, DumpDataCommand, DumpDataOptions, DumpResult};
pub use loaddata::{LoadDataArgs, LoadDataCommand, LoadDataOptions};
