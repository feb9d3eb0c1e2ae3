//! Testing utilities for seedbed projects
//!
//! - [`TestDatabase`]: a fresh in-memory database per test, synchronized
//!   with the installed models
//! - [`TestCase`] / [`TransactionTestCase`]: fixture setup and isolation
//! - [`assertions`]: ordered and unordered query result comparisons
//! - [`logging`]: one-time `tracing` setup for tests

pub mod assertions;
pub mod database;
pub mod logging;
pub mod testcase;

pub use assertions::{assert_queryset_eq, assert_queryset_eq_unordered};
pub use database::TestDatabase;
pub use logging::init_test_logging;
pub use testcase::{TestCase, TransactionTestCase};
