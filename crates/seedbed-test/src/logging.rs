//! Test logging

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize logging for tests (call once)
///
/// Output goes through the test harness capture and is filtered by
/// `RUST_LOG`, defaulting to `warn`.
///
/// # Examples
///
/// ```
/// use seedbed_test::logging::init_test_logging;
///
/// init_test_logging();
/// init_test_logging();
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(
				EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
			)
			.with_test_writer()
			.try_init();
	});
}
