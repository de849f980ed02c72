//! Shared helpers for the integration tests.

use std::sync::Once;

use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Routes the crate's `tracing` output through the test harness.
///
/// Scope and run loop lifecycles are logged at `trace`, so `--nocapture`
/// shows which task was still alive when a case hangs.
pub fn init_test_logging() {
  INIT_LOGGING.call_once(|| {
    let _ = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::TRACE)
      .with_test_writer()
      .with_thread_names(true)
      .with_span_events(FmtSpan::CLOSE)
      .with_ansi(false)
      .try_init();
  });
}
