//! Tracing subscriber setup for the binary.
//!
//! Priority: `--log-level`, then `RUST_LOG`, then `stac_ingest=info`. Output
//! goes to stderr so stdout carries only the command's JSON result.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Target prefix shared by every crate in the workspace.
const TARGET: &str = "stac_ingest";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber. Later calls are no-ops; `off` skips
/// installation entirely.
pub fn init_logging(level: Option<&str>) {
  LOGGING_INITIALIZED.get_or_init(|| {
    if let Some(level) = level
      && level.eq_ignore_ascii_case("off")
    {
      return;
    }

    tracing_subscriber::registry()
      .with(filter(level))
      .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
      .try_init()
      .ok();
  });
}

fn filter(level: Option<&str>) -> EnvFilter {
  match level {
    Some(level) => EnvFilter::new(directive(level)),
    None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive("info"))),
  }
}

fn directive(level: &str) -> String {
  format!("{}={}", TARGET, level.to_lowercase())
}
