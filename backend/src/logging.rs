use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`.
///
/// Calling it again (a second engine in the same process) keeps the first
/// subscriber.
pub fn init_tracing(default_directive: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

  let installed = tracing_subscriber::registry().with(fmt::layer()).with(filter).try_init();
  if installed.is_err() {
    debug!("tracing subscriber already installed");
  }
}
