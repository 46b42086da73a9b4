//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber writing to stderr, filtered by `filter`.
///
/// An unparsable filter falls back to `info`. Stdout is left to the
/// binaries' own output.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
