//! Logging setup
//!
//! Installs a tracing subscriber writing to stderr. The level filter sits
//! behind a reload layer so verbosity can be changed after start-up.

use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

const DEFAULT_LEVEL: &str = "info";
const VERBOSE_LEVEL: &str = "debug";

/// Handle for adjusting the active log level.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Switch between `debug` (verbose) and `info`.
    pub fn set_verbose(&self, verbose: bool) -> Result<(), reload::Error> {
        let level = if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL };
        self.filter.modify(|filter| *filter = EnvFilter::new(level))
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the initial level.
///
/// A second call leaves the first subscriber in place; the returned handle
/// then reports an error from `set_verbose`.
pub fn init(color: bool) -> LogHandle {
    let initial =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let (filter, handle) = reload::Layer::new(initial);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(color)
                .with_target(false),
        )
        .try_init();

    LogHandle { filter: handle }
}
