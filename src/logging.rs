// src/logging.rs
//! Subscriber setup for hosts embedding the jobs.

use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber. `RUST_LOG` wins over `verbosity` when set.
///
/// Calling it twice is harmless; the first subscriber stays installed.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_thread_ids(verbosity >= 3)
        .try_init();
}
