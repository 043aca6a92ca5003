use std::io;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directory for the rolling log file; unset means stderr only
const ENV_LOG_DIR: &str = "BIBLIO_LOG_DIR";

const LOG_FILE_PREFIX: &str = "biblio.log";

/// Filter directive for a `-v` count. Zero defers to `RUST_LOG`.
pub const fn verbosity_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the tracing subscriber.
///
/// Logs go to stderr, so command output on stdout stays clean. With
/// `BIBLIO_LOG_DIR` set they are also written to a daily rolling file.
pub fn init(verbosity: u8) -> Result<Option<WorkerGuard>> {
    let filter = if verbosity == 0 {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity_directive(0)))
    } else {
        EnvFilter::new(verbosity_directive(verbosity))
    };

    let (file_layer, guard) = match std::env::var_os(ENV_LOG_DIR) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_directive() {
        assert_eq!(verbosity_directive(0), "warn");
        assert_eq!(verbosity_directive(1), "info");
        assert_eq!(verbosity_directive(2), "debug");
        assert_eq!(verbosity_directive(3), "trace");
        assert_eq!(verbosity_directive(9), "trace");
    }
}
