use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;

/// Parse the command line, install logging and build the action to run.
///
/// The returned guard flushes the log file when dropped; keep it alive
/// until the action has finished.
pub fn start() -> Result<(Action, Option<WorkerGuard>)> {
    let matches = commands::new().get_matches();

    let verbosity = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0);
    let guard = telemetry::init(verbosity)?;

    let action = dispatch::handler(&matches)?;

    Ok((action, guard))
}
