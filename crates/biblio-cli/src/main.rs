//! biblio - command line client for the library management API.
//!
//! Logs in against the server, keeps the session between invocations,
//! and browses the catalog and loans from the terminal.

mod cli;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let (action, _log_guard) = cli::start()?;

    action.execute().await?;

    Ok(())
}
