pub mod migrations;
pub mod queries;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Closes the shared connection once every other handle has been dropped.
pub fn close_db(db: Arc<Mutex<Connection>>) -> anyhow::Result<()> {
    let Ok(mutex) = Arc::try_unwrap(db) else {
        tracing::warn!("database still in use at shutdown, leaving it to drop");
        return Ok(());
    };
    let conn = mutex
        .into_inner()
        .map_err(|_| anyhow::anyhow!("database mutex poisoned"))?;
    conn.close()
        .map_err(|(_, e)| e)
        .context("failed to close database")?;
    tracing::info!("database closed");
    Ok(())
}
