use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "dailyhelper.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace.to_string_lossy()
        )
    })?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;

    // One row per named slot. The value column holds the slot's whole JSON blob.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_slots(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}
