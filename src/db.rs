use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

use crate::roster::Backend;

pub const DB_FILE_NAME: &str = "rosterd.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS workspace_settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    debug!(path = %db_path.to_string_lossy(), "workspace database ready");
    Ok(conn)
}

pub fn settings_get_raw(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value_json FROM workspace_settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn settings_set_raw(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO workspace_settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, value),
    )?;
    Ok(())
}

/// Roster backend over the workspace database's settings table.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl Backend for SqliteBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        settings_get_raw(&self.conn, key)
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        settings_set_raw(&self.conn, key, value)
    }
}
