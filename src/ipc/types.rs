use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use crate::db::{self, SqliteBackend};
use crate::roster::{RecordController, RecordStore};

pub type Roster = RecordController<SqliteBackend>;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub roster: Option<Roster>,
}

impl AppState {
    /// Opens `path` and loads its roster. On failure the previously open
    /// workspace, if any, stays selected.
    pub fn open_workspace(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let conn = db::open_db(&path)?;
        let store = RecordStore::open(SqliteBackend::new(conn))?;
        info!(
            workspace = %path.to_string_lossy(),
            students = store.len(),
            "workspace opened"
        );
        self.roster = Some(RecordController::new(store));
        self.workspace = Some(path);
        Ok(())
    }
}
