use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::Connection;

use super::error::{Result, StoreError};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".customer-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "customers.sqlite";

/// Open (creating if needed) the database at `path` and make sure the
/// `customers` table exists. Open and schema failures both map to
/// `Unavailable` because from the caller's point of view there is no store to
/// talk to in either case.
pub(super) fn open_at(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| StoreError::Unavailable(format!("cannot create data directory: {err}")))?;
    }

    let conn = Connection::open(path)
        .map_err(|err| StoreError::Unavailable(format!("cannot open database: {err}")))?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the single-table schema if this is a fresh database.
pub(super) fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL
        )",
        [],
    )
    .map_err(|err| StoreError::Unavailable(format!("cannot create customers table: {err}")))?;
    Ok(())
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub(super) fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| StoreError::Unavailable("could not locate home directory".to_string()))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
