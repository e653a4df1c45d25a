use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::error::{wrap, StorageError, StorageResult};
use crate::models::Column;

/// Name of the single table this application owns.
pub(crate) const TABLE: &str = "products";

/// Handle to the on-disk product store. The struct only remembers the file
/// path: every operation opens its own connection and drops it before
/// returning, success or failure, so nothing stays open between user actions.
#[derive(Debug, Clone)]
pub struct ProductStore {
    path: PathBuf,
}

impl ProductStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open a fresh connection. The caller picks which error variant a failed
    /// open turns into, since it belongs to whatever operation was running.
    pub(crate) fn open(&self, variant: fn(String) -> StorageError) -> StorageResult<Connection> {
        Connection::open(&self.path).map_err(wrap(variant))
    }

    /// Create the products table if it is missing. Running it against an
    /// existing database leaves the table untouched.
    pub fn ensure_schema(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(wrap(StorageError::Schema))?;
        }

        let conn = self.open(StorageError::Schema)?;
        let columns = Column::ALL
            .iter()
            .map(|column| format!("{} {} NOT NULL", column.as_str(), column.kind().sql_type()))
            .collect::<Vec<_>>()
            .join(",\n            ");
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {columns}
        )"
        );
        debug!(path = %self.path.display(), "ensuring schema");
        conn.execute(&sql, []).map_err(wrap(StorageError::Schema))?;
        Ok(())
    }

    /// Map every column of the products table to its declared type, straight
    /// from `PRAGMA table_info`.
    pub fn column_types(&self) -> StorageResult<BTreeMap<String, String>> {
        let conn = self.open(StorageError::Introspect)?;
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({TABLE})"))
            .map_err(wrap(StorageError::Introspect))?;

        let types = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
            .map_err(wrap(StorageError::Introspect))?
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map_err(wrap(StorageError::Introspect))?;

        Ok(types)
    }

    /// Check that the declared column types on disk still agree with the fixed
    /// kinds in [`Column`]. Form validation relies on those kinds, so a file
    /// created by something else is reported instead of silently accepted.
    pub fn verify_schema(&self) -> StorageResult<()> {
        let types = self.column_types()?;
        if types.is_empty() {
            return Err(StorageError::Introspect(format!(
                "table {TABLE} does not exist"
            )));
        }

        for column in Column::ALL {
            let expected = column.kind().sql_type();
            let drift = match types.get(column.as_str()) {
                Some(declared) if declared.eq_ignore_ascii_case(expected) => continue,
                Some(declared) => format!("column {column} is declared {declared}, expected {expected}"),
                None => format!("column {column} is missing"),
            };
            warn!(path = %self.path.display(), "schema drift: {drift}");
            return Err(StorageError::Introspect(drift));
        }

        info!(path = %self.path.display(), "schema verified");
        Ok(())
    }
}
