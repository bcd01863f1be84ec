//! The single write connection, serialized behind a mutex.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use cadence_core::errors::CadenceResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// Owns the one connection allowed to write. All writers serialize here;
/// WAL keeps readers unblocked in file-backed mode.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> CadenceResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> CadenceResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure against the write connection.
    pub fn with_conn_sync<F, T>(&self, f: F) -> CadenceResult<T>
    where
        F: FnOnce(&Connection) -> CadenceResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write connection lock poisoned: {e}")))?;
        f(&guard)
    }
}
