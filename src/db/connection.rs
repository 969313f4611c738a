use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::info;

use crate::errors::ServerError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Statements between deadline checks.
const PROGRESS_OPS: i32 = 1_000;

// Thread-local connection slots, one per database path.
thread_local! {
    static DB_CONNS: RefCell<HashMap<String, Connection>> = RefCell::new(HashMap::new());
}

#[derive(Clone, Debug)]
pub struct Database {
    path: String,
    busy_timeout: Duration,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(10),
        }
    }

    /// How long a statement waits on a locked database before failing.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open or fetch this thread's connection and run `f(conn)`.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        DB_CONNS
            .try_with(|cell| {
                let mut slots = cell.borrow_mut();
                if !slots.contains_key(&self.path) {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| ServerError::DbError(format!("Open DB failed: {e}")))?;
                    conn.busy_timeout(self.busy_timeout)
                        .map_err(|e| ServerError::DbError(format!("Configure DB failed: {e}")))?;
                    slots.insert(self.path.clone(), conn);
                }
                let conn = slots.get_mut(&self.path).ok_or(ServerError::InternalError)?;
                f(conn)
            })
            .map_err(|_| ServerError::InternalError)?
    }
}

/// Apply the embedded schema. Idempotent.
pub fn init_db(db: &Database) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| ServerError::DbError(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    info!(path = db.path(), "database initialized");
    Ok(())
}

/// Runs a read with a deadline. SQLite's progress handler interrupts the
/// statement once `timeout` has elapsed, which surfaces as `Timeout`.
pub fn with_read_deadline<F, T>(conn: &Connection, timeout: Duration, f: F) -> Result<T, ServerError>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let started = Instant::now();
    // No representable deadline means no practical limit.
    match started.checked_add(timeout) {
        Some(deadline) => conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline)),
        None => conn.progress_handler(0, None::<fn() -> bool>),
    }

    let result = f(conn);

    conn.progress_handler(0, None::<fn() -> bool>);

    result.map_err(|e| match ServerError::from(e) {
        ServerError::Timeout(_) => ServerError::Timeout(format!(
            "store read exceeded {}ms (ran {}ms)",
            timeout.as_millis(),
            started.elapsed().as_millis()
        )),
        other => other,
    })
}
