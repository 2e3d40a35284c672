use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// How long an opening connection waits on a held file lock before giving up.
/// Lock contention at open time is terminal, so the wait is short.
const LOCK_WAIT_MS: u64 = 250;

/// Open the engine at `db_path` with the store's pragmas applied.
///
/// Exclusive locking means the first access on this connection takes the
/// engine's file lock and holds it until close; any other connection against
/// the same path fails with a busy error instead of sharing state.
/// `auto_vacuum` must be set before the first page is written, so it comes
/// ahead of the journal-mode switch.
pub fn db_connect(db_path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_millis(LOCK_WAIT_MS))?;
    conn.query_row("PRAGMA locking_mode=EXCLUSIVE;", [], |_| Ok(()))?;
    conn.execute("PRAGMA auto_vacuum=INCREMENTAL;", [])?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
    Ok(conn)
}
