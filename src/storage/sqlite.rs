use rusqlite::{Connection, Result};
use tracing::debug;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.configure_pragmas()?;
        db.initialize()?;
        debug!("Fingerprint store opened at '{}'", path);
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.configure_pragmas()?;
        db.initialize()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode)");
        Ok(())
    }

    /// Create the fingerprint table if it is missing. Safe to run against a
    /// store of any age.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema initialized");
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn truncate(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM fingerprint", [])?;
        debug!("Fingerprint table truncated ({} rows)", removed);
        Ok(removed)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}
