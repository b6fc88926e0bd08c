use super::models::Fingerprint;
use super::sqlite::Database;
use rusqlite::{params, OptionalExtension, Result};
use tracing::trace;

impl Database {
    pub fn get_fingerprint(&self, path: &str) -> Result<Option<Fingerprint>> {
        self.connection()
            .query_row(
                "SELECT path, hash, updated_at FROM fingerprint WHERE path = ?1",
                params![path],
                |row| {
                    Ok(Fingerprint {
                        path: row.get(0)?,
                        hash: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()
    }

    pub fn insert_fingerprint(&self, path: &str, hash: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO fingerprint (path, hash, updated_at) VALUES (?1, ?2, ?3)",
            params![path, hash, now],
        )?;
        trace!("Inserted fingerprint for {}", path);
        Ok(())
    }

    pub fn update_fingerprint(&self, path: &str, hash: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "UPDATE fingerprint SET hash = ?1, updated_at = ?2 WHERE path = ?3",
            params![hash, now, path],
        )?;
        trace!("Updated fingerprint for {}", path);
        Ok(())
    }

    /// Returns true when a record was removed.
    pub fn delete_fingerprint(&self, path: &str) -> Result<bool> {
        let removed = self
            .connection()
            .execute("DELETE FROM fingerprint WHERE path = ?1", params![path])?;
        Ok(removed > 0)
    }

    pub fn count_fingerprints(&self) -> Result<usize> {
        let count: i64 =
            self.connection()
                .query_row("SELECT COUNT(*) FROM fingerprint", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn all_fingerprint_paths(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT path FROM fingerprint ORDER BY path")?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>>>()?;
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get_fingerprint() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_fingerprint("/songs/a.mscz").unwrap().is_none());

        db.insert_fingerprint("/songs/a.mscz", "abc").unwrap();
        let fp = db.get_fingerprint("/songs/a.mscz").unwrap().unwrap();
        assert_eq!(fp.path, "/songs/a.mscz");
        assert_eq!(fp.hash, "abc");
        assert!(!fp.updated_at.is_empty());
    }

    #[test]
    fn test_path_is_unique() {
        let db = Database::open_in_memory().unwrap();
        db.insert_fingerprint("/songs/a.mscz", "abc").unwrap();
        assert!(db.insert_fingerprint("/songs/a.mscz", "def").is_err());
        assert_eq!(db.count_fingerprints().unwrap(), 1);
    }

    #[test]
    fn test_quotes_in_paths() {
        let db = Database::open_in_memory().unwrap();
        let path = "/songs/Don't Stop \"Live\"/a.mscz";
        db.insert_fingerprint(path, "abc").unwrap();
        db.update_fingerprint(path, "def").unwrap();
        assert_eq!(db.get_fingerprint(path).unwrap().unwrap().hash, "def");
    }

    #[test]
    fn test_delete_and_list() {
        let db = Database::open_in_memory().unwrap();
        db.insert_fingerprint("/b", "2").unwrap();
        db.insert_fingerprint("/a", "1").unwrap();
        assert_eq!(db.all_fingerprint_paths().unwrap(), vec!["/a", "/b"]);

        assert!(db.delete_fingerprint("/a").unwrap());
        assert!(!db.delete_fingerprint("/a").unwrap());
        assert_eq!(db.count_fingerprints().unwrap(), 1);

        assert_eq!(db.truncate().unwrap(), 1);
        assert_eq!(db.count_fingerprints().unwrap(), 0);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.insert_fingerprint("/a", "1").unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.count_fingerprints().unwrap(), 1);
    }
}
