use crate::error::StorageError;
use planpin_proto::{Category, WriteBatch};
use rusqlite::{params, Connection};
use std::path::Path;

/// Durable per-category FIFO of pending write batches.
///
/// One row per category holds the serialized batch sequence, insertion order
/// preserved; an absent row means nothing is pending, so the "anything
/// queued?" probe stays cheap. Every mutation rewrites the row inside a
/// transaction: a crash leaves the queue at the last committed state, never
/// a half-written sequence. No network calls originate here.
pub struct OfflineQueue {
    conn: Connection,
}

impl OfflineQueue {
    /// Open the queue database at the given path, creating it if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS offline_queue (
                category TEXT PRIMARY KEY,
                batches TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Append a batch to its category's persisted sequence.
    ///
    /// No dedup happens here: the caller controls batch construction, and
    /// semantically identical batches stay distinct entries.
    pub fn enqueue(&mut self, batch: &WriteBatch) -> Result<(), StorageError> {
        let category = batch.category();
        let tx = self.conn.transaction()?;
        let mut batches = read_batches(&tx, category)?;
        batches.push(batch.clone());
        write_batches(&tx, category, &batches)?;
        tx.commit()?;
        Ok(())
    }

    /// Current pending sequence for a category.
    ///
    /// Non-destructive: entries are only removed via [`OfflineQueue::replace`].
    pub fn drain(&self, category: Category) -> Result<Vec<WriteBatch>, StorageError> {
        read_batches(&self.conn, category)
    }

    /// Atomically overwrite the category's persisted sequence.
    ///
    /// An empty `remaining` removes the storage key entirely instead of
    /// leaving an empty container behind.
    pub fn replace(
        &mut self,
        category: Category,
        remaining: &[WriteBatch],
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        write_batches(&tx, category, remaining)?;
        tx.commit()?;
        Ok(())
    }

    /// Whether the category has a persisted key at all.
    pub fn has_pending(&self, category: Category) -> Result<bool, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM offline_queue WHERE category = ?1 LIMIT 1")?;
        let mut rows = stmt.query(params![category.storage_key()])?;
        Ok(rows.next()?.is_some())
    }
}

fn read_batches(conn: &Connection, category: Category) -> Result<Vec<WriteBatch>, StorageError> {
    let mut stmt = conn.prepare("SELECT batches FROM offline_queue WHERE category = ?1")?;
    let mut rows = stmt.query(params![category.storage_key()])?;
    match rows.next()? {
        Some(row) => {
            let raw: String = row.get(0)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(Vec::new()),
    }
}

fn write_batches(
    conn: &Connection,
    category: Category,
    batches: &[WriteBatch],
) -> Result<(), StorageError> {
    if batches.is_empty() {
        conn.execute(
            "DELETE FROM offline_queue WHERE category = ?1",
            params![category.storage_key()],
        )?;
        return Ok(());
    }
    let raw = serde_json::to_string(batches)?;
    conn.execute(
        "INSERT INTO offline_queue (category, batches) VALUES (?1, ?2)
         ON CONFLICT(category) DO UPDATE SET batches = excluded.batches",
        params![category.storage_key(), raw],
    )?;
    Ok(())
}
