//! SQLite-backed notification store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::application::errors::StorageError;
use crate::domain::traits::NotificationStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS dynamic_at (
                group_id INTEGER NOT NULL,
                uid INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (group_id, uid)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_dynamic_at_group ON dynamic_at(group_id)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Internal("Lock poisoned".to_string()))
    }
}

#[async_trait]
impl NotificationStore for SqliteStore {
    async fn dynamic_at_count(&self, group_id: u64) -> Result<u64, StorageError> {
        let conn = self.lock()?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM dynamic_at WHERE group_id = ?1",
            [group_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn dynamic_at_list(&self, group_id: u64) -> Result<Vec<u64>, StorageError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT uid FROM dynamic_at WHERE group_id = ?1 ORDER BY created_at")?;
        let rows = stmt.query_map([group_id], |row| row.get(0))?;

        let mut ids = Vec::new();
        for uid in rows {
            ids.push(uid?);
        }
        Ok(ids)
    }

    async fn dynamic_at_add(&self, group_id: u64, uid: u64) -> Result<bool, StorageError> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO dynamic_at (group_id, uid) VALUES (?1, ?2)",
            rusqlite::params![group_id, uid],
        )?;
        Ok(inserted > 0)
    }

    async fn dynamic_at_remove(&self, group_id: u64, uid: u64) -> Result<bool, StorageError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM dynamic_at WHERE group_id = ?1 AND uid = ?2",
            rusqlite::params![group_id, uid],
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_list_and_count() {
        let store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.dynamic_at_count(1).await.unwrap(), 0);
        assert!(store.dynamic_at_add(1, 100).await.unwrap());
        assert!(store.dynamic_at_add(1, 200).await.unwrap());
        assert!(store.dynamic_at_add(2, 300).await.unwrap());

        assert_eq!(store.dynamic_at_count(1).await.unwrap(), 2);
        let ids = store.dynamic_at_list(1).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&100));
        assert!(ids.contains(&200));
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.dynamic_at_add(1, 100).await.unwrap());
        assert!(!store.dynamic_at_add(1, 100).await.unwrap());
        assert_eq!(store.dynamic_at_count(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_reports_membership() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.dynamic_at_add(1, 100).await.unwrap();

        assert!(store.dynamic_at_remove(1, 100).await.unwrap());
        assert!(!store.dynamic_at_remove(1, 100).await.unwrap());
        assert_eq!(store.dynamic_at_count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.dynamic_at_add(9, 42).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.dynamic_at_list(9).await.unwrap(), vec![42]);
    }
}
