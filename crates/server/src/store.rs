//! Script-version store: immutable snapshots of a script's text over
//! time, with an at-most-one `is_current` invariant enforced by a single
//! write transaction per mutation.

use std::sync::Arc;

use parking_lot::Mutex;
use rating_core::model::{Script, ScriptVersion};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("script {0} not found")]
    ScriptNotFound(Uuid),
    #[error("version {0} not found")]
    VersionNotFound(Uuid),
    #[error("version {0} is the current version and cannot be deleted")]
    CannotDeleteCurrent(Uuid),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage contract for scripts and their version history.
pub trait ScriptStore: Send + Sync {
    fn create_script(&self, title: &str, text: &str) -> Result<(Script, ScriptVersion)>;

    /// Create a new current version for `script_id`, flipping the
    /// previous current version off in the same transaction.
    fn create_version(&self, script_id: Uuid, text: &str, label: Option<String>) -> Result<ScriptVersion>;

    fn current_version(&self, script_id: Uuid) -> Result<ScriptVersion>;

    fn list_versions(&self, script_id: Uuid) -> Result<Vec<ScriptVersion>>;

    /// Restore an older version as current. The version that was current
    /// before the restore is kept, not deleted — restoring never loses
    /// history, it only changes which snapshot is current.
    fn restore_version(&self, script_id: Uuid, version_id: Uuid) -> Result<ScriptVersion>;

    /// Permanently remove a non-current version. Errors with
    /// [`StoreError::CannotDeleteCurrent`] if `version_id` is the
    /// script's current version — the current version can never be
    /// deleted (spec.md §3, §7's `ConflictingState`).
    fn delete_version(&self, script_id: Uuid, version_id: Uuid) -> Result<()>;
}

/// SQLite-backed implementation, one file per server instance.
pub struct SqliteScriptStore {
    conn: Mutex<Connection>,
}

impl SqliteScriptStore {
    pub fn open(path: &std::path::Path) -> Result<Arc<Self>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS scripts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS versions (
                id TEXT PRIMARY KEY,
                script_id TEXT NOT NULL REFERENCES scripts(id),
                version_number INTEGER NOT NULL,
                text TEXT NOT NULL,
                is_current INTEGER NOT NULL,
                label TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_versions_script ON versions(script_id);",
        )?;
        Ok(Arc::new(Self { conn: Mutex::new(conn) }))
    }

    pub fn open_in_memory() -> Result<Arc<Self>> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE scripts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE versions (
                id TEXT PRIMARY KEY,
                script_id TEXT NOT NULL REFERENCES scripts(id),
                version_number INTEGER NOT NULL,
                text TEXT NOT NULL,
                is_current INTEGER NOT NULL,
                label TEXT,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(Arc::new(Self { conn: Mutex::new(conn) }))
    }

    fn row_to_version(row: &rusqlite::Row) -> rusqlite::Result<ScriptVersion> {
        let id: String = row.get(0)?;
        let script_id: String = row.get(1)?;
        let created_at: String = row.get(5)?;
        Ok(ScriptVersion {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            script_id: Uuid::parse_str(&script_id).unwrap_or_default(),
            version_number: row.get(2)?,
            text: row.get(3)?,
            is_current: row.get::<_, i64>(4)? != 0,
            created_at: created_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
            label: row.get(6)?,
        })
    }
}

impl ScriptStore for SqliteScriptStore {
    fn create_script(&self, title: &str, text: &str) -> Result<(Script, ScriptVersion)> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now();
        let script_id = Uuid::new_v4();
        let version_id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO scripts (id, title, created_at) VALUES (?1, ?2, ?3)",
            params![script_id.to_string(), title, now.to_rfc3339()],
        )?;
        conn.execute(
            "INSERT INTO versions (id, script_id, version_number, text, is_current, label, created_at)
             VALUES (?1, ?2, 1, ?3, 1, ?4, ?5)",
            params![version_id.to_string(), script_id.to_string(), text, Option::<String>::None, now.to_rfc3339()],
        )?;

        let script = Script {
            id: script_id,
            title: title.to_string(),
            raw_text: text.to_string(),
            created_at: now,
        };
        let version = ScriptVersion {
            id: version_id,
            script_id,
            version_number: 1,
            text: text.to_string(),
            is_current: true,
            created_at: now,
            label: None,
        };
        Ok((script, version))
    }

    fn create_version(&self, script_id: Uuid, text: &str, label: Option<String>) -> Result<ScriptVersion> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let next_number: u32 = tx.query_row(
            "SELECT COALESCE(MAX(version_number), 0) + 1 FROM versions WHERE script_id = ?1",
            params![script_id.to_string()],
            |row| row.get(0),
        )?;

        tx.execute(
            "UPDATE versions SET is_current = 0 WHERE script_id = ?1 AND is_current = 1",
            params![script_id.to_string()],
        )?;

        let now = chrono::Utc::now();
        let version_id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO versions (id, script_id, version_number, text, is_current, label, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
            params![version_id.to_string(), script_id.to_string(), next_number, text, label, now.to_rfc3339()],
        )?;

        tx.commit()?;

        Ok(ScriptVersion {
            id: version_id,
            script_id,
            version_number: next_number,
            text: text.to_string(),
            is_current: true,
            created_at: now,
            label,
        })
    }

    fn current_version(&self, script_id: Uuid) -> Result<ScriptVersion> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, script_id, version_number, text, is_current, created_at, label
             FROM versions WHERE script_id = ?1 AND is_current = 1",
            params![script_id.to_string()],
            Self::row_to_version,
        )
        .optional()?
        .ok_or(StoreError::ScriptNotFound(script_id))
    }

    fn list_versions(&self, script_id: Uuid) -> Result<Vec<ScriptVersion>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, script_id, version_number, text, is_current, created_at, label
             FROM versions WHERE script_id = ?1 ORDER BY version_number ASC",
        )?;
        let rows = stmt
            .query_map(params![script_id.to_string()], Self::row_to_version)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Restore `version_id` as current. Per §4 of the version-store
    /// contract this never discards history: the script's pre-restore
    /// current text is first snapshotted as a new, non-current *backup*
    /// version, then a second new version carrying the restored text is
    /// created and marked current. Both inserts and the current-flag flip
    /// happen inside one transaction.
    fn restore_version(&self, script_id: Uuid, version_id: Uuid) -> Result<ScriptVersion> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let restored_text: String = tx
            .query_row(
                "SELECT text FROM versions WHERE id = ?1 AND script_id = ?2",
                params![version_id.to_string(), script_id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::VersionNotFound(version_id))?;

        let current_text: Option<String> = tx
            .query_row(
                "SELECT text FROM versions WHERE script_id = ?1 AND is_current = 1",
                params![script_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        tx.execute(
            "UPDATE versions SET is_current = 0 WHERE script_id = ?1 AND is_current = 1",
            params![script_id.to_string()],
        )?;

        let now = chrono::Utc::now();

        if let Some(pre_restore_text) = current_text {
            let backup_number: u32 = tx.query_row(
                "SELECT COALESCE(MAX(version_number), 0) + 1 FROM versions WHERE script_id = ?1",
                params![script_id.to_string()],
                |row| row.get(0),
            )?;
            let backup_id = Uuid::new_v4();
            let backup_label = Some(format!("backup before restoring version {version_id}"));
            tx.execute(
                "INSERT INTO versions (id, script_id, version_number, text, is_current, label, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
                params![backup_id.to_string(), script_id.to_string(), backup_number, pre_restore_text, backup_label, now.to_rfc3339()],
            )?;
        }

        let next_number: u32 = tx.query_row(
            "SELECT COALESCE(MAX(version_number), 0) + 1 FROM versions WHERE script_id = ?1",
            params![script_id.to_string()],
            |row| row.get(0),
        )?;

        let new_id = Uuid::new_v4();
        let label = Some(format!("restored from version {version_id}"));
        tx.execute(
            "INSERT INTO versions (id, script_id, version_number, text, is_current, label, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
            params![new_id.to_string(), script_id.to_string(), next_number, restored_text, label, now.to_rfc3339()],
        )?;

        tx.commit()?;

        Ok(ScriptVersion {
            id: new_id,
            script_id,
            version_number: next_number,
            text: restored_text,
            is_current: true,
            created_at: now,
            label,
        })
    }

    fn delete_version(&self, script_id: Uuid, version_id: Uuid) -> Result<()> {
        let conn = self.conn.lock();

        let is_current: Option<i64> = conn
            .query_row(
                "SELECT is_current FROM versions WHERE id = ?1 AND script_id = ?2",
                params![version_id.to_string(), script_id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::VersionNotFound(version_id))?;

        if is_current != 0 {
            return Err(StoreError::CannotDeleteCurrent(version_id));
        }

        conn.execute("DELETE FROM versions WHERE id = ?1", params![version_id.to_string()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_version_keeps_exactly_one_current_version() {
        let store = SqliteScriptStore::open_in_memory().unwrap();
        let (script, _) = store.create_script("Test", "first draft").unwrap();

        store.create_version(script.id, "second draft", None).unwrap();
        store.create_version(script.id, "third draft", None).unwrap();

        let versions = store.list_versions(script.id).unwrap();
        let current_count = versions.iter().filter(|v| v.is_current).count();
        assert_eq!(current_count, 1);
        assert_eq!(versions.len(), 3);
        assert!(versions.last().unwrap().is_current);
    }

    #[test]
    fn restore_creates_a_new_version_rather_than_deleting_history() {
        let store = SqliteScriptStore::open_in_memory().unwrap();
        let (script, first) = store.create_script("Test", "first draft").unwrap();
        store.create_version(script.id, "second draft", None).unwrap();

        let restored = store.restore_version(script.id, first.id).unwrap();
        assert_eq!(restored.text, "first draft");
        assert!(restored.is_current);

        // restoring snapshots the pre-restore current text as a backup
        // version in the same transaction, so history grows by two, not one.
        let versions = store.list_versions(script.id).unwrap();
        assert_eq!(versions.len(), 4);
    }

    #[test]
    fn restore_leaves_a_backup_version_with_the_pre_restore_text() {
        let store = SqliteScriptStore::open_in_memory().unwrap();
        let (script, first) = store.create_script("Test", "first draft").unwrap();
        store.create_version(script.id, "second draft", None).unwrap();

        store.restore_version(script.id, first.id).unwrap();

        let versions = store.list_versions(script.id).unwrap();
        assert!(versions.iter().any(|v| !v.is_current && v.text == "second draft"));
        let current = versions.iter().find(|v| v.is_current).unwrap();
        assert_eq!(current.text, "first draft");
        assert_eq!(versions.iter().filter(|v| v.is_current).count(), 1);
    }

    #[test]
    fn current_version_of_unknown_script_errors() {
        let store = SqliteScriptStore::open_in_memory().unwrap();
        let result = store.current_version(Uuid::new_v4());
        assert!(matches!(result, Err(StoreError::ScriptNotFound(_))));
    }

    #[test]
    fn deleting_the_current_version_is_rejected() {
        let store = SqliteScriptStore::open_in_memory().unwrap();
        let (script, first) = store.create_script("Test", "first draft").unwrap();
        let result = store.delete_version(script.id, first.id);
        assert!(matches!(result, Err(StoreError::CannotDeleteCurrent(_))));
    }

    #[test]
    fn deleting_a_non_current_version_removes_it_from_history() {
        let store = SqliteScriptStore::open_in_memory().unwrap();
        let (script, first) = store.create_script("Test", "first draft").unwrap();
        store.create_version(script.id, "second draft", None).unwrap();

        store.delete_version(script.id, first.id).unwrap();

        let versions = store.list_versions(script.id).unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions.iter().all(|v| v.id != first.id));
    }
}
