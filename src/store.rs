//! SQLite-backed comment store: comments, plus the entity and topic rows derived from them.
//!
//! Every statement runs in autocommit mode except `record_annotation`, which writes a
//! comment's entities, topics, and annotated flag together. An interrupted run therefore
//! leaves only whole rows behind, and a re-run picks up where it stopped.

use crate::calais::Annotation;
use crate::error::StoreResult;
use crate::fetch::Source;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    api_id TEXT NOT NULL,
    comment TEXT NOT NULL,
    updated INTEGER NOT NULL DEFAULT 0,
    UNIQUE(source, api_id)
);
CREATE TABLE IF NOT EXISTS entities (
    id INTEGER PRIMARY KEY,
    entity TEXT NOT NULL,
    comment_id INTEGER REFERENCES comments(id)
);
CREATE TABLE IF NOT EXISTS topics (
    id INTEGER PRIMARY KEY,
    topic TEXT NOT NULL,
    comment_id INTEGER REFERENCES comments(id)
);
";

/// A comment row still waiting for annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredComment {
    pub id: i64,
    pub source: String,
    pub external_id: String,
    pub text: String,
}

pub struct CommentStore {
    conn: Connection,
}

impl CommentStore {
    /// Open (or create) the store file and make sure all three tables exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self { conn: Connection::open_in_memory()? };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert a fetched comment unless `(source, external_id)` is already stored.
    /// Returns true when a new row was written.
    pub fn insert_comment(&self, source: Source, external_id: &str, text: &str) -> StoreResult<bool> {
        let n = self.conn.execute(
            "INSERT OR IGNORE INTO comments (source, api_id, comment, updated) VALUES (?1, ?2, ?3, 0)",
            params![source.as_str(), external_id, text],
        )?;
        Ok(n > 0)
    }

    pub fn has_comment(&self, source: Source, external_id: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM comments WHERE source = ?1 AND api_id = ?2",
                params![source.as_str(), external_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Comments with `updated = 0`, in insertion order.
    pub fn pending_comments(&self) -> StoreResult<Vec<StoredComment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source, api_id, comment FROM comments WHERE updated = 0 ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredComment {
                id: row.get(0)?,
                source: row.get(1)?,
                external_id: row.get(2)?,
                text: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Persist one annotation result and flag the comment, atomically.
    pub fn record_annotation(&self, comment_id: i64, annotation: &Annotation) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut ins_entity = tx.prepare("INSERT INTO entities (entity, comment_id) VALUES (?1, ?2)")?;
            for name in &annotation.entities {
                ins_entity.execute(params![name, comment_id])?;
            }
            let mut ins_topic = tx.prepare("INSERT INTO topics (topic, comment_id) VALUES (?1, ?2)")?;
            for name in &annotation.topics {
                ins_topic.execute(params![name, comment_id])?;
            }
        }
        tx.execute("UPDATE comments SET updated = 1 WHERE id = ?1", params![comment_id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn mark_annotated(&self, comment_id: i64) -> StoreResult<()> {
        self.conn.execute("UPDATE comments SET updated = 1 WHERE id = ?1", params![comment_id])?;
        Ok(())
    }

    pub fn entity_names(&self) -> StoreResult<Vec<String>> {
        self.column_strings("SELECT entity FROM entities ORDER BY id")
    }

    pub fn topic_names(&self) -> StoreResult<Vec<String>> {
        self.column_strings("SELECT topic FROM topics ORDER BY id")
    }

    pub fn comment_count(&self) -> StoreResult<u64> { self.count("SELECT COUNT(*) FROM comments") }
    pub fn pending_count(&self) -> StoreResult<u64> { self.count("SELECT COUNT(*) FROM comments WHERE updated = 0") }
    pub fn entity_count(&self) -> StoreResult<u64> { self.count("SELECT COUNT(*) FROM entities") }
    pub fn topic_count(&self) -> StoreResult<u64> { self.count("SELECT COUNT(*) FROM topics") }

    /// Close the connection, surfacing any error SQLite reports on the final flush.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    fn column_strings(&self, sql: &str) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn count(&self, sql: &str) -> StoreResult<u64> {
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }
}
