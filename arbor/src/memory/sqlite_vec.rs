//! SQLite-backed memory store with vector search. Persistent with semantic
//! search via sqlite-vec.
//!
//! Dual-table design: `memory_meta` for the record (JSON) and metadata,
//! `memory_embeddings` (vec0 virtual table) for embeddings. Search with a
//! query embeds it and runs a KNN match; blocking rusqlite work runs on
//! `spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use rusqlite::params;
use uuid::Uuid;

use crate::memory::embedder::Embedder;
use crate::memory::record::{MemoryKind, MemoryRecord};
use crate::memory::store::{MemoryStore, RecalledMemory, StoreError};

static SQLITE_VEC_INIT: Once = Once::new();

const VEC_TABLE: &str = "memory_embeddings";

/// Formats a Vec<f32> as JSON for sqlite-vec (e.g. "[0.1,0.2,0.3]").
fn vector_to_json(v: &[f32]) -> String {
    let parts: Vec<String> = v.iter().map(|f| f.to_string()).collect();
    format!("[{}]", parts.join(","))
}

fn kind_to_str(kind: MemoryKind) -> &'static str {
    match kind {
        MemoryKind::Conversation => "conversation",
        MemoryKind::Fact => "fact",
    }
}

/// SQLite-backed [`MemoryStore`] with KNN semantic search.
///
/// Records are embedded on add; search embeds the query and ranks by vector
/// distance (smaller distance → higher similarity; the reported score is the
/// negated distance so "best first" ordering matches the in-memory store).
pub struct SqliteVecStore {
    db_path: std::path::PathBuf,
    embedder: Arc<dyn Embedder>,
    dimension: usize,
}

impl SqliteVecStore {
    /// Opens (or creates) the store at `path`. Registers the sqlite-vec
    /// extension and creates tables if needed.
    pub fn new(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self, StoreError> {
        SQLITE_VEC_INIT.call_once(|| unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        });

        let db_path = path.as_ref().to_path_buf();
        let dimension = embedder.dimension();

        let conn =
            rusqlite::Connection::open(&db_path).map_err(|e| StoreError::Storage(e.to_string()))?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS memory_meta (
                id INTEGER PRIMARY KEY,
                uuid TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                record TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        let create_vec_sql = format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING vec0(embedding float[{}])",
            VEC_TABLE, dimension
        );
        conn.execute(&create_vec_sql, [])
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(Self {
            db_path,
            embedder,
            dimension,
        })
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let vectors = self.embedder.embed(&[text]).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding("no vector returned".into()))?;
        if vector.len() != self.dimension {
            return Err(StoreError::Storage(format!(
                "embedder dimension {} != expected {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(vector)
    }
}

#[async_trait]
impl MemoryStore for SqliteVecStore {
    async fn add(&self, record: MemoryRecord) -> Result<Uuid, StoreError> {
        let vector = self.embed_one(&record.text).await?;
        let vec_json = vector_to_json(&vector);
        let id = record.id;
        let uuid = record.id.to_string();
        let kind = kind_to_str(record.kind).to_string();
        let record_json = serde_json::to_string(&record)?;
        let created_at = record.created_at.timestamp_millis();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            conn.execute(
                "INSERT INTO memory_meta (uuid, kind, record, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![uuid, kind, record_json, created_at],
            )
            .map_err(|e| StoreError::Storage(e.to_string()))?;
            let rowid = conn.last_insert_rowid();

            conn.execute(
                &format!("INSERT INTO {} (rowid, embedding) VALUES (?1, ?2)", VEC_TABLE),
                params![rowid, vec_json],
            )
            .map_err(|e| StoreError::Storage(e.to_string()))?;

            Ok::<(), StoreError>(())
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))??;

        Ok(id)
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        kind: Option<MemoryKind>,
    ) -> Result<Vec<RecalledMemory>, StoreError> {
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let query_vec = self.embed_one(query).await?;
        let vec_json = vector_to_json(&query_vec);
        let db_path = self.db_path.clone();
        let kind_filter = kind.map(|k| kind_to_str(k).to_string());
        // Over-fetch so a kind filter applied after KNN still fills `limit`.
        let knn_limit = (limit.max(1) * 4).max(50);

        let hits = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            let knn_sql = format!(
                "SELECT rowid, distance FROM {} WHERE embedding MATCH ?1 AND k = ?2",
                VEC_TABLE
            );
            let mut stmt = conn
                .prepare(&knn_sql)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map(params![vec_json, knn_limit as i64], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
                })
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let rowids_with_dist: Vec<(i64, f64)> = rows
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            let mut hits: Vec<RecalledMemory> = Vec::new();
            for (rowid, distance) in rowids_with_dist {
                if hits.len() >= limit {
                    break;
                }
                let row: Option<(String, String)> = conn
                    .query_row(
                        "SELECT kind, record FROM memory_meta WHERE id = ?1",
                        params![rowid],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .ok();
                let Some((row_kind, record_json)) = row else {
                    continue;
                };
                if let Some(ref want) = kind_filter {
                    if &row_kind != want {
                        continue;
                    }
                }
                let record: MemoryRecord = serde_json::from_str(&record_json)?;
                hits.push(RecalledMemory {
                    record,
                    score: Some(-distance),
                });
            }
            Ok::<Vec<RecalledMemory>, StoreError>(hits)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))??;

        Ok(hits)
    }

    async fn recent(&self, n: usize) -> Result<Vec<MemoryRecord>, StoreError> {
        let db_path = self.db_path.clone();
        let records = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let mut stmt = conn
                .prepare("SELECT record FROM memory_meta ORDER BY created_at DESC, id DESC LIMIT ?1")
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map(params![n as i64], |row| row.get::<_, String>(0))
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let jsons: Vec<String> = rows
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let mut records = Vec::with_capacity(jsons.len());
            for j in jsons {
                records.push(serde_json::from_str::<MemoryRecord>(&j)?);
            }
            Ok::<Vec<MemoryRecord>, StoreError>(records)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))??;

        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let uuid = id.to_string();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let rowid: Option<i64> = conn
                .query_row(
                    "SELECT id FROM memory_meta WHERE uuid = ?1",
                    params![uuid],
                    |row| row.get(0),
                )
                .ok();
            let Some(rowid) = rowid else {
                return Ok::<bool, StoreError>(false);
            };
            conn.execute(
                &format!("DELETE FROM {} WHERE rowid = ?1", VEC_TABLE),
                params![rowid],
            )
            .map_err(|e| StoreError::Storage(e.to_string()))?;
            conn.execute("DELETE FROM memory_meta WHERE id = ?1", params![rowid])
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            Ok(true)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            conn.execute(&format!("DELETE FROM {}", VEC_TABLE), [])
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            conn.execute("DELETE FROM memory_meta", [])
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM memory_meta", [], |row| row.get(0))
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            Ok::<usize, StoreError>(count as usize)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    async fn export(&self) -> Result<Vec<MemoryRecord>, StoreError> {
        self.recent(i64::MAX as usize).await
    }
}
