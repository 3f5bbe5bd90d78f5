/*!
 * SQLite blob store.
 *
 * Keeps every cached segment in one `blobs` table. All statements run on
 * tokio's blocking pool so a slow disk never stalls the runtime.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::BlobStore;
use crate::errors::StoreError;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "cache.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "doclingo";

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Blob store backed by a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteBlobStore {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl SqliteBlobStore {
    /// Open (or create) the database at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening blob cache at: {:?}", db_path);
        let conn = Connection::open(&db_path)?;
        initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf, StoreError> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| StoreError::Backend("Could not determine data directory".to_string()))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Number of stored blobs
    pub async fn count(&self) -> Result<i64, StoreError> {
        self.execute_async(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM blobs", [], |row| row.get(0))?)
        })
        .await
    }

    /// Execute a database operation on the blocking pool
    async fn execute_async<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Backend(format!("Failed to acquire database lock: {}", e)))?;

            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("Database task panicked: {}", e)))?
    }
}

/// Create the blob table on a fresh database
fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version >= SCHEMA_VERSION {
        debug!("Blob cache schema is up to date (v{})", version);
        return Ok(());
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS blobs (
            key TEXT PRIMARY KEY NOT NULL,
            content_type TEXT NOT NULL,
            body BLOB NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    Ok(())
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let key = key.to_string();

        self.execute_async(move |conn| {
            let body: Option<Vec<u8>> = conn
                .query_row("SELECT body FROM blobs WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(body.map(Bytes::from))
        })
        .await
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let content_type = content_type.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.execute_async(move |conn| {
            conn.execute(
                r#"
                INSERT INTO blobs (key, content_type, body, created_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(key) DO UPDATE SET
                    content_type = excluded.content_type,
                    body = excluded.body,
                    created_at = excluded.created_at
                "#,
                params![key, content_type, body.to_vec(), now],
            )?;
            Ok(())
        })
        .await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
