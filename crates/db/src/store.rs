use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::{HealthProbe, Migration};
use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::models::{Book, NewBook};

const BOOKS_TABLE: &str = "books";

/// Persistence operations on the `books` table.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All rows, ordered by primary key.
    async fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Insert a row and return it with its assigned primary key.
    async fn insert_book(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Delete by primary key. Deleting a missing key is not an error.
    async fn delete_book(&self, pk: i64) -> Result<(), StoreError>;
}

/// [`BookStore`] over a single SQLite connection shared by all requests.
///
/// Every statement runs on the blocking pool and is bounded by the
/// configured query timeout.
#[derive(Clone)]
pub struct SqliteBookStore {
    conn: Arc<Mutex<Connection>>,
    query_timeout: Duration,
}

impl SqliteBookStore {
    pub fn open(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        Self::open_path(&settings.path, settings)
    }

    pub fn open_path(path: impl AsRef<Path>, settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "opened sqlite store");
        Self::from_connection(conn, settings)
    }

    pub fn open_in_memory(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, settings)
    }

    fn from_connection(conn: Connection, settings: &DatabaseSettings) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            query_timeout: Duration::from_millis(settings.query_timeout_ms),
        })
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut *guard)
        });

        match tokio::time::timeout(self.query_timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(StoreError::Timeout {
                operation,
                after: self.query_timeout,
            }),
        }
    }

    /// Apply every migration not yet recorded in `schema_migrations`.
    /// Each script runs in its own transaction. Returns how many ran.
    pub async fn apply_migrations(
        &self,
        migrations: Vec<(String, Migration)>,
    ) -> Result<usize, StoreError> {
        self.run("migrate", move |conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    module     TEXT NOT NULL,
                    id         TEXT NOT NULL,
                    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    PRIMARY KEY (module, id)
                )",
            )?;

            let mut applied = 0;
            for (module, migration) in migrations {
                let tx = conn.transaction()?;
                let done: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2)",
                    params![module, migration.id],
                    |row| row.get(0),
                )?;
                if done {
                    continue;
                }

                tx.execute_batch(migration.up)?;
                tx.execute(
                    "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
                    params![module, migration.id],
                )?;
                tx.commit()?;

                tracing::info!(module = %module, migration = migration.id, "migration applied");
                applied += 1;
            }

            Ok(applied)
        })
        .await
    }

    /// `SELECT 1` plus a check that the books table exists.
    pub async fn check(&self) -> Result<(), StoreError> {
        self.run("ping", |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                params![BOOKS_TABLE],
                |row| row.get(0),
            )?;
            if exists {
                Ok(())
            } else {
                Err(StoreError::MissingSchema { table: BOOKS_TABLE })
            }
        })
        .await
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        self.run("list_books", |conn| {
            let mut stmt = conn.prepare(
                "SELECT pk, title, author, id, classification FROM books ORDER BY pk",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Book {
                    pk: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    author: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    id: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    classification: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })?;
            let books = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(books)
        })
        .await
    }

    async fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        let book = self
            .run("insert_book", move |conn| {
                conn.execute(
                    "INSERT INTO books (pk, title, author, id, classification) VALUES (NULL, ?1, ?2, ?3, ?4)",
                    params![book.title, book.author, book.id, book.classification],
                )?;
                Ok(book.into_book(conn.last_insert_rowid()))
            })
            .await?;

        tracing::info!(pk = book.pk, owi = %book.id, "book inserted");
        Ok(book)
    }

    async fn delete_book(&self, pk: i64) -> Result<(), StoreError> {
        let removed = self
            .run("delete_book", move |conn| {
                Ok(conn.execute("DELETE FROM books WHERE pk = ?1", params![pk])?)
            })
            .await?;

        tracing::info!(pk, removed, "book delete requested");
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for SqliteBookStore {
    async fn ping(&self) -> anyhow::Result<()> {
        self.check().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATE_BOOKS: &str = "CREATE TABLE books (
        pk INTEGER PRIMARY KEY,
        title TEXT,
        author TEXT,
        id TEXT,
        classification TEXT
    );";

    fn migrations() -> Vec<(String, Migration)> {
        vec![(
            "books".to_string(),
            Migration {
                id: "001_init",
                up: CREATE_BOOKS,
            },
        )]
    }

    async fn migrated_store() -> SqliteBookStore {
        let store = SqliteBookStore::open_in_memory(&DatabaseSettings::default()).unwrap();
        store.apply_migrations(migrations()).await.unwrap();
        store
    }

    fn hamlet() -> NewBook {
        NewBook {
            title: "Hamlet".to_string(),
            author: "Shakespeare, William".to_string(),
            id: "44637874".to_string(),
            classification: "822.33".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_fresh_primary_keys() {
        let store = migrated_store().await;

        let first = store.insert_book(hamlet()).await.unwrap();
        let second = store.insert_book(hamlet()).await.unwrap();

        assert!(first.pk > 0);
        assert!(second.pk > first.pk);
        assert_eq!(second.id, first.id);
        assert_eq!(second.classification, "822.33");
    }

    #[tokio::test]
    async fn list_returns_rows_in_primary_key_order() {
        let store = migrated_store().await;
        let first = store.insert_book(hamlet()).await.unwrap();
        let second = store
            .insert_book(NewBook {
                title: "Dune".to_string(),
                author: "Herbert, Frank".to_string(),
                id: "1".to_string(),
                classification: "813.54".to_string(),
            })
            .await
            .unwrap();

        let books = store.list_books().await.unwrap();
        assert_eq!(books, vec![first, second]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = migrated_store().await;
        let book = store.insert_book(hamlet()).await.unwrap();

        store.delete_book(book.pk).await.unwrap();
        store.delete_book(book.pk).await.unwrap();
        store.delete_book(9999).await.unwrap();

        assert!(store.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn migrations_run_once() {
        let store = SqliteBookStore::open_in_memory(&DatabaseSettings::default()).unwrap();

        assert_eq!(store.apply_migrations(migrations()).await.unwrap(), 1);
        assert_eq!(store.apply_migrations(migrations()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ping_requires_the_books_table() {
        let store = SqliteBookStore::open_in_memory(&DatabaseSettings::default()).unwrap();

        let err = store.check().await.unwrap_err();
        assert!(matches!(err, StoreError::MissingSchema { table: "books" }));
        assert!(store.ping().await.is_err());

        store.apply_migrations(migrations()).await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn blocked_connection_times_out() {
        let settings = DatabaseSettings {
            query_timeout_ms: 50,
            ..DatabaseSettings::default()
        };
        let store = SqliteBookStore::open_in_memory(&settings).unwrap();
        store.apply_migrations(migrations()).await.unwrap();

        let held = store.conn.lock().unwrap();
        let err = store.list_books().await.unwrap_err();
        drop(held);

        match err {
            StoreError::Timeout { operation, after } => {
                assert_eq!(operation, "list_books");
                assert_eq!(after, Duration::from_millis(50));
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn file_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let settings = DatabaseSettings::default();

        {
            let store = SqliteBookStore::open_path(&path, &settings).unwrap();
            store.apply_migrations(migrations()).await.unwrap();
            store.insert_book(hamlet()).await.unwrap();
        }

        let reopened = SqliteBookStore::open_path(&path, &settings).unwrap();
        let books = reopened.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Hamlet");
    }

    #[test]
    fn book_serializes_with_front_end_names() {
        let book = hamlet().into_book(3);
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            serde_json::json!({
                "PK": 3,
                "Title": "Hamlet",
                "Author": "Shakespeare, William",
                "ID": "44637874",
                "Classification": "822.33"
            })
        );
    }
}
