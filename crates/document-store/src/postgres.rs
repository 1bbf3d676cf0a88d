use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt, stream};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    DocumentEnvelope, DocumentId, DocumentQuery, Result, StoreError, Version,
    store::{DocumentStore, DocumentStream, WriteOptions, record_conflict, record_write},
};

const SELECT_COLUMNS: &str =
    "SELECT id, collection, version, unique_key, body, created_at, updated_at FROM documents";

/// Number of rows fetched per round trip when streaming a collection.
const STREAM_PAGE_SIZE: i64 = 256;

/// Keyset position while paging through a collection.
enum PageCursor {
    Start,
    After(DateTime<Utc>, Uuid),
    Done,
}

/// PostgreSQL-backed document store implementation.
///
/// Bodies live in a JSONB column; unique keys are enforced by a partial
/// unique index on `(collection, unique_key)`.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_document(row: PgRow) -> Result<DocumentEnvelope> {
        Ok(DocumentEnvelope {
            id: DocumentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            collection: row.try_get("collection")?,
            version: Version::new(row.try_get("version")?),
            unique_key: row.try_get("unique_key")?,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Translates unique violations into store errors.
    fn map_write_error(err: sqlx::Error, document: &DocumentEnvelope) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            if db_err.constraint() == Some("documents_pkey") {
                return StoreError::AlreadyExists {
                    collection: document.collection.clone(),
                    id: document.id,
                };
            }
            return StoreError::UniqueViolation {
                collection: document.collection.clone(),
                key: document.unique_key.clone().unwrap_or_default(),
            };
        }
        StoreError::Database(err)
    }

    async fn fetch_page(
        pool: &PgPool,
        collection: &str,
        cursor: &PageCursor,
    ) -> Result<Vec<DocumentEnvelope>> {
        let rows = match cursor {
            PageCursor::Start => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS} WHERE collection = $1 ORDER BY created_at ASC, id ASC LIMIT $2"
                ))
                .bind(collection)
                .bind(STREAM_PAGE_SIZE)
                .fetch_all(pool)
                .await?
            }
            PageCursor::After(created_at, id) => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS} WHERE collection = $1 AND (created_at, id) > ($2, $3) \
                     ORDER BY created_at ASC, id ASC LIMIT $4"
                ))
                .bind(collection)
                .bind(created_at)
                .bind(id)
                .bind(STREAM_PAGE_SIZE)
                .fetch_all(pool)
                .await?
            }
            PageCursor::Done => Vec::new(),
        };

        rows.into_iter().map(Self::row_to_document).collect()
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[tracing::instrument(skip(self, document), fields(collection = %document.collection, id = %document.id))]
    async fn insert(&self, document: DocumentEnvelope) -> Result<Version> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, version, unique_key, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(&document.collection)
        .bind(Version::first().as_i64())
        .bind(&document.unique_key)
        .bind(&document.body)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &document))?;

        record_write(&document.collection, "insert");
        Ok(Version::first())
    }

    #[tracing::instrument(skip(self, document, options), fields(collection = %document.collection, id = %document.id))]
    async fn replace(&self, document: DocumentEnvelope, options: WriteOptions) -> Result<Version> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so the version check and the update are atomic
        let current: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(&document.collection)
        .bind(document.id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let actual = match current {
            Some(version) => Version::new(version),
            None => {
                return Err(StoreError::NotFound {
                    collection: document.collection,
                    id: document.id,
                });
            }
        };

        if let Some(expected) = options.expected_version
            && actual != expected
        {
            record_conflict(&document.collection, "replace");
            return Err(StoreError::ConcurrencyConflict {
                collection: document.collection,
                id: document.id,
                expected,
                actual,
            });
        }

        let next = actual.next();
        sqlx::query(
            r#"
            UPDATE documents
            SET version = $3, unique_key = $4, body = $5, updated_at = $6
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(&document.collection)
        .bind(document.id.as_uuid())
        .bind(next.as_i64())
        .bind(&document.unique_key)
        .bind(&document.body)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_write_error(e, &document))?;

        tx.commit().await?;
        record_write(&document.collection, "replace");
        Ok(next)
    }

    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<DocumentEnvelope>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn find_by_unique_key(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<DocumentEnvelope>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE collection = $1 AND unique_key = $2"
        ))
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<DocumentEnvelope>> {
        let mut sql =
            format!("{SELECT_COLUMNS} WHERE collection = $1 AND body @> $2 ORDER BY created_at ASC, id ASC");
        let mut param_count = 2;

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql)
            .bind(&query.collection)
            .bind(query.filter_value());

        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream> {
        let pool = self.pool.clone();
        let collection = collection.to_string();

        let pages = stream::try_unfold(PageCursor::Start, move |cursor| {
            let pool = pool.clone();
            let collection = collection.clone();
            async move {
                if matches!(cursor, PageCursor::Done) {
                    return Ok::<_, StoreError>(None);
                }

                let page = Self::fetch_page(&pool, &collection, &cursor).await?;
                let next = match page.last() {
                    Some(last) if page.len() as i64 == STREAM_PAGE_SIZE => {
                        PageCursor::After(last.created_at, last.id.as_uuid())
                    }
                    _ => PageCursor::Done,
                };
                Ok(Some((page, next)))
            }
        });

        let documents = pages
            .map_ok(|page| stream::iter(page.into_iter().map(Ok)))
            .try_flatten();

        Ok(documents.boxed())
    }

    #[tracing::instrument(skip(self, options))]
    async fn delete(
        &self,
        collection: &str,
        id: DocumentId,
        options: WriteOptions,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(actual) = current.map(Version::new) else {
            return Ok(false);
        };

        if let Some(expected) = options.expected_version
            && actual != expected
        {
            record_conflict(collection, "delete");
            return Err(StoreError::ConcurrencyConflict {
                collection: collection.to_string(),
                id,
                expected,
                actual,
            });
        }

        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        record_write(collection, "delete");
        Ok(true)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
