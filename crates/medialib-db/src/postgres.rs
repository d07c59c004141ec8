//! Postgres catalog repository
//!
//! Records live in the `media_items` table created by the embedded migrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medialib_core::{FileKind, LibraryConfig, MediaRecord, MediaUpdate, NewMediaRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::CatalogRepository;

const MEDIA_COLUMNS: &str = "id, title, description, file_name, mime_type, file_kind, \
     file_size_bytes, storage_key, storage_url, thumbnail_key, thumbnail_url, uploaded_at, \
     last_modified_at, uploader_label, tags";

/// Database row for `media_items`
#[derive(Debug, sqlx::FromRow)]
struct MediaItemRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    file_name: String,
    mime_type: String,
    file_kind: String,
    file_size_bytes: i64,
    storage_key: String,
    storage_url: String,
    thumbnail_key: Option<String>,
    thumbnail_url: Option<String>,
    uploaded_at: DateTime<Utc>,
    last_modified_at: Option<DateTime<Utc>>,
    uploader_label: Option<String>,
    tags: Vec<String>,
}

impl TryFrom<MediaItemRow> for MediaRecord {
    type Error = RepositoryError;

    fn try_from(row: MediaItemRow) -> Result<Self, Self::Error> {
        let file_kind: FileKind = row.file_kind.parse().map_err(|e| {
            RepositoryError::Backend(format!("Invalid file_kind for {}: {}", row.id, e))
        })?;
        let file_size_bytes = u64::try_from(row.file_size_bytes).map_err(|_| {
            RepositoryError::Backend(format!("Negative file_size_bytes for {}", row.id))
        })?;

        Ok(MediaRecord {
            id: row.id,
            title: row.title,
            description: row.description,
            file_name: row.file_name,
            mime_type: row.mime_type,
            file_kind,
            file_size_bytes,
            storage_key: row.storage_key,
            storage_url: row.storage_url,
            thumbnail_key: row.thumbnail_key,
            thumbnail_url: row.thumbnail_url,
            uploaded_at: row.uploaded_at,
            last_modified_at: row.last_modified_at,
            uploader_label: row.uploader_label,
            tags: row.tags,
        })
    }
}

/// Map unique and check violations to `Constraint`, leaving other errors as `Database`.
fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() || db_err.is_check_violation() {
            return RepositoryError::Constraint(db_err.message().to_string());
        }
    }
    RepositoryError::Database(err)
}

#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the library configuration and apply pending migrations
    pub async fn connect(config: &LibraryConfig) -> RepositoryResult<Self> {
        let database_url = config.database_url.as_deref().ok_or_else(|| {
            RepositoryError::Backend("DATABASE_URL not configured".to_string())
        })?;

        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        tracing::info!(
            max_connections = config.db_max_connections,
            "Database connected successfully"
        );

        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Backend(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "select"))]
    async fn list(&self) -> RepositoryResult<Vec<MediaRecord>> {
        let query = format!(
            "SELECT {} FROM media_items ORDER BY uploaded_at DESC, id",
            MEDIA_COLUMNS
        );
        let rows: Vec<MediaItemRow> = sqlx::query_as::<Postgres, MediaItemRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(MediaRecord::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<MediaRecord>> {
        let query = format!("SELECT {} FROM media_items WHERE id = $1", MEDIA_COLUMNS);
        let row: Option<MediaItemRow> = sqlx::query_as::<Postgres, MediaItemRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MediaRecord::try_from).transpose()
    }

    #[tracing::instrument(
        skip(self, record),
        fields(db.table = "media_items", db.operation = "insert")
    )]
    async fn create(&self, record: NewMediaRecord) -> RepositoryResult<MediaRecord> {
        record.check_invariants()?;

        let id = Uuid::new_v4();
        let file_size = i64::try_from(record.file_size_bytes).map_err(|_| {
            RepositoryError::Constraint("file_size_bytes exceeds BIGINT range".to_string())
        })?;

        let query = format!(
            r#"
            INSERT INTO media_items (
                id, title, description, file_name, mime_type, file_kind,
                file_size_bytes, storage_key, storage_url, thumbnail_key, thumbnail_url,
                uploaded_at, uploader_label, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let row: MediaItemRow = sqlx::query_as::<Postgres, MediaItemRow>(&query)
            .bind(id)
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.file_name)
            .bind(&record.mime_type)
            .bind(record.file_kind.as_str())
            .bind(file_size)
            .bind(&record.storage_key)
            .bind(&record.storage_url)
            .bind(&record.thumbnail_key)
            .bind(&record.thumbnail_url)
            .bind(Utc::now())
            .bind(&record.uploader_label)
            .bind(&record.tags)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        MediaRecord::try_from(row)
    }

    #[tracing::instrument(
        skip(self, update),
        fields(db.table = "media_items", db.operation = "update")
    )]
    async fn update(&self, id: Uuid, update: MediaUpdate) -> RepositoryResult<MediaRecord> {
        let update = update.normalized()?;

        // An empty description clears the column
        let query = format!(
            r#"
            UPDATE media_items SET
                title = COALESCE($2, title),
                description = CASE WHEN $3::TEXT IS NULL THEN description
                                   ELSE NULLIF($3, '') END,
                tags = COALESCE($4, tags),
                last_modified_at = GREATEST(NOW(), uploaded_at)
            WHERE id = $1
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let row: Option<MediaItemRow> = sqlx::query_as::<Postgres, MediaItemRow>(&query)
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(&update.tags)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => MediaRecord::try_from(row),
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}
