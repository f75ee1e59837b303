use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;

use ecom_catalog_core::{Category, CategoryId, CategoryPayload, CategoryStore, StoreError};

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    ///
    /// The database file is created when it does not exist yet. Pragmas are
    /// part of the connect options so every pooled connection carries them.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(5000));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to the `category` table.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
}

/// Repository backing [`CategoryStore`] with the `category` table.
///
/// Identifiers come from the `AUTOINCREMENT` primary key, so SQLite never
/// reuses the identifier of a deleted row.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

/// Row shape of the `category` table.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    category_id: i64,
    category_name: String,
}

impl CategoryRow {
    fn into_domain(self) -> Category {
        Category {
            category_id: self.category_id,
            category_name: self.category_name,
        }
    }
}

impl CategoryRepository {
    async fn update_name(
        &self,
        category_id: CategoryId,
        category_name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE category SET category_name = ? \
             WHERE category_id = ? \
             RETURNING category_id, category_name",
        )
        .bind(category_name)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CategoryRow::into_domain))
    }

    async fn insert(&self, category_name: &str) -> Result<Category, sqlx::Error> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO category (category_name) VALUES (?) \
             RETURNING category_id, category_name",
        )
        .bind(category_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT category_id, category_name FROM category ORDER BY category_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(rows.into_iter().map(CategoryRow::into_domain).collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT category_id, category_name FROM category WHERE category_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(CategoryRow::into_domain))
    }

    async fn save(&self, payload: CategoryPayload) -> Result<Category, StoreError> {
        if let Some(id) = payload.assigned_id() {
            if let Some(updated) = self
                .update_name(id, &payload.category_name)
                .await
                .map_err(StoreError::backend)?
            {
                return Ok(updated);
            }
        }

        self.insert(&payload.category_name)
            .await
            .map_err(StoreError::backend)
    }

    async fn delete(&self, category: &Category) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM category WHERE category_id = ?")
            .bind(category.category_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}
