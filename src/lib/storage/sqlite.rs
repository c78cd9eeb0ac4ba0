use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};

use crate::core::{Todo, TodoChanges, TodoError, TodoRecord};
use crate::storage::TodoRepository;

#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument};

const SELECT_COLUMNS: &str = "id, title, completed, createdAt, userId";

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            #[cfg(feature = "tracing")]
            info!(database_url = %database_url, "Creating database");
            Sqlite::create_database(database_url)
                .await
                .with_context(|| format!("failed to create database {}", database_url))?;
        }
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed to connect to {}", database_url))?;
        Self::with_pool(pool).await
    }

    /// Every in-memory connection is its own database, so the pool is pinned to one.
    pub async fn new_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("failed to open in-memory database")?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                  id INTEGER PRIMARY KEY AUTOINCREMENT,
                  title TEXT NOT NULL,
                  completed BOOLEAN NOT NULL DEFAULT 0,
                  createdAt TEXT NOT NULL,
                  userId INTEGER NOT NULL)
                ",
        )
        .execute(&pool)
        .await
        .context("failed to create todos table")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    async fn create(&self, title: &str, user_id: i64) -> Result<Todo, TodoError> {
        let record: TodoRecord = sqlx::query_as(&format!(
            "INSERT INTO todos (title, completed, createdAt, userId)
             VALUES (?, 0, ?, ?)
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(title)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        #[cfg(feature = "tracing")]
        debug!(id = record.id, "Inserted todo");
        Ok(record.into())
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    async fn update(&self, id: i64, changes: TodoChanges) -> Result<Todo, TodoError> {
        let record: TodoRecord = sqlx::query_as(&format!(
            "UPDATE todos SET title = ?, completed = ?
             WHERE id = ?
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&changes.title)
        .bind(changes.completed)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(record.into())
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        let records: Vec<TodoRecord> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM todos ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(records.into_iter().map(Todo::from).collect())
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    async fn find_by_id(&self, id: i64) -> Result<Todo, TodoError> {
        let record: TodoRecord =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM todos WHERE id = ?"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(record.into())
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    async fn delete_by_id(&self, id: i64) -> Result<(), TodoError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound);
        }
        Ok(())
    }
}
