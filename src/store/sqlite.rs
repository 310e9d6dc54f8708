use super::{email_to_check, ensure_email_free, merge_patch, Merged, PersonStore};
use crate::error::AppError;
use crate::model::{NewPerson, Person, PersonPatch};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

// AUTOINCREMENT keeps ids monotonic: a deleted id is never handed out again.
const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS persons (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        email TEXT NOT NULL UNIQUE
    )
"#;

/// SQLite-backed `PersonStore`, file-based or in-memory.
#[derive(Clone)]
pub struct SqlitePersonStore {
    pool: SqlitePool,
}

impl SqlitePersonStore {
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// How long a writer waits for the database lock before giving up.
    const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Write transactions take the database lock up front so a read-then-write
    /// never has to upgrade its lock (SQLite fails such upgrades with SQLITE_BUSY).
    const BEGIN_WRITE: &'static str = "BEGIN IMMEDIATE";

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Self::BUSY_TIMEOUT);
        if !in_memory {
            // WAL lets readers proceed while a writer holds the lock.
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }
        // Every connection to `:memory:` opens its own database, so in-memory stores use one.
        let pool = Self::pool_options(if in_memory { 1 } else { max_connections })
            .connect_with(options)
            .await?;
        tracing::info!(url = %database_url, "sqlite store connected");
        Ok(Self { pool })
    }

    /// Fresh private in-memory store with the table already created.
    pub async fn in_memory() -> Result<Self, AppError> {
        let store = Self::connect("sqlite::memory:", 1).await?;
        store.ensure_schema().await?;
        Ok(store)
    }

    fn pool_options(max_connections: u32) -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .idle_timeout(None)
            .max_lifetime(None)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PersonStore for SqlitePersonStore {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        tracing::info!("persons table ensured");
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, new: &NewPerson) -> Result<Person, AppError> {
        let mut tx = self.pool.begin_with(Self::BEGIN_WRITE).await?;
        let owner: Option<i64> = sqlx::query_scalar("SELECT id FROM persons WHERE email = ?")
            .bind(&new.email)
            .fetch_optional(&mut *tx)
            .await?;
        ensure_email_free(&new.email, owner)?;
        let person: Person =
            sqlx::query_as("INSERT INTO persons (name, age, email) VALUES (?, ?, ?) RETURNING id, name, age, email")
                .bind(&new.name)
                .bind(new.age)
                .bind(&new.email)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::from_write)?;
        tx.commit().await.map_err(AppError::from_write)?;
        tracing::debug!(id = person.id, "person created");
        Ok(person)
    }

    async fn list(&self) -> Result<Vec<Person>, AppError> {
        let rows = sqlx::query_as("SELECT id, name, age, email FROM persons ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<Person>, AppError> {
        let row = sqlx::query_as("SELECT id, name, age, email FROM persons WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: &PersonPatch) -> Result<Option<Person>, AppError> {
        let mut tx = self.pool.begin_with(Self::BEGIN_WRITE).await?;
        let current: Option<Person> = sqlx::query_as("SELECT id, name, age, email FROM persons WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Ok(None);
        };
        if let Some(email) = email_to_check(&current, patch) {
            let owner: Option<i64> = sqlx::query_scalar("SELECT id FROM persons WHERE email = ? AND id <> ?")
                .bind(email)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            ensure_email_free(email, owner)?;
        }
        let person = match merge_patch(current, patch) {
            Merged::Unchanged(person) => return Ok(Some(person)),
            Merged::Changed(person) => person,
        };
        let updated: Person =
            sqlx::query_as("UPDATE persons SET name = ?, age = ?, email = ? WHERE id = ? RETURNING id, name, age, email")
                .bind(&person.name)
                .bind(person.age)
                .bind(&person.email)
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::from_write)?;
        tx.commit().await.map_err(AppError::from_write)?;
        tracing::debug!(id, "person updated");
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM persons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
