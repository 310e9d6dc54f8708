use super::{email_to_check, ensure_email_free, merge_patch, Merged, PersonStore};
use crate::error::AppError;
use crate::model::{NewPerson, Person, PersonPatch};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS persons (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        email TEXT NOT NULL,
        CONSTRAINT persons_email_key UNIQUE (email)
    )
"#;

/// PostgreSQL-backed `PersonStore`.
#[derive(Clone)]
pub struct PgPersonStore {
    pool: PgPool,
}

impl PgPersonStore {
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PersonStore for PgPersonStore {
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
        let mut tx = self.pool.begin().await?;
        let owner: Option<i64> = sqlx::query_scalar("SELECT id FROM persons WHERE email = $1")
            .bind(&new.email)
            .fetch_optional(&mut *tx)
            .await?;
        ensure_email_free(&new.email, owner)?;
        let person: Person = sqlx::query_as(
            "INSERT INTO persons (name, age, email) VALUES ($1, $2, $3) RETURNING id, name, age, email",
        )
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
        let row = sqlx::query_as("SELECT id, name, age, email FROM persons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: &PersonPatch) -> Result<Option<Person>, AppError> {
        let mut tx = self.pool.begin().await?;
        let current: Option<Person> =
            sqlx::query_as("SELECT id, name, age, email FROM persons WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(None);
        };
        if let Some(email) = email_to_check(&current, patch) {
            let owner: Option<i64> = sqlx::query_scalar("SELECT id FROM persons WHERE email = $1 AND id <> $2")
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
        let updated: Person = sqlx::query_as(
            "UPDATE persons SET name = $1, age = $2, email = $3 WHERE id = $4 RETURNING id, name, age, email",
        )
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
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
