//! Persistence adapter for the `persons` table.
//!
//! `PersonStore` is the only way handlers touch stored rows. PostgreSQL is the
//! production backend; SQLite serves local runs and tests. Both enforce email
//! uniqueness with a `UNIQUE` constraint, which is what actually settles races;
//! the read-before-write check in `create`/`update` only gives an earlier, nicer error.

mod postgres;
mod sqlite;

pub use postgres::PgPersonStore;
pub use sqlite::SqlitePersonStore;

use crate::config::{Backend, Settings};
use crate::error::{AppError, ConfigError};
use crate::model::{NewPerson, Person, PersonPatch};
use async_trait::async_trait;
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::sync::Arc;

#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Create the `persons` table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), AppError>;

    /// Round-trip to the store (`SELECT 1`).
    async fn ping(&self) -> Result<(), AppError>;

    /// Insert a person. Fails with `Conflict` when the email is already used.
    async fn create(&self, new: &NewPerson) -> Result<Person, AppError>;

    /// All persons ordered by id.
    async fn list(&self) -> Result<Vec<Person>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Person>, AppError>;

    /// Apply only the supplied fields. `Ok(None)` when no row has `id`.
    async fn update(&self, id: i64, patch: &PersonPatch) -> Result<Option<Person>, AppError>;

    /// Hard delete. Returns false when no row has `id`.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// Email that `patch` would set and that another row might already hold.
/// `None` when the patch leaves the email alone or repeats the current one.
pub(crate) fn email_to_check<'a>(current: &Person, patch: &'a PersonPatch) -> Option<&'a str> {
    patch.email.as_deref().filter(|email| *email != current.email)
}

/// Turns the result of the email lookup into `Conflict` when some row already owns `email`.
pub(crate) fn ensure_email_free(email: &str, owner: Option<i64>) -> Result<(), AppError> {
    match owner {
        Some(owner) => {
            tracing::warn!(email, owner, "write rejected: email in use");
            Err(AppError::email_taken())
        }
        None => Ok(()),
    }
}

/// Result of merging a patch over the stored row.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Merged {
    /// Nothing supplied; the stored row is returned as is.
    Unchanged(Person),
    /// Row to write back.
    Changed(Person),
}

pub(crate) fn merge_patch(mut current: Person, patch: &PersonPatch) -> Merged {
    if patch.is_empty() {
        return Merged::Unchanged(current);
    }
    patch.clone().apply(&mut current);
    Merged::Changed(current)
}

/// Connect to the backend named by `settings.database_url` and make sure the table exists.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn PersonStore>, AppError> {
    let store: Arc<dyn PersonStore> = match settings.backend {
        Backend::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            Arc::new(PgPersonStore::connect(&settings.database_url, settings.max_connections).await?)
        }
        Backend::Sqlite => {
            Arc::new(SqlitePersonStore::connect(&settings.database_url, settings.max_connections).await?)
        }
    };
    store.ensure_schema().await?;
    tracing::info!(backend = ?settings.backend, "person store ready");
    Ok(store)
}

/// Create the PostgreSQL database named in `database_url` if it does not exist.
/// Connects to the `postgres` maintenance database on the same server to do so.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url[scheme_end..]
        .find('/')
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: "no database path".into(),
        })?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
