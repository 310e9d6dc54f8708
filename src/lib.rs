//! Person API: CRUD REST service over a single `persons` table.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{Backend, Settings};
pub use error::{AppError, ConfigError};
pub use model::{NewPerson, Person, PersonPatch};
pub use routes::{app, common_routes, person_routes};
pub use state::AppState;
pub use store::{connect, ensure_database_exists, PersonStore, PgPersonStore, SqlitePersonStore};
