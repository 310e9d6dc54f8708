//! Person CRUD handlers: create, list, read, update, delete.

use crate::error::{AppError, ErrorBody};
use crate::extractors::JsonBody;
use crate::model::{NewPerson, Person, PersonPatch};
use crate::response::{created, ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("invalid person id '{}': expected an integer", id_str)))
}

#[utoipa::path(
    get,
    path = "/persons",
    tag = "persons",
    responses((status = 200, description = "All persons ordered by id", body = Vec<Person>))
)]
pub async fn list_persons(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = state.store.list().await?;
    Ok(ok(rows))
}

#[utoipa::path(
    post,
    path = "/persons",
    tag = "persons",
    request_body = NewPerson,
    responses(
        (status = 201, description = "Person created", body = Person),
        (status = 400, description = "Email already registered", body = ErrorBody),
        (status = 422, description = "Missing or mistyped field", body = ErrorBody)
    )
)]
pub async fn create_person(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewPerson>,
) -> Result<impl IntoResponse, AppError> {
    let person = state.store.create(&body).await?;
    tracing::info!(id = person.id, "person created");
    Ok(created(person))
}

#[utoipa::path(
    get,
    path = "/persons/{id}",
    tag = "persons",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "The person", body = Person),
        (status = 404, description = "Person not found", body = ErrorBody)
    )
)]
pub async fn get_person(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let person = state.store.get(id).await?.ok_or_else(AppError::person_not_found)?;
    Ok(ok(person))
}

#[utoipa::path(
    put,
    path = "/persons/{id}",
    tag = "persons",
    params(("id" = i64, Path, description = "Person id")),
    request_body = PersonPatch,
    responses(
        (status = 200, description = "Updated person", body = Person),
        (status = 400, description = "Email already registered", body = ErrorBody),
        (status = 404, description = "Person not found", body = ErrorBody)
    )
)]
pub async fn update_person(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(patch): JsonBody<PersonPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let person = state
        .store
        .update(id, &patch)
        .await?
        .ok_or_else(AppError::person_not_found)?;
    Ok(ok(person))
}

#[utoipa::path(
    delete,
    path = "/persons/{id}",
    tag = "persons",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 404, description = "Person not found", body = ErrorBody)
    )
)]
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    if !state.store.delete(id).await? {
        return Err(AppError::person_not_found());
    }
    tracing::info!(id, "person deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_id("1.5"), Err(AppError::Validation(_))));
    }
}
