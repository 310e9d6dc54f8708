//! OpenAPI description of the person endpoints, served at `/openapi.json`.

use crate::error::{ErrorBody, ErrorDetail};
use crate::handlers::person;
use crate::model::{NewPerson, Person, PersonPatch};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Person API", version = "1.0.0"),
    paths(
        person::list_persons,
        person::create_person,
        person::get_person,
        person::update_person,
        person::delete_person
    ),
    components(schemas(Person, NewPerson, PersonPatch, ErrorBody, ErrorDetail)),
    tags((name = "persons", description = "Create, read, update and delete persons"))
)]
pub struct ApiDoc;
