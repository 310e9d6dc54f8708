//! Person row and the request shapes accepted for create and update.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored person. `id` is assigned by the store and never changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub email: String,
}

/// Body of `POST /persons`. Every field is required.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewPerson {
    pub name: String,
    pub age: i32,
    pub email: String,
}

/// Body of `PUT /persons/{id}`. Absent or null fields keep their stored value.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct PersonPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub email: Option<String>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.email.is_none()
    }

    /// Applies the supplied fields over `person`.
    pub fn apply(self, person: &mut Person) {
        if let Some(name) = self.name {
            person.name = name;
        }
        if let Some(age) = self.age {
            person.age = age;
        }
        if let Some(email) = self.email {
            person.email = email;
        }
    }
}
