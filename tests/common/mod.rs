//! Store checks shared by the SQLite and PostgreSQL suites. Each expects an empty `persons` table.
#![allow(dead_code)]

use person_api::{AppError, NewPerson, Person, PersonPatch, PersonStore};
use std::collections::HashSet;
use std::sync::Arc;

pub fn new_person(name: &str, age: i32, email: &str) -> NewPerson {
    NewPerson {
        name: name.into(),
        age,
        email: email.into(),
    }
}

/// Alice and Bob: create, list, partial update, duplicate email, delete.
pub async fn crud_scenario(store: &dyn PersonStore) {
    let alice = store.create(&new_person("Alice Smith", 25, "alice@example.com")).await.unwrap();
    let bob = store.create(&new_person("Bob Jones", 30, "bob@example.com")).await.unwrap();
    assert_eq!(alice.id, 1);
    assert_eq!(bob.id, 2);
    assert_eq!(store.list().await.unwrap(), vec![alice.clone(), bob.clone()]);

    let older = PersonPatch {
        age: Some(26),
        ..Default::default()
    };
    let alice = store.update(alice.id, &older).await.unwrap().unwrap();
    assert_eq!(alice.age, 26);
    assert_eq!(alice.email, "alice@example.com");

    let own_email = PersonPatch {
        name: Some("Bobby".into()),
        email: Some("bob@example.com".into()),
        ..Default::default()
    };
    assert_eq!(store.update(bob.id, &own_email).await.unwrap().unwrap().name, "Bobby");

    let steal = PersonPatch {
        email: Some("alice@example.com".into()),
        ..Default::default()
    };
    assert!(matches!(store.update(bob.id, &steal).await, Err(AppError::Conflict(_))));
    assert!(matches!(
        store.create(&new_person("Alice Clone", 40, "alice@example.com")).await,
        Err(AppError::Conflict(_))
    ));

    assert_eq!(store.update(alice.id, &PersonPatch::default()).await.unwrap(), Some(alice.clone()));
    assert!(store.update(999, &older).await.unwrap().is_none());

    assert!(store.delete(bob.id).await.unwrap());
    assert!(store.get(bob.id).await.unwrap().is_none());
    assert!(!store.delete(bob.id).await.unwrap());
    assert_eq!(store.list().await.unwrap(), vec![alice]);
}

/// `n` writers with distinct emails all succeed with distinct ids.
pub async fn concurrent_distinct_creates(store: Arc<dyn PersonStore>, n: usize) {
    let mut tasks = Vec::with_capacity(n);
    for i in 0..n {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .create(&new_person(&format!("Person {}", i), 20, &format!("p{}@example.com", i)))
                .await
        }));
    }
    let mut ids = HashSet::new();
    for task in tasks {
        let person = task.await.unwrap().unwrap_or_else(|e| panic!("create failed: {:?}", e));
        assert!(ids.insert(person.id), "id {} handed out twice", person.id);
    }
    assert_eq!(store.list().await.unwrap().len(), n);
}

/// `n` writers race for one email: one wins, every other gets `Conflict`.
pub async fn concurrent_same_email_creates(store: Arc<dyn PersonStore>, n: usize) {
    let mut tasks = Vec::with_capacity(n);
    for i in 0..n {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store.create(&new_person(&format!("Twin {}", i), 30, "twin@example.com")).await
        }));
    }
    let results = collect(tasks).await;
    assert_outcome(&results, 1, n - 1);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

/// `n` existing rows all try to switch to the same email: one wins, every other gets `Conflict`.
pub async fn concurrent_same_email_updates(store: Arc<dyn PersonStore>, n: usize) {
    let mut people = Vec::with_capacity(n);
    for i in 0..n {
        let email = format!("u{}@example.com", i);
        people.push(store.create(&new_person(&format!("User {}", i), 40, &email)).await.unwrap());
    }
    let mut tasks = Vec::with_capacity(n);
    for person in people {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            let patch = PersonPatch {
                email: Some("shared@example.com".into()),
                ..Default::default()
            };
            store.update(person.id, &patch).await.map(|p| p.expect("row exists"))
        }));
    }
    let results = collect(tasks).await;
    assert_outcome(&results, 1, n - 1);
    let holders = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.email == "shared@example.com")
        .count();
    assert_eq!(holders, 1);
}

async fn collect(tasks: Vec<tokio::task::JoinHandle<Result<Person, AppError>>>) -> Vec<Result<Person, AppError>> {
    let mut out = Vec::with_capacity(tasks.len());
    for task in tasks {
        out.push(task.await.unwrap());
    }
    out
}

fn assert_outcome(results: &[Result<Person, AppError>], ok: usize, conflicts: usize) {
    let won = results.iter().filter(|r| r.is_ok()).count();
    let lost = results.iter().filter(|r| matches!(r, Err(AppError::Conflict(_)))).count();
    let other: Vec<_> = results
        .iter()
        .filter(|r| !matches!(r, Ok(_) | Err(AppError::Conflict(_))))
        .collect();
    assert!(other.is_empty(), "unexpected errors: {:?}", other);
    assert_eq!((won, lost), (ok, conflicts));
}
