//! PostgreSQL-backed store tests.
//!
//! Need a reachable `DATABASE_URL`; run with `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use kitcheck_core::access::Page;
use kitcheck_core::annotation::{Annotation, AnnotationSource};
use kitcheck_core::catalog::Catalog;
use kitcheck_core::error::CoreError;
use kitcheck_core::roles::Role;
use kitcheck_core::session::Session;
use kitcheck_core::status::{SessionStatus, Stage};
use kitcheck_core::store::{NewUser, SessionStore, UserStore};
use kitcheck_db::PgStore;
use sqlx::PgPool;
use uuid::Uuid;

fn new_user(employee_id: &str) -> NewUser {
    NewUser {
        employee_id: employee_id.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role: Role::Simple,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_health_check(pool: PgPool) {
    kitcheck_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_employee_id_is_conflict(pool: PgPool) {
    let store = PgStore::new(pool);
    store.create_user(new_user("E100")).await.unwrap();
    let err = store.create_user(new_user("E100")).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)), "got {err:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_session_snapshot_round_trip(pool: PgPool) {
    let store = PgStore::new(pool);
    let user = store.create_user(new_user("E200")).await.unwrap();

    let mut session = Session::new(Uuid::now_v7(), user.id, 0.9, Some("bay 4".into()), Utc::now());
    store.create_session(&session).await.unwrap();

    let kit: Vec<Annotation> = Catalog::default()
        .iter()
        .map(|c| Annotation::new(c, [0.5, 0.5, 0.2, 0.1], AnnotationSource::Edited))
        .collect();
    session
        .record_prediction(
            Stage::Handout,
            kitcheck_core::detection::predict(&[], &Catalog::default(), 0.9),
            "aW1n".into(),
            Utc::now(),
        )
        .unwrap();
    session
        .submit_final(Stage::Handout, kit.clone(), &Catalog::default(), Utc::now())
        .unwrap();
    store.save_session(&session).await.unwrap();

    let loaded = store.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::ISSUED);
    assert_eq!(loaded.handout.final_annotations, Some(kit));
    assert_eq!(loaded.handout.image.as_deref(), Some("aW1n"));
    assert!(loaded.handover.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_list_filters_by_owner_newest_first(pool: PgPool) {
    let store = PgStore::new(pool);
    let alice = store.create_user(new_user("alice")).await.unwrap();
    let bob = store.create_user(new_user("bob")).await.unwrap();

    let start = Utc::now();
    for (i, owner) in [alice.id, bob.id, alice.id].into_iter().enumerate() {
        let s = Session::new(
            Uuid::now_v7(),
            owner,
            0.98,
            Some(format!("n{i}")),
            start + Duration::seconds(i as i64),
        );
        store.create_session(&s).await.unwrap();
    }

    let (all, total) = store.list_sessions(None, Page::default()).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(all[0].notes.as_deref(), Some("n2"));

    let (mine, total) = store
        .list_sessions(Some(alice.id), Page::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(mine.iter().all(|i| i.employee_id == "alice"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_save_missing_session_is_not_found(pool: PgPool) {
    let store = PgStore::new(pool);
    let session = Session::new(Uuid::now_v7(), Uuid::now_v7(), 0.98, None, Utc::now());
    let err = store.save_session(&session).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }), "got {err:?}");
}
