//! Repository tests against a live PostgreSQL
//!
//! Skipped unless `SAV_TEST_DATABASE_URL` points at a scratch database.

use chrono::Utc;

use core_kernel::{ClientId, ReclamationId};
use domain_reclamation::lifecycle::transition;
use domain_reclamation::{
    NewReclamation, Reclamation, ReclamationPort, ReclamationQuery, ReclamationStatus,
    TransitionRequest,
};
use infra_db::repositories::PostgresReclamationRepository;
use infra_db::{create_pool, run_migrations, DatabaseConfig};
use test_utils::assert_history_ordered;

async fn repository() -> Option<PostgresReclamationRepository> {
    let url = std::env::var("SAV_TEST_DATABASE_URL").ok()?;
    let pool = create_pool(DatabaseConfig::new(url).max_connections(4))
        .await
        .expect("database reachable");
    run_migrations(&pool).await.expect("migrations apply");
    Some(PostgresReclamationRepository::new(pool))
}

fn open() -> Reclamation {
    Reclamation::open(
        NewReclamation {
            client_id: ClientId::new_v7(),
            article_id: None,
            title: "Plaque induction en défaut".to_string(),
            description: Some("Code erreur E4".to_string()),
            priority: None,
        },
        Utc::now(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_round_trip_and_not_found() {
    let Some(repo) = repository().await else { return };
    let rec = open();
    repo.insert_reclamation(&rec).await.unwrap();

    let loaded = repo.load_reclamation(rec.id).await.unwrap();
    assert_eq!(loaded.number, rec.number);
    assert_eq!(loaded.priority, rec.priority);
    assert_eq!(loaded.version, 1);

    let err = repo.load_reclamation(ReclamationId::new()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stale_commit_writes_nothing() {
    let Some(repo) = repository().await else { return };
    let rec = open();
    repo.insert_reclamation(&rec).await.unwrap();

    let start = TransitionRequest::status(ReclamationStatus::InProgress);
    let (first, entry) = transition(&rec, &start, "tech-1", Utc::now()).unwrap();
    repo.commit_transition(&first, rec.version, entry).await.unwrap();

    let cancel = TransitionRequest::status(ReclamationStatus::Cancelled);
    let (second, entry) = transition(&rec, &cancel, "tech-2", Utc::now()).unwrap();
    let err = repo.commit_transition(&second, rec.version, entry).await.unwrap_err();

    assert!(err.is_concurrent_modification());
    assert_eq!(repo.history(rec.id).await.unwrap().len(), 1);
    assert_eq!(
        repo.load_reclamation(rec.id).await.unwrap().status,
        ReclamationStatus::InProgress
    );
}

#[tokio::test]
async fn test_history_timestamps_strictly_increase() {
    let Some(repo) = repository().await else { return };
    let mut rec = open();
    repo.insert_reclamation(&rec).await.unwrap();

    let frozen = Utc::now();
    for status in [
        ReclamationStatus::InProgress,
        ReclamationStatus::PendingParts,
        ReclamationStatus::InProgress,
        ReclamationStatus::Resolved,
    ] {
        let (next, entry) = transition(&rec, &TransitionRequest::status(status), "tech", frozen).unwrap();
        repo.commit_transition(&next, rec.version, entry).await.unwrap();
        rec = next;
    }

    let history = repo.history(rec.id).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_history_ordered(&history);
}

#[tokio::test]
async fn test_list_filters_by_client() {
    let Some(repo) = repository().await else { return };
    let rec = open();
    repo.insert_reclamation(&rec).await.unwrap();

    let listed = repo
        .list_reclamations(&ReclamationQuery::by_client(rec.client_id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, rec.id);
}
