//! Embedded database bootstrap tests (RocksDB on disk)

use mesa_server::db::DbService;
use mesa_server::db::models::DiningTableCreate;
use mesa_server::db::repository::DiningTableRepository;

#[tokio::test]
async fn opens_a_fresh_database_and_applies_schema() {
    let dir = tempfile::tempdir().expect("temp dir");
    let service = DbService::new(&dir.path().join("db"))
        .await
        .expect("open database");

    // Smoke query on the fresh store
    service.db.query("RETURN 1").await.expect("query");
}

#[tokio::test]
async fn duplicate_table_names_are_rejected_on_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let service = DbService::new(&dir.path().join("db"))
        .await
        .expect("open database");
    let repo = DiningTableRepository::new(service.db.clone());

    repo.create(DiningTableCreate {
        name: "T1".to_string(),
        capacity: Some(4),
        floor: None,
        position: None,
    })
    .await
    .expect("create table");

    let found = repo.find_by_name("T1").await.expect("lookup");
    assert!(found.is_some());

    let duplicate = repo
        .create(DiningTableCreate {
            name: "T1".to_string(),
            capacity: None,
            floor: None,
            position: None,
        })
        .await;
    assert!(duplicate.is_err(), "duplicate table names must be rejected");
}
