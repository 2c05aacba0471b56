use catalog_database::*;

const ITEMS_V1: Migration = Migration::new(
    "items",
    1,
    "create item table",
    "DEFINE TABLE item SCHEMAFULL;
DEFINE FIELD name ON item TYPE string;",
);

const ITEMS_V2: Migration = Migration::new(
    "items",
    2,
    "index item names",
    "DEFINE INDEX item_name ON item FIELDS name UNIQUE;",
);

async fn open(migrations: Vec<Migration>) -> Result<Database, DatabaseError> {
    Database::builder().url("mem://").session("test_ns", "test_db").migrations(migrations).init().await
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = open(Vec::new()).await.expect("connect to mem://");

    db.health().await.expect("health check");
    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "test_db");
    assert!(db.migration_report().applied.is_empty());
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));

    let err = Database::builder().url("mem://").session("bad-ns", "db").init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn migrations_apply_in_order_and_are_recorded() {
    let db = open(vec![ITEMS_V2, ITEMS_V1]).await.expect("migrate");

    let applied: Vec<String> =
        db.migration_report().applied.iter().map(ToString::to_string).collect();
    assert_eq!(applied, ["items:0001", "items:0002"]);

    db.query("CREATE item SET name = 'lamp'").await.unwrap().check().unwrap();
    let dup = db.query("CREATE item SET name = 'lamp'").await.unwrap().check();
    assert!(dup.is_err(), "unique index from version 2 must be active");

    let report = MigrationRunner::new(&db).run(&[ITEMS_V1, ITEMS_V2]).await.expect("rerun");
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped.len(), 2);
}

#[tokio::test]
async fn changed_script_is_rejected() {
    let db = open(vec![ITEMS_V1]).await.expect("migrate");

    let tampered = Migration::new("items", 1, "create item table", "DEFINE TABLE item SCHEMALESS;");
    let err = MigrationRunner::new(&db).run(&[tampered]).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Migration { .. }));
}

#[tokio::test]
async fn duplicate_versions_are_rejected() {
    let err = open(vec![ITEMS_V1, ITEMS_V1]).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn failing_script_reports_migration_error() {
    let broken = Migration::new("broken", 1, "bad syntax", "DEFINE TABLEZ nope;");
    let err = open(vec![broken]).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Migration { .. }));
}

#[tokio::test]
async fn execute_transaction_runs_all_statements() {
    let db = open(vec![ITEMS_V1]).await.expect("migrate");

    db.execute_transaction("CREATE item SET name = 'a'; CREATE item SET name = 'b';")
        .await
        .expect("transaction");

    let mut response = db.query("SELECT VALUE name FROM item ORDER BY name").await.unwrap();
    let names: Vec<String> = response.take(0).unwrap();
    assert_eq!(names, ["a", "b"]);
}
